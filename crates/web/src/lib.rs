//! The uniform handler contract and the filter chain engine
//!
//! Every processing stage implements [`Uniform`]: it receives a mutable request and
//! response and signals its outcome by mutating the response. [`Handler`] adds a
//! start/stop lifecycle and an optional [`Context`].
//!
//! Filters wrap a downstream handler with before and after hooks. [`Chain`] links them
//! head to tail in front of a terminal handler:
//!
//! ```
//! use http::StatusCode;
//! use uniform_http::message::{Request, Response};
//! use uniform_web::filter::{FilterResult, fn_filter};
//! use uniform_web::{Chain, Handler, Uniform, handler_fn};
//!
//! let head = Chain::builder()
//!     .add_last(fn_filter(|request: &mut Request, response: &mut Response| {
//!         if request.cookies().is_empty() {
//!             response.set_status(StatusCode::UNAUTHORIZED);
//!             return FilterResult::Stop;
//!         }
//!         FilterResult::Continue
//!     }))
//!     .build(handler_fn(|_request: &mut Request, response: &mut Response| {
//!         response.set_entity_text("welcome", mime::TEXT_PLAIN_UTF_8);
//!     }));
//!
//! head.start();
//! let mut response = Response::new();
//! head.handle(&mut Request::default(), &mut response);
//! assert_eq!(response.status().code(), StatusCode::UNAUTHORIZED);
//! head.stop();
//! ```
//!
//! The engine runs handlers on the caller's thread and never spawns anything. While a
//! link runs, the id of the response and the link's context are available through
//! [`current_response_id`] and [`current_context`].

mod chain;
mod context;
mod uniform;

pub mod filter;

pub use chain::{Chain, ChainBuilder};
pub use context::{AmbientGuard, Context, ContextBuilder, current_context, current_response_id};
pub use uniform::{FnHandler, Handler, Uniform, handler_fn};
