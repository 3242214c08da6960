use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::filter::{Filter, FilterLink};
use crate::uniform::Handler;

type Link = Box<dyn FnOnce(Arc<dyn Handler>, Option<Arc<Context>>) -> Arc<dyn Handler> + Send>;

/// Entry point for assembling filters in front of a terminal handler.
///
/// ```
/// use http::StatusCode;
/// use uniform_http::message::{Request, Response};
/// use uniform_web::filter::{EncodeFilter, Validator};
/// use uniform_web::{Chain, Uniform, handler_fn};
///
/// let head = Chain::builder()
///     .add_last(Validator::new().validate_presence("user"))
///     .add_first(EncodeFilter::default())
///     .build(handler_fn(|_request: &mut Request, response: &mut Response| {
///         if !response.status().is_error() {
///             response.set_status(StatusCode::NO_CONTENT);
///         }
///     }));
///
/// let mut response = Response::new();
/// head.handle(&mut Request::default(), &mut response);
/// assert_eq!(response.status().code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug)]
pub struct Chain;

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }
}

pub struct ChainBuilder {
    links: Vec<Link>,
    context: Option<Arc<Context>>,
}

impl ChainBuilder {
    fn new() -> Self {
        Self { links: vec![], context: None }
    }

    /// Appends a filter, it runs after every filter already added.
    pub fn add_last<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.links.push(Self::link(filter));
        self
    }

    /// Prepends a filter, it runs before every filter already added.
    pub fn add_first<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.links.insert(0, Self::link(filter));
        self
    }

    /// The context every link of the chain runs with.
    pub fn context(mut self, context: Arc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// Links the filters head to tail in front of `terminal` and returns the head.
    ///
    /// Without any filter, the terminal itself is returned.
    pub fn build<H: Handler + 'static>(self, terminal: H) -> Arc<dyn Handler> {
        self.build_shared(Arc::new(terminal))
    }

    pub fn build_shared(self, terminal: Arc<dyn Handler>) -> Arc<dyn Handler> {
        let context = self.context;
        self.links.into_iter().rev().fold(terminal, |next, link| link(next, context.clone()))
    }

    fn link<F: Filter + 'static>(filter: F) -> Link {
        Box::new(move |next, context| {
            let link = FilterLink::new(filter).with_next(next);
            match context {
                Some(context) => Arc::new(link.with_context(context)),
                None => Arc::new(link),
            }
        })
    }
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder").field("links", &self.links.len()).field("context", &self.context).finish()
    }
}
