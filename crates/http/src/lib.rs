//! Semantic HTTP values and the message model of the uniform toolkit
//!
//! This crate turns the textual parts of HTTP into typed values and bundles them into
//! [`Request`](message::Request) and [`Response`](message::Response) messages that handlers
//! mutate in place. It doesn't own any socket: a transport converts its
//! [`http::request::Parts`] into a request, runs the handlers, and writes back whatever
//! [`Response::to_head`](message::Response::to_head) and the entity produce.
//!
//! # Features
//!
//! - Entity tags, digests, byte ranges and content encodings
//! - Quality weighted preferences with media type, encoding, language and charset negotiation
//! - Cookies and cookie settings
//! - Authentication challenges and `Authentication-Info`
//! - Percent-encoded forms for query and matrix parameters
//! - Conditional request evaluation (`If-Match`, `If-None-Match`)
//! - Reusable, transient and compressing entities (gzip, deflate, zstd, brotli)
//!
//! # Example
//!
//! ```
//! use uniform_http::data::{Encoding, Tag};
//! use uniform_http::message::{Request, Response};
//! use uniform_http::representation::StringRepresentation;
//!
//! let (parts, ()) = http::Request::builder()
//!     .uri("/greeting")
//!     .header("Accept-Encoding", "br, gzip;q=0.5")
//!     .header("If-None-Match", "W/\"v1\"")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//!
//! let request = Request::from(parts);
//! let mut response = Response::new();
//!
//! let tag = Tag::weak("v1");
//! match request.conditions().status(request.method(), Some(&tag)) {
//!     Some(status) => response.set_status(status),
//!     None => response.set_entity(Box::new(StringRepresentation::plain("Hello World!").with_tag(tag))),
//! }
//!
//! assert_eq!(response.status().code(), http::StatusCode::NOT_MODIFIED);
//! assert_eq!(request.client_info().preferred_encoding(&[Encoding::GZIP]), Some(&Encoding::GZIP));
//! ```
//!
//! # Architecture
//!
//! - [`data`]: the value types and their header parsers and formatters
//! - [`representation`]: the entity contract and its implementations
//! - [`message`]: [`Message`](message::Message), requests and responses
//! - [`error`]: error types of the fallible accessors
//!
//! # Error Handling
//!
//! Header parsers never fail: malformed input is logged through `tracing` at `warn` level
//! and yields `None` or an empty collection. Entity accessors return
//! [`RepresentationError`](error::RepresentationError) since reading a stream can fail for
//! reasons outside the caller's control.

pub mod data;
pub mod error;
pub mod message;
pub mod representation;

mod utils;
