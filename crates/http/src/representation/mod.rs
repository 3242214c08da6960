//! Entities carried by messages.
//!
//! A [`Representation`] is an opaque byte source with metadata and a release contract.
//! The message model never looks at entity bytes itself; it only asks for streams, text
//! or an [`http_body`] channel when a caller needs them.

mod encode;
mod input;
mod string;

pub use encode::EncodeRepresentation;
pub use input::InputRepresentation;
pub use string::StringRepresentation;

use std::fmt::Debug;
use std::io::{self, BufRead, BufReader, Read, Write};

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use mime::Mime;

use crate::data::{Digest, Encoding, Tag};
use crate::error::RepresentationError;

/// The entity provider contract.
///
/// Implementations decide what "available" means: a reusable in-memory entity stays
/// available, a transient stream becomes unavailable once consumed or released.
pub trait Representation: Send + Sync + Debug {
    fn media_type(&self) -> &Mime;

    /// Content encodings applied to the bytes, in application order.
    fn encodings(&self) -> &[Encoding] {
        &[]
    }

    /// Size in bytes when known up front.
    fn size(&self) -> Option<u64>;

    fn tag(&self) -> Option<&Tag> {
        None
    }

    fn digest(&self) -> Option<&Digest> {
        None
    }

    fn is_available(&self) -> bool;

    /// Whether the content can only be read once.
    fn is_transient(&self) -> bool {
        false
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, RepresentationError>;

    fn reader(&self) -> Result<Box<dyn BufRead + Send + '_>, RepresentationError> {
        Ok(Box::new(BufReader::new(self.stream()?)))
    }

    fn text(&self) -> Result<String, RepresentationError> {
        let mut buf = Vec::new();
        self.stream()?.read_to_end(&mut buf)?;
        String::from_utf8(buf).map_err(RepresentationError::invalid_text)
    }

    /// Copies the content into `target`, returning the number of bytes written.
    fn write(&self, target: &mut dyn Write) -> Result<u64, RepresentationError> {
        Ok(io::copy(&mut self.stream()?, target)?)
    }

    /// The content as an [`http_body::Body`], ready to hand to a transport.
    fn channel(&self) -> Result<UnsyncBoxBody<Bytes, RepresentationError>, RepresentationError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(Full::new(Bytes::from(buf)).map_err(|never| match never {}).boxed_unsync())
    }

    /// Frees the underlying resources. Further reads of a transient entity fail.
    fn release(&self) {}
}
