use std::io;
use thiserror::Error;

use crate::data::DigestAlgorithm;

/// Failure to read a textual HTTP value into one of the semantic value types.
///
/// Parsers in [`crate::data`] log these at `warn` level and hand back an empty result,
/// so most callers only meet this type through `try_parse`-style functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid entity tag: {literal}")]
    InvalidTag { literal: String },

    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    #[error("invalid quality value: {value}")]
    InvalidQuality { value: String },

    #[error("invalid cookie: {reason}")]
    InvalidCookie { reason: String },

    #[error("invalid reference: {reference}")]
    InvalidReference { reference: String },

    #[error("invalid form: {reason}")]
    InvalidForm { reason: String },
}

impl ParseError {
    pub fn invalid_tag<S: ToString>(literal: S) -> Self {
        Self::InvalidTag { literal: literal.to_string() }
    }

    pub fn invalid_range<S: ToString>(str: S) -> Self {
        Self::InvalidRange { reason: str.to_string() }
    }

    pub fn invalid_quality<S: ToString>(value: S) -> Self {
        Self::InvalidQuality { value: value.to_string() }
    }

    pub fn invalid_cookie<S: ToString>(str: S) -> Self {
        Self::InvalidCookie { reason: str.to_string() }
    }

    pub fn invalid_reference<S: ToString>(reference: S) -> Self {
        Self::InvalidReference { reference: reference.to_string() }
    }

    pub fn invalid_form<S: ToString>(str: S) -> Self {
        Self::InvalidForm { reason: str.to_string() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest algorithm {algorithm} can't be computed locally")]
    UnsupportedAlgorithm { algorithm: DigestAlgorithm },
}

/// Errors raised by a [`Representation`](crate::representation::Representation) accessor.
#[derive(Error, Debug)]
pub enum RepresentationError {
    #[error("representation is no longer available: {reason}")]
    Unavailable { reason: String },

    #[error("representation content is not valid text: {reason}")]
    InvalidText { reason: String },

    #[error("encoding {encoding} is not supported")]
    UnsupportedEncoding { encoding: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RepresentationError {
    pub fn unavailable<S: ToString>(str: S) -> Self {
        Self::Unavailable { reason: str.to_string() }
    }

    pub fn invalid_text<S: ToString>(str: S) -> Self {
        Self::InvalidText { reason: str.to_string() }
    }

    pub fn unsupported_encoding<S: ToString>(encoding: S) -> Self {
        Self::UnsupportedEncoding { encoding: encoding.to_string() }
    }
}
