use std::borrow::Cow;

use http::StatusCode;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uniform_http::message::{Request, Response};

use crate::filter::{Filter, FilterResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unable to find the \"{attribute}\" attribute in the request")]
    Missing { attribute: String },

    #[error("unable to validate the \"{value}\" value of the \"{attribute}\" attribute against \"{format}\"")]
    Mismatch { attribute: String, value: String, format: String },
}

impl ValidationError {
    pub fn missing(attribute: impl Into<String>) -> Self {
        Self::Missing { attribute: attribute.into() }
    }

    pub fn mismatch(attribute: impl Into<String>, value: impl Into<String>, format: impl Into<String>) -> Self {
        Self::Mismatch { attribute: attribute.into(), value: value.into(), format: format.into() }
    }
}

#[derive(Debug)]
struct Validation {
    attribute: String,
    required: bool,
    format: Option<String>,
    pattern: OnceCell<Option<Regex>>,
}

impl Validation {
    /// The compiled format, anchored to match the whole value. `None` when there is no
    /// format or it doesn't compile, in which case only presence is checked.
    fn pattern(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| {
                let format = self.format.as_deref()?;
                match Regex::new(&format!("^(?:{format})$")) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!(cause = %e, attribute = %self.attribute, format, "invalid validation format, checking presence only");
                        None
                    }
                }
            })
            .as_ref()
    }

    fn check(&self, request: &Request) -> Result<(), ValidationError> {
        let value = request.attribute(&self.attribute).filter(|value| !value.is_null());
        let Some(value) = value else {
            return if self.required { Err(ValidationError::missing(&self.attribute)) } else { Ok(()) };
        };

        let Some(pattern) = self.pattern() else {
            return Ok(());
        };
        let text = attribute_text(value);
        if pattern.is_match(&text) {
            Ok(())
        } else {
            Err(ValidationError::mismatch(&self.attribute, text, self.format.as_deref().unwrap_or_default()))
        }
    }
}

fn attribute_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

/// Checks request attributes for presence and format before letting the request through.
///
/// Every validation runs; when some fail, the response status is set to `400 Bad Request`
/// described by the last failure. The chain continues either way, so the downstream
/// handler is expected to look at the status.
#[derive(Debug, Default)]
pub struct Validator {
    validations: Vec<Validation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validation of `attribute`. `format` is a regular expression the whole value
    /// must match; non string values are matched against their JSON text.
    pub fn validate(mut self, attribute: impl Into<String>, required: bool, format: Option<&str>) -> Self {
        self.validations.push(Validation {
            attribute: attribute.into(),
            required,
            format: format.map(ToOwned::to_owned),
            pattern: OnceCell::new(),
        });
        self
    }

    pub fn validate_presence(self, attribute: impl Into<String>) -> Self {
        self.validate(attribute, true, None)
    }

    pub fn validate_format(self, attribute: impl Into<String>, format: &str) -> Self {
        self.validate(attribute, false, Some(format))
    }

    pub fn len(&self) -> usize {
        self.validations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
    }

    /// Runs every validation, in order, and returns the failures.
    pub fn check(&self, request: &Request) -> Vec<ValidationError> {
        self.validations.iter().filter_map(|validation| validation.check(request).err()).collect()
    }
}

impl Filter for Validator {
    fn before_handle(&self, request: &mut Request, response: &mut Response) -> FilterResult {
        let errors = self.check(request);
        for error in &errors {
            debug!(request = %request.id(), %error, "request validation failed");
        }
        if let Some(last) = errors.last() {
            response.set_status_described(StatusCode::BAD_REQUEST, last.to_string());
        }
        FilterResult::Continue
    }
}
