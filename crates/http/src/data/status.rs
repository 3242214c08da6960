use std::fmt;
use std::hash::{Hash, Hasher};

use http::StatusCode;

/// A response status: an HTTP status code plus an optional human readable description.
///
/// Two statuses are equal when their codes are equal; the description is informative only.
#[derive(Debug, Clone)]
pub struct Status {
    code: StatusCode,
    description: Option<String>,
}

impl Status {
    pub const SUCCESS_OK: Status = Status::of(StatusCode::OK);
    pub const SUCCESS_NO_CONTENT: Status = Status::of(StatusCode::NO_CONTENT);
    pub const SUCCESS_PARTIAL_CONTENT: Status = Status::of(StatusCode::PARTIAL_CONTENT);
    pub const REDIRECTION_NOT_MODIFIED: Status = Status::of(StatusCode::NOT_MODIFIED);
    pub const CLIENT_ERROR_BAD_REQUEST: Status = Status::of(StatusCode::BAD_REQUEST);
    pub const CLIENT_ERROR_UNAUTHORIZED: Status = Status::of(StatusCode::UNAUTHORIZED);
    pub const CLIENT_ERROR_NOT_FOUND: Status = Status::of(StatusCode::NOT_FOUND);
    pub const CLIENT_ERROR_PRECONDITION_FAILED: Status = Status::of(StatusCode::PRECONDITION_FAILED);
    pub const CLIENT_ERROR_REQUESTED_RANGE_NOT_SATISFIABLE: Status = Status::of(StatusCode::RANGE_NOT_SATISFIABLE);
    pub const SERVER_ERROR_INTERNAL: Status = Status::of(StatusCode::INTERNAL_SERVER_ERROR);

    pub const fn of(code: StatusCode) -> Self {
        Self { code, description: None }
    }

    pub fn with_description(code: StatusCode, description: impl Into<String>) -> Self {
        Self { code, description: Some(description.into()) }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The description when present, otherwise the canonical reason phrase.
    pub fn reason_phrase(&self) -> &str {
        self.description.as_deref().or_else(|| self.code.canonical_reason()).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn is_informational(&self) -> bool {
        self.code.is_informational()
    }

    pub fn is_client_error(&self) -> bool {
        self.code.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.code.is_server_error()
    }

    pub fn is_error(&self) -> bool {
        self.is_client_error() || self.is_server_error()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::SUCCESS_OK
    }
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        Self::of(code)
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Status {}

impl Hash for Status {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code.as_u16(), self.reason_phrase())
    }
}
