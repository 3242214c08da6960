use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use http::header::{
    CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LOCATION, SET_COOKIE, WARNING,
    WWW_AUTHENTICATE,
};
use http::response::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty};
use tracing::warn;

use crate::data::{AuthenticationInfo, CacheDirective, ChallengeRequest, CookieSetting, Status};
use crate::error::RepresentationError;
use crate::message::Message;

const AUTHENTICATION_INFO: HeaderName = HeaderName::from_static("authentication-info");

/// A response under construction: handlers signal everything by mutating it.
#[derive(Debug, Default)]
pub struct Response {
    message: Message,
    status: Status,
    location: Option<Uri>,
    cookie_settings: Vec<CookieSetting>,
    challenge_requests: Vec<ChallengeRequest>,
    authentication_info: Option<AuthenticationInfo>,
    headers: HeaderMap,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<Status>) {
        self.status = status.into();
    }

    /// Sets the status together with a description of the condition.
    pub fn set_status_described(&mut self, code: StatusCode, description: impl Into<String>) {
        self.status = Status::with_description(code, description);
    }

    pub fn location(&self) -> Option<&Uri> {
        self.location.as_ref()
    }

    pub fn set_location(&mut self, location: Option<Uri>) {
        self.location = location;
    }

    /// Sets a `303 See Other` redirection.
    pub fn redirect_see_other(&mut self, location: Uri) {
        self.set_status(StatusCode::SEE_OTHER);
        self.location = Some(location);
    }

    pub fn cookie_settings(&self) -> &[CookieSetting] {
        &self.cookie_settings
    }

    pub fn cookie_settings_mut(&mut self) -> &mut Vec<CookieSetting> {
        &mut self.cookie_settings
    }

    pub fn challenge_requests(&self) -> &[ChallengeRequest] {
        &self.challenge_requests
    }

    pub fn challenge_requests_mut(&mut self) -> &mut Vec<ChallengeRequest> {
        &mut self.challenge_requests
    }

    pub fn authentication_info(&self) -> Option<&AuthenticationInfo> {
        self.authentication_info.as_ref()
    }

    pub fn set_authentication_info(&mut self, authentication_info: Option<AuthenticationInfo>) {
        self.authentication_info = authentication_info;
    }

    /// Extra headers, written after the ones derived from the value types.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Renders the status line and headers.
    ///
    /// Values that can't be represented as header values are logged and left out.
    pub fn to_head(&self) -> Parts {
        let (mut head, ()) = http::Response::new(()).into_parts();
        head.status = self.status.code();
        let headers = &mut head.headers;

        if let Some(entity) = self.entity() {
            append(headers, CONTENT_TYPE, entity.media_type().as_ref());
            if !entity.encodings().is_empty() {
                let encodings = entity.encodings().iter().map(ToString::to_string).collect::<Vec<_>>();
                append(headers, CONTENT_ENCODING, &encodings.join(", "));
            }
            if let Some(size) = entity.size() {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
            }
            if let Some(tag) = entity.tag() {
                append(headers, ETAG, &tag.format());
            }
        }
        for setting in &self.cookie_settings {
            append(headers, SET_COOKIE, &setting.to_header_value());
        }
        for challenge in &self.challenge_requests {
            append(headers, WWW_AUTHENTICATE, &challenge.to_header_value());
        }
        if let Some(info) = &self.authentication_info {
            append(headers, AUTHENTICATION_INFO, &info.to_header_value());
        }
        if !self.cache_directives().is_empty() {
            append(headers, CACHE_CONTROL, &CacheDirective::format_header(self.cache_directives()));
        }
        for warning in self.warnings() {
            append(headers, WARNING, &warning.to_string());
        }
        if let Some(location) = &self.location {
            append(headers, LOCATION, &location.to_string());
        }
        for (name, value) in &self.headers {
            headers.append(name, value.clone());
        }
        head
    }

    /// Turns the response into an [`http::Response`], releasing the entity afterwards.
    pub fn into_http(mut self) -> Result<http::Response<UnsyncBoxBody<Bytes, RepresentationError>>, RepresentationError> {
        let head = self.to_head();
        let body = match self.entity() {
            Some(entity) if entity.is_available() => entity.channel()?,
            _ => Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync(),
        };
        self.release();
        Ok(http::Response::from_parts(head, body))
    }
}

fn append(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.append(name, value);
        }
        Err(e) => warn!(cause = %e, header = %name, value, "dropping invalid header value"),
    }
}

impl Deref for Response {
    type Target = Message;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for Response {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}

impl AsRef<Message> for Response {
    fn as_ref(&self) -> &Message {
        &self.message
    }
}

impl AsMut<Message> for Response {
    fn as_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
