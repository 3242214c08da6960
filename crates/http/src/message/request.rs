use std::ops::{Deref, DerefMut};

use http::header::{COOKIE, IF_MATCH, IF_NONE_MATCH, RANGE};
use http::request::Parts;
use http::{HeaderMap, HeaderName, Method, Uri, Version};
use tracing::warn;

use crate::data::{ClientInfo, Conditions, Cookie, Form, Range, Tag};
use crate::message::Message;

/// An incoming or outgoing request with its headers already turned into value types.
#[derive(Debug)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    client_info: ClientInfo,
    conditions: Conditions,
    ranges: Vec<Range>,
    cookies: Vec<Cookie>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            message: Message::new(),
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            client_info: ClientInfo::new(),
            conditions: Conditions::default(),
            ranges: vec![],
            cookies: vec![],
        }
    }

    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The raw headers the request was built from.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    pub fn client_info_mut(&mut self) -> &mut ClientInfo {
        &mut self.client_info
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.conditions
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn ranges_mut(&mut self) -> &mut Vec<Range> {
        &mut self.ranges
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut Vec<Cookie> {
        &mut self.cookies
    }

    /// The decoded query string parameters.
    pub fn query(&self) -> Form {
        self.uri.query().map(|query| Form::parse(query, Form::QUERY_SEPARATOR)).unwrap_or_default()
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::GET, Uri::from_static("/"))
    }
}

impl Deref for Request {
    type Target = Message;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for Request {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}

impl AsRef<Message> for Request {
    fn as_ref(&self) -> &Message {
        &self.message
    }
}

impl AsMut<Message> for Request {
    fn as_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl From<Parts> for Request {
    fn from(parts: Parts) -> Self {
        let headers = parts.headers;

        let conditions = Conditions::new(
            Tag::parse_list(&header_text(&headers, &IF_MATCH)),
            Tag::parse_list(&header_text(&headers, &IF_NONE_MATCH)),
        );
        let ranges = headers
            .get(RANGE)
            .and_then(|value| value.to_str().ok())
            .map(Range::parse_header)
            .unwrap_or_default();
        let cookies = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::parse_header)
            .collect();

        Self {
            message: Message::new(),
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            client_info: ClientInfo::from_headers(&headers),
            conditions,
            ranges,
            cookies,
            headers,
        }
    }
}

fn header_text(headers: &HeaderMap, name: &HeaderName) -> String {
    let values = headers
        .get_all(name)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cause = %e, header = %name, "ignoring non visible ascii header value");
                None
            }
        })
        .collect::<Vec<_>>();
    values.join(",")
}
