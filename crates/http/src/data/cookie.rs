//! Cookies sent by clients and cookie settings sent by servers.

use std::fmt;

use tracing::warn;

use crate::data::Parameter;
use crate::error::ParseError;

/// A cookie as received in a `Cookie` request header.
///
/// Equality compares the name/value pair first, then version, path and domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    parameter: Parameter,
    version: u32,
    path: Option<String>,
    domain: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { parameter: Parameter::new(name, value), version: 0, path: None, domain: None }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    pub fn value(&self) -> &str {
        self.parameter.value().unwrap_or_default()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Parses a `Cookie` header, logging and skipping malformed pairs.
    ///
    /// `$Version`, `$Path` and `$Domain` attributes apply to the cookie they follow.
    pub fn parse_header(header: &str) -> Vec<Cookie> {
        let mut version = 0;
        let mut cookies: Vec<Cookie> = vec![];

        for pair in header.split([';', ',']).map(str::trim).filter(|s| !s.is_empty()) {
            let Some((name, value)) = pair.split_once('=') else {
                warn!(cause = %ParseError::invalid_cookie(pair), "skipping cookie");
                continue;
            };
            let name = name.trim();
            let value = crate::utils::unquote(value.trim());

            if name.eq_ignore_ascii_case("$Version") {
                version = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("$Path") {
                if let Some(cookie) = cookies.last_mut() {
                    cookie.path = Some(value.to_string());
                }
            } else if name.eq_ignore_ascii_case("$Domain") {
                if let Some(cookie) = cookies.last_mut() {
                    cookie.domain = Some(value.to_string());
                }
            } else if name.is_empty() {
                warn!(cause = %ParseError::invalid_cookie(pair), "skipping cookie");
            } else {
                cookies.push(Cookie::new(name, value).with_version(version));
            }
        }

        cookies
    }
}

/// A cookie setting sent in a `Set-Cookie` response header.
///
/// Equality is layered: the [`Cookie`] part first, then max age, secure flag,
/// comment (absent only equals absent) and the access restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CookieSetting {
    cookie: Cookie,
    comment: Option<String>,
    max_age: i32,
    secure: bool,
    access_restricted: bool,
}

impl CookieSetting {
    /// Max age meaning "discard when the user agent exits".
    pub const SESSION_MAX_AGE: i32 = -1;

    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_cookie(Cookie::new(name, value))
    }

    pub fn from_cookie(cookie: Cookie) -> Self {
        Self { cookie, comment: None, max_age: Self::SESSION_MAX_AGE, secure: false, access_restricted: false }
    }

    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_access_restricted(&self) -> bool {
        self.access_restricted
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_max_age(mut self, max_age: i32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_access_restricted(mut self, access_restricted: bool) -> Self {
        self.access_restricted = access_restricted;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.cookie.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CookieSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.cookie.name(), self.cookie.value())?;
        if self.cookie.version > 0 {
            write!(f, "; Version={}", self.cookie.version)?;
        }
        if let Some(path) = &self.cookie.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(domain) = &self.cookie.domain {
            write!(f, "; Domain={domain}")?;
        }
        if self.max_age >= 0 {
            write!(f, "; Max-Age={}", self.max_age)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, "; Comment={}", crate::utils::quote(comment))?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.access_restricted {
            f.write_str("; HttpOnly")?;
        }
        Ok(())
    }
}
