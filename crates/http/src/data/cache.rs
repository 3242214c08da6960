//! `Cache-Control` directives and `Warning` entries.

use std::fmt;

use crate::utils::quote;

/// One `Cache-Control` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheDirective {
    name: String,
    value: Option<String>,
    digit: bool,
}

impl CacheDirective {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self { name: name.into(), value, digit: false }
    }

    fn digit(name: &str, value: u64) -> Self {
        Self { name: name.to_string(), value: Some(value.to_string()), digit: true }
    }

    pub fn no_cache() -> Self {
        Self::new("no-cache", None)
    }

    pub fn no_store() -> Self {
        Self::new("no-store", None)
    }

    pub fn no_transform() -> Self {
        Self::new("no-transform", None)
    }

    pub fn must_revalidate() -> Self {
        Self::new("must-revalidate", None)
    }

    pub fn public() -> Self {
        Self::new("public", None)
    }

    pub fn private() -> Self {
        Self::new("private", None)
    }

    pub fn max_age(seconds: u64) -> Self {
        Self::digit("max-age", seconds)
    }

    pub fn shared_max_age(seconds: u64) -> Self {
        Self::digit("s-maxage", seconds)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_digit(&self) -> bool {
        self.digit
    }

    /// Joins directives into a single `Cache-Control` value.
    pub fn format_header(directives: &[CacheDirective]) -> String {
        directives.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) if self.digit => write!(f, "{}={}", self.name, value),
            Some(value) => write!(f, "{}={}", self.name, quote(value)),
            None => f.write_str(&self.name),
        }
    }
}

/// A `Warning` entry: a warn-code, the agent adding it, a text and an optional date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Warning {
    code: u16,
    agent: String,
    text: String,
    date: Option<String>,
}

impl Warning {
    pub const RESPONSE_IS_STALE: u16 = 110;
    pub const TRANSFORMATION_APPLIED: u16 = 214;
    pub const MISCELLANEOUS_PERSISTENT: u16 = 299;

    pub fn new(code: u16, agent: impl Into<String>, text: impl Into<String>) -> Self {
        Self { code, agent: agent.into(), text: text.into(), date: None }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn set_agent(&mut self, agent: impl Into<String>) {
        self.agent = agent.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn set_date(&mut self, date: Option<String>) {
        self.date = date;
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.code, self.agent, quote(&self.text))?;
        if let Some(date) = &self.date {
            write!(f, " {}", quote(date))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheDirective, Warning};

    #[test]
    fn test_format_directives() {
        let directives = [
            CacheDirective::private(),
            CacheDirective::max_age(60),
            CacheDirective::new("community", Some("UCI".into())),
        ];
        assert_eq!(CacheDirective::format_header(&directives), "private, max-age=60, community=\"UCI\"");
        assert!(directives[1].is_digit());
    }

    #[test]
    fn test_warning() {
        let mut warning = Warning::new(Warning::TRANSFORMATION_APPLIED, "proxy", "gzip applied");
        assert_eq!(warning.to_string(), "214 proxy \"gzip applied\"");

        warning.set_agent("edge:8080");
        warning.set_date(Some("Sat, 17 Oct 2026 10:00:00 GMT".into()));
        assert_eq!(warning.to_string(), "214 edge:8080 \"gzip applied\" \"Sat, 17 Oct 2026 10:00:00 GMT\"");
    }
}
