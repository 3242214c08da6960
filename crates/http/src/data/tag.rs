//! HTTP entity tags as used by `ETag`, `If-Match` and `If-None-Match`.

use std::fmt;

use tracing::warn;

use crate::error::ParseError;
use crate::utils::{ensure, split_unquoted};

/// An entity tag, either strong (`"v"`) or weak (`W/"v"`).
///
/// The derived equality is the strict comparison: the weak flag has to match as well.
/// Use [`Tag::equals`] to pick the comparison explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    name: String,
    weak: bool,
}

impl Tag {
    /// The wildcard tag matching any current entity.
    pub const ALL_NAME: &'static str = "*";

    pub fn new(name: impl Into<String>, weak: bool) -> Self {
        Self { name: name.into(), weak }
    }

    pub fn strong(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn weak(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// The `*` tag.
    pub fn all() -> Self {
        Self::strong(Self::ALL_NAME)
    }

    /// Parses a tag literal, reporting malformed input with a warning.
    pub fn parse(literal: &str) -> Option<Self> {
        match Self::try_parse(literal) {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!(cause = %e, "unable to parse entity tag");
                None
            }
        }
    }

    pub fn try_parse(literal: &str) -> Result<Self, ParseError> {
        let trimmed = literal.trim();
        let (weak, rest) = match trimmed.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if rest == Self::ALL_NAME {
            return Ok(Self::new(Self::ALL_NAME, weak));
        }

        ensure!(rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"'), ParseError::invalid_tag(literal));
        let name = &rest[1..rest.len() - 1];
        ensure!(!name.is_empty() && !name.contains('"'), ParseError::invalid_tag(literal));

        Ok(Self::new(name, weak))
    }

    /// Parses a comma separated list of tags, skipping (and logging) invalid members.
    ///
    /// Commas inside quoted tags belong to the tag.
    pub fn parse_list(header: &str) -> Vec<Self> {
        split_unquoted(header, ',')
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(Self::parse)
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    pub fn is_all(&self) -> bool {
        self.name == Self::ALL_NAME
    }

    /// Compares two tags; when `check_weakness` is false only the names are compared.
    pub fn equals(&self, other: &Tag, check_weakness: bool) -> bool {
        self.name == other.name && (!check_weakness || self.weak == other.weak)
    }

    /// Formats the tag as an HTTP literal.
    pub fn format(&self) -> String {
        if self.is_all() {
            return if self.weak { format!("W/{}", Self::ALL_NAME) } else { Self::ALL_NAME.to_string() };
        }

        if self.weak { format!("W/\"{}\"", self.name) } else { format!("\"{}\"", self.name) }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
