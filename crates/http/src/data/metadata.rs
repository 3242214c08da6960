//! Negotiable metadata: the things a client expresses preferences about.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use mime::Mime;

use crate::data::Encoding;

/// Metadata that can be negotiated through a [`Preference`](crate::data::Preference).
pub trait Metadata {
    /// Whether this (possibly wildcard) value covers `other`.
    fn includes(&self, other: &Self) -> bool;

    /// How specific the value is; a more specific match overrides a broader one.
    fn specificity(&self) -> usize;
}

impl Metadata for Mime {
    fn includes(&self, other: &Self) -> bool {
        if self.type_() == mime::STAR {
            return true;
        }
        if self.type_() != other.type_() {
            return false;
        }
        if self.subtype() == mime::STAR {
            return true;
        }
        self.subtype() == other.subtype()
            && self.params().all(|(name, value)| other.get_param(name).is_some_and(|v| v == value))
    }

    fn specificity(&self) -> usize {
        if self.type_() == mime::STAR {
            0
        } else if self.subtype() == mime::STAR {
            1
        } else {
            2 + self.params().count()
        }
    }
}

impl Metadata for Encoding {
    fn includes(&self, other: &Self) -> bool {
        Encoding::includes(self, other)
    }

    fn specificity(&self) -> usize {
        usize::from(*self != Encoding::ALL)
    }
}

/// A language tag such as `en` or `fr-CA`, compared case-insensitively.
#[derive(Debug, Clone, Eq)]
pub struct Language(String);

impl Language {
    pub const ALL_NAME: &'static str = "*";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn all() -> Self {
        Self::new(Self::ALL_NAME)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn primary_tag(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Metadata for Language {
    fn includes(&self, other: &Self) -> bool {
        if self.0 == Self::ALL_NAME || self == other {
            return true;
        }
        // `en` covers `en-US`
        other.0.len() > self.0.len()
            && other.0.as_bytes()[self.0.len()] == b'-'
            && other.0[..self.0.len()].eq_ignore_ascii_case(&self.0)
    }

    fn specificity(&self) -> usize {
        if self.0 == Self::ALL_NAME { 0 } else { self.0.split('-').count() }
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A character set name such as `utf-8`, compared case-insensitively.
#[derive(Debug, Clone, Eq)]
pub struct CharacterSet(String);

impl CharacterSet {
    pub const ALL_NAME: &'static str = "*";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn utf_8() -> Self {
        Self::new("UTF-8")
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for CharacterSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Metadata for CharacterSet {
    fn includes(&self, other: &Self) -> bool {
        self.0 == Self::ALL_NAME || self == other
    }

    fn specificity(&self) -> usize {
        usize::from(self.0 != Self::ALL_NAME)
    }
}

impl FromStr for CharacterSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
