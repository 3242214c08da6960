//! Content codings as used by `Accept-Encoding` and `Content-Encoding`.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A content coding, compared case-insensitively by name.
#[derive(Debug, Clone)]
pub struct Encoding {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
}

static REGISTERED: [Encoding; 10] = [
    Encoding::ALL,
    Encoding::IDENTITY,
    Encoding::GZIP,
    Encoding::DEFLATE,
    Encoding::COMPRESS,
    Encoding::ZIP,
    Encoding::BROTLI,
    Encoding::ZSTD,
    Encoding::FREEMARKER,
    Encoding::VELOCITY,
];

impl Encoding {
    pub const ALL: Encoding = Encoding::registered("*", "All encodings");
    pub const IDENTITY: Encoding = Encoding::registered("identity", "The default encoding with no transformation");
    pub const GZIP: Encoding = Encoding::registered("gzip", "GZip compression");
    pub const DEFLATE: Encoding = Encoding::registered("deflate", "Deflate compression (zlib format)");
    pub const COMPRESS: Encoding = Encoding::registered("compress", "Common Unix compression");
    pub const ZIP: Encoding = Encoding::registered("zip", "Zip compression");
    pub const BROTLI: Encoding = Encoding::registered("br", "Brotli compression");
    pub const ZSTD: Encoding = Encoding::registered("zstd", "Zstandard compression");
    pub const FREEMARKER: Encoding = Encoding::registered("freemarker", "FreeMarker templated representation");
    pub const VELOCITY: Encoding = Encoding::registered("velocity", "Velocity templated representation");

    const fn registered(name: &'static str, description: &'static str) -> Self {
        Self { name: Cow::Borrowed(name), description: Cow::Borrowed(description) }
    }

    /// Creates an encoding that is not part of the well-known set.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: Cow::Owned(name.into()), description: Cow::Owned(description.into()) }
    }

    /// Resolves a name against the well-known encodings, ignoring case.
    pub fn lookup(name: &str) -> Option<&'static Encoding> {
        REGISTERED.iter().find(|encoding| encoding.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Returns the well-known encoding for `name`, or a new encoding carrying just that name.
    pub fn value_of(name: &str) -> Encoding {
        match Self::lookup(name) {
            Some(encoding) => encoding.clone(),
            None => Self::new(name.trim(), ""),
        }
    }

    /// All well-known encodings.
    pub fn registered_values() -> &'static [Encoding] {
        &REGISTERED
    }

    pub fn is_registered(&self) -> bool {
        Self::lookup(&self.name).is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this encoding covers `other`; `*` covers every encoding.
    pub fn includes(&self, other: &Encoding) -> bool {
        *self == Self::ALL || self == other
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Encoding {}

impl Hash for Encoding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl FromStr for Encoding {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::value_of(s))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
