//! Message digests attached to representations.

use std::fmt;

use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::error::DigestError;

/// The algorithm a [`Digest`] value was computed with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md2,
    Md5,
    None,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    /// The `A1` hash of HTTP digest authentication (`MD5(user:realm:password)`).
    HttpDigestA1,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md2 => "MD2",
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::None => "NONE",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
            DigestAlgorithm::HttpDigestA1 => "HTTP-DIGEST-A1",
        }
    }

    /// Looks an algorithm up by its name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| algorithm.name().eq_ignore_ascii_case(name.trim()))
    }

    const ALL: [DigestAlgorithm; 8] = [
        DigestAlgorithm::Md2,
        DigestAlgorithm::Md5,
        DigestAlgorithm::None,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::HttpDigestA1,
    ];
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A digest value and the algorithm that produced it.
///
/// The bytes are copied in at construction and only handed out as a borrowed slice,
/// so nothing outside the digest can change its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    value: Box<[u8]>,
}

impl Digest {
    pub fn new(algorithm: DigestAlgorithm, value: &[u8]) -> Self {
        Self { algorithm, value: value.into() }
    }

    /// Computes the digest of `data`.
    ///
    /// Only the SHA-2 family is computed locally, other algorithms have to be supplied
    /// by the caller through [`Digest::new`].
    pub fn compute(algorithm: DigestAlgorithm, data: &[u8]) -> Result<Self, DigestError> {
        let value: Vec<u8> = match algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
            _ => return Err(DigestError::UnsupportedAlgorithm { algorithm }),
        };
        Ok(Self { algorithm, value: value.into_boxed_slice() })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Hex rendering of the value, lowercase.
    pub fn to_hex(&self) -> String {
        self.value.iter().map(|b| format!("{b:02x}")).collect()
    }
}
