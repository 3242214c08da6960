//! Authentication challenges (`WWW-Authenticate`) and `Authentication-Info`.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use http::Uri;
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::data::{DigestAlgorithm, Form};
use crate::error::ParseError;
use crate::utils::{lazy_mut, quote, split_unquoted, unquote};

/// An authentication scheme, compared case-insensitively by its technical name.
#[derive(Debug, Clone)]
pub struct ChallengeScheme {
    name: Cow<'static, str>,
    technical_name: Cow<'static, str>,
}

impl ChallengeScheme {
    pub const HTTP_BASIC: ChallengeScheme = ChallengeScheme::registered("HTTP_BASIC", "Basic");
    pub const HTTP_DIGEST: ChallengeScheme = ChallengeScheme::registered("HTTP_DIGEST", "Digest");
    pub const HTTP_BEARER: ChallengeScheme = ChallengeScheme::registered("HTTP_BEARER", "Bearer");

    const fn registered(name: &'static str, technical_name: &'static str) -> Self {
        Self { name: Cow::Borrowed(name), technical_name: Cow::Borrowed(technical_name) }
    }

    pub fn new(name: impl Into<String>, technical_name: impl Into<String>) -> Self {
        Self { name: Cow::Owned(name.into()), technical_name: Cow::Owned(technical_name.into()) }
    }

    /// Resolves the scheme token of an authentication header.
    pub fn value_of(technical_name: &str) -> Self {
        [Self::HTTP_BASIC, Self::HTTP_DIGEST, Self::HTTP_BEARER]
            .into_iter()
            .find(|scheme| scheme.technical_name.eq_ignore_ascii_case(technical_name))
            .unwrap_or_else(|| Self::new(format!("HTTP_{}", technical_name.to_ascii_uppercase()), technical_name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn technical_name(&self) -> &str {
        &self.technical_name
    }
}

impl PartialEq for ChallengeScheme {
    fn eq(&self, other: &Self) -> bool {
        self.technical_name.eq_ignore_ascii_case(&other.technical_name)
    }
}

impl Eq for ChallengeScheme {}

impl Hash for ChallengeScheme {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.technical_name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for ChallengeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.technical_name)
    }
}

/// The part shared by every challenge: scheme, realm and scheme parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeMessage {
    scheme: ChallengeScheme,
    realm: Option<String>,
    parameters: Form,
    digest_algorithm: DigestAlgorithm,
    opaque: Option<String>,
    server_nonce: Option<String>,
}

impl ChallengeMessage {
    pub fn new(scheme: ChallengeScheme, realm: Option<String>) -> Self {
        Self {
            scheme,
            realm,
            parameters: Form::new(),
            digest_algorithm: DigestAlgorithm::Md5,
            opaque: None,
            server_nonce: None,
        }
    }

    pub fn scheme(&self) -> &ChallengeScheme {
        &self.scheme
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn parameters(&self) -> &Form {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Form {
        &mut self.parameters
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    pub fn set_digest_algorithm(&mut self, digest_algorithm: DigestAlgorithm) {
        self.digest_algorithm = digest_algorithm;
    }

    pub fn opaque(&self) -> Option<&str> {
        self.opaque.as_deref()
    }

    pub fn set_opaque(&mut self, opaque: Option<String>) {
        self.opaque = opaque;
    }

    pub fn server_nonce(&self) -> Option<&str> {
        self.server_nonce.as_deref()
    }

    pub fn set_server_nonce(&mut self, server_nonce: Option<String>) {
        self.server_nonce = server_nonce;
    }
}

/// A challenge issued by a server in `WWW-Authenticate`.
///
/// The domain references default to `/` and the quality options to `auth`; both lists
/// are created on first access.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
    message: ChallengeMessage,
    domain_refs: OnceCell<Vec<Uri>>,
    quality_options: OnceCell<Vec<String>>,
    stale: bool,
}

impl ChallengeRequest {
    pub const QUALITY_AUTHENTICATION: &'static str = "auth";
    pub const QUALITY_AUTHENTICATION_INTEGRITY: &'static str = "auth-int";

    pub fn new(scheme: ChallengeScheme, realm: impl Into<String>) -> Self {
        Self::from_message(ChallengeMessage::new(scheme, Some(realm.into())))
    }

    pub fn from_message(message: ChallengeMessage) -> Self {
        Self { message, domain_refs: OnceCell::new(), quality_options: OnceCell::new(), stale: false }
    }

    pub fn message(&self) -> &ChallengeMessage {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut ChallengeMessage {
        &mut self.message
    }

    pub fn domain_refs(&self) -> &[Uri] {
        self.domain_refs.get_or_init(default_domain_refs)
    }

    pub fn domain_refs_mut(&mut self) -> &mut Vec<Uri> {
        lazy_mut(&mut self.domain_refs, default_domain_refs)
    }

    /// Adds a protection-space reference unless already present.
    pub fn add_domain_ref(&mut self, reference: Uri) {
        let refs = self.domain_refs_mut();
        if !refs.contains(&reference) {
            refs.push(reference);
        }
    }

    pub fn quality_options(&self) -> &[String] {
        self.quality_options.get_or_init(default_quality_options)
    }

    pub fn quality_options_mut(&mut self) -> &mut Vec<String> {
        lazy_mut(&mut self.quality_options, default_quality_options)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn set_stale(&mut self, stale: bool) {
        self.stale = stale;
    }

    /// Renders the `WWW-Authenticate` header value.
    pub fn to_header_value(&self) -> String {
        let message = &self.message;
        let mut params: Vec<String> = vec![];

        if let Some(realm) = message.realm() {
            params.push(format!("realm={}", quote(realm)));
        }

        if message.scheme == ChallengeScheme::HTTP_DIGEST {
            let domain = self.domain_refs().iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
            params.push(format!("domain={}", quote(&domain)));
            if let Some(nonce) = message.server_nonce() {
                params.push(format!("nonce={}", quote(nonce)));
            }
            if let Some(opaque) = message.opaque() {
                params.push(format!("opaque={}", quote(opaque)));
            }
            if self.stale {
                params.push("stale=true".to_string());
            }
            params.push(format!("algorithm={}", message.digest_algorithm));
            params.push(format!("qop={}", quote(&self.quality_options().join(","))));
        }

        for parameter in &message.parameters {
            params.push(format!("{}={}", parameter.name(), quote(parameter.value().unwrap_or_default())));
        }

        if params.is_empty() { message.scheme.to_string() } else { format!("{} {}", message.scheme, params.join(", ")) }
    }

    /// Parses a single `WWW-Authenticate` challenge, logging malformed input.
    pub fn parse_header(value: &str) -> Option<ChallengeRequest> {
        let value = value.trim();
        let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
        if scheme.is_empty() {
            warn!(cause = %ParseError::invalid_form(value), "unable to parse challenge");
            return None;
        }

        let mut message = ChallengeMessage::new(ChallengeScheme::value_of(scheme), None);
        let mut request_domain: Option<Vec<Uri>> = None;
        let mut quality_options: Option<Vec<String>> = None;
        let mut stale = false;

        for (name, param) in parse_auth_params(rest) {
            match name.to_ascii_lowercase().as_str() {
                "realm" => message.realm = Some(param),
                "nonce" => message.server_nonce = Some(param),
                "opaque" => message.opaque = Some(param),
                "stale" => stale = param.eq_ignore_ascii_case("true"),
                "algorithm" => match DigestAlgorithm::from_name(&param) {
                    Some(algorithm) => message.digest_algorithm = algorithm,
                    None => warn!(algorithm = %param, "unsupported digest algorithm in challenge"),
                },
                "domain" => {
                    request_domain =
                        Some(param.split_whitespace().filter_map(|reference| reference.parse::<Uri>().ok()).collect());
                }
                "qop" => quality_options = Some(param.split(',').map(|q| q.trim().to_string()).collect()),
                _ => {
                    message.parameters.add(name, param);
                }
            }
        }

        let mut request = ChallengeRequest::from_message(message);
        request.stale = stale;
        if let Some(refs) = request_domain {
            request.domain_refs = OnceCell::with_value(refs);
        }
        if let Some(options) = quality_options {
            request.quality_options = OnceCell::with_value(options);
        }
        Some(request)
    }
}

impl PartialEq for ChallengeRequest {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.domain_refs() == other.domain_refs()
            && self.quality_options() == other.quality_options()
            && self.stale == other.stale
    }
}

impl Eq for ChallengeRequest {}

impl Hash for ChallengeRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
        self.domain_refs().hash(state);
        self.quality_options().hash(state);
        self.stale.hash(state);
    }
}

fn default_domain_refs() -> Vec<Uri> {
    vec![Uri::from_static("/")]
}

fn default_quality_options() -> Vec<String> {
    vec![ChallengeRequest::QUALITY_AUTHENTICATION.to_string()]
}

/// The `Authentication-Info` sent after a successful digest authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AuthenticationInfo {
    next_server_nonce: Option<String>,
    nonce_count: u32,
    client_nonce: Option<String>,
    quality: Option<String>,
    response_digest: Option<String>,
}

impl AuthenticationInfo {
    pub fn new(next_server_nonce: Option<String>, nonce_count: u32, client_nonce: Option<String>) -> Self {
        Self { next_server_nonce, nonce_count, client_nonce, quality: None, response_digest: None }
    }

    pub fn next_server_nonce(&self) -> Option<&str> {
        self.next_server_nonce.as_deref()
    }

    pub fn nonce_count(&self) -> u32 {
        self.nonce_count
    }

    pub fn client_nonce(&self) -> Option<&str> {
        self.client_nonce.as_deref()
    }

    pub fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }

    pub fn response_digest(&self) -> Option<&str> {
        self.response_digest.as_deref()
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_response_digest(mut self, response_digest: impl Into<String>) -> Self {
        self.response_digest = Some(response_digest.into());
        self
    }

    /// Renders the `Authentication-Info` header value.
    pub fn to_header_value(&self) -> String {
        let mut params: Vec<String> = vec![];
        if let Some(nonce) = &self.next_server_nonce {
            params.push(format!("nextnonce={}", quote(nonce)));
        }
        if let Some(quality) = &self.quality {
            params.push(format!("qop={quality}"));
        }
        if let Some(digest) = &self.response_digest {
            params.push(format!("rspauth={}", quote(digest)));
        }
        if let Some(client_nonce) = &self.client_nonce {
            params.push(format!("cnonce={}", quote(client_nonce)));
        }
        if self.nonce_count > 0 {
            params.push(format!("nc={:08x}", self.nonce_count));
        }
        params.join(", ")
    }

    pub fn parse_header(value: &str) -> AuthenticationInfo {
        let mut info = AuthenticationInfo::default();
        for (name, param) in parse_auth_params(value) {
            match name.to_ascii_lowercase().as_str() {
                "nextnonce" => info.next_server_nonce = Some(param),
                "qop" => info.quality = Some(param),
                "rspauth" => info.response_digest = Some(param),
                "cnonce" => info.client_nonce = Some(param),
                "nc" => match u32::from_str_radix(&param, 16) {
                    Ok(count) => info.nonce_count = count,
                    Err(e) => warn!(cause = %e, nc = %param, "invalid nonce count"),
                },
                _ => warn!(name = %name, "ignoring unknown authentication-info parameter"),
            }
        }
        info
    }
}

/// Splits `a="x, y", b=z` into name/value pairs, honoring quoted commas.
fn parse_auth_params(input: &str) -> Vec<(String, String)> {
    split_unquoted(input, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            let value = unquote(value.trim()).into_owned();
            Some((name.trim().to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{AuthenticationInfo, ChallengeMessage, ChallengeRequest, ChallengeScheme};
    use crate::data::DigestAlgorithm;
    use http::Uri;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_lazy_defaults() {
        let request = ChallengeRequest::new(ChallengeScheme::HTTP_DIGEST, "api");
        assert_eq!(request.domain_refs(), &[Uri::from_static("/")]);
        assert_eq!(request.quality_options(), &["auth".to_string()]);
        assert!(std::ptr::eq(request.domain_refs(), request.domain_refs()));
    }

    #[test]
    fn test_add_domain_ref_is_a_set() {
        let mut request = ChallengeRequest::new(ChallengeScheme::HTTP_DIGEST, "api");
        request.add_domain_ref(Uri::from_static("/private"));
        request.add_domain_ref(Uri::from_static("/private"));
        request.add_domain_ref(Uri::from_static("/"));
        assert_eq!(request.domain_refs().len(), 2);
    }

    #[test]
    fn test_equality_is_layered() {
        let a = ChallengeRequest::new(ChallengeScheme::HTTP_DIGEST, "api");
        let mut b = ChallengeRequest::new(ChallengeScheme::value_of("digest"), "api");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        b.set_stale(true);
        assert_ne!(a, b);

        let other_realm = ChallengeRequest::new(ChallengeScheme::HTTP_DIGEST, "admin");
        assert_ne!(a, other_realm);

        let mut message = ChallengeMessage::new(ChallengeScheme::HTTP_DIGEST, Some("api".into()));
        message.set_digest_algorithm(DigestAlgorithm::Sha256);
        assert_ne!(a, ChallengeRequest::from_message(message));
    }

    #[test]
    fn test_digest_header() {
        let mut request = ChallengeRequest::new(ChallengeScheme::HTTP_DIGEST, "api");
        request.message_mut().set_server_nonce(Some("n0nce".into()));
        request.set_stale(true);

        assert_eq!(
            request.to_header_value(),
            "Digest realm=\"api\", domain=\"/\", nonce=\"n0nce\", stale=true, algorithm=MD5, qop=\"auth\""
        );
    }

    #[test]
    fn test_basic_header_round_trip() {
        let mut request = ChallengeRequest::new(ChallengeScheme::HTTP_BASIC, "my realm");
        request.message_mut().parameters_mut().add("charset", "UTF-8");
        let header = request.to_header_value();
        assert_eq!(header, "Basic realm=\"my realm\", charset=\"UTF-8\"");

        let parsed = ChallengeRequest::parse_header(&header).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_digest_header_round_trip() {
        let mut message = ChallengeMessage::new(ChallengeScheme::HTTP_DIGEST, Some("api".into()));
        message.set_digest_algorithm(DigestAlgorithm::Sha256);
        let request = ChallengeRequest::from_message(message);

        let header = request.to_header_value();
        assert_eq!(header, "Digest realm=\"api\", domain=\"/\", algorithm=SHA-256, qop=\"auth\"");

        let parsed = ChallengeRequest::parse_header(&header).unwrap();
        assert_eq!(parsed.message().digest_algorithm(), DigestAlgorithm::Sha256);
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_parse_digest_header() {
        let parsed = ChallengeRequest::parse_header(
            "Digest realm=\"api\", domain=\"/ /private\", nonce=\"abc\", qop=\"auth,auth-int\", stale=TRUE",
        )
        .unwrap();

        assert_eq!(parsed.message().scheme(), &ChallengeScheme::HTTP_DIGEST);
        assert_eq!(parsed.message().realm(), Some("api"));
        assert_eq!(parsed.message().server_nonce(), Some("abc"));
        assert_eq!(parsed.domain_refs().len(), 2);
        assert_eq!(parsed.quality_options(), &["auth".to_string(), "auth-int".to_string()]);
        assert!(parsed.is_stale());
    }

    #[test]
    fn test_authentication_info() {
        let info = AuthenticationInfo::new(Some("next".into()), 1, Some("c".into()))
            .with_quality("auth")
            .with_response_digest("d1g");

        let header = info.to_header_value();
        assert_eq!(header, "nextnonce=\"next\", qop=auth, rspauth=\"d1g\", cnonce=\"c\", nc=00000001");
        assert_eq!(AuthenticationInfo::parse_header(&header), info);
    }
}
