use http::HeaderMap;
use http::header::{HeaderName, ACCEPT, ACCEPT_CHARSET, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};
use mime::Mime;
use tracing::warn;

use crate::data::{CharacterSet, Encoding, Language, Preference};

/// What the client told us about itself: its agent name and its content preferences.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    agent: Option<String>,
    accepted_media_types: Vec<Preference<Mime>>,
    accepted_encodings: Vec<Preference<Encoding>>,
    accepted_languages: Vec<Preference<Language>>,
    accepted_character_sets: Vec<Preference<CharacterSet>>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `User-Agent` and the `Accept*` headers; every list ends up sorted by quality.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = |name: HeaderName| {
            let values = headers
                .get_all(&name)
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
        };

        let mut info = Self {
            agent: headers.get(USER_AGENT).and_then(|value| value.to_str().ok()).map(str::to_string),
            accepted_media_types: Preference::parse_header(&joined(ACCEPT)),
            accepted_encodings: Preference::parse_header(&joined(ACCEPT_ENCODING)),
            accepted_languages: Preference::parse_header(&joined(ACCEPT_LANGUAGE)),
            accepted_character_sets: Preference::parse_header(&joined(ACCEPT_CHARSET)),
        };
        info.sort_preferences();
        info
    }

    fn sort_preferences(&mut self) {
        Preference::sort_by_quality(&mut self.accepted_media_types);
        Preference::sort_by_quality(&mut self.accepted_encodings);
        Preference::sort_by_quality(&mut self.accepted_languages);
        Preference::sort_by_quality(&mut self.accepted_character_sets);
    }

    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    pub fn set_agent(&mut self, agent: Option<String>) {
        self.agent = agent;
    }

    pub fn accepted_media_types(&self) -> &[Preference<Mime>] {
        &self.accepted_media_types
    }

    pub fn accepted_media_types_mut(&mut self) -> &mut Vec<Preference<Mime>> {
        &mut self.accepted_media_types
    }

    pub fn accepted_encodings(&self) -> &[Preference<Encoding>] {
        &self.accepted_encodings
    }

    pub fn accepted_encodings_mut(&mut self) -> &mut Vec<Preference<Encoding>> {
        &mut self.accepted_encodings
    }

    pub fn accepted_languages(&self) -> &[Preference<Language>] {
        &self.accepted_languages
    }

    pub fn accepted_languages_mut(&mut self) -> &mut Vec<Preference<Language>> {
        &mut self.accepted_languages
    }

    pub fn accepted_character_sets(&self) -> &[Preference<CharacterSet>] {
        &self.accepted_character_sets
    }

    pub fn accepted_character_sets_mut(&mut self) -> &mut Vec<Preference<CharacterSet>> {
        &mut self.accepted_character_sets
    }

    pub fn preferred_media_type<'a>(&self, candidates: &'a [Mime]) -> Option<&'a Mime> {
        Preference::best_match(&self.accepted_media_types, candidates)
    }

    pub fn preferred_encoding<'a>(&self, candidates: &'a [Encoding]) -> Option<&'a Encoding> {
        Preference::best_match(&self.accepted_encodings, candidates)
    }

    pub fn preferred_language<'a>(&self, candidates: &'a [Language]) -> Option<&'a Language> {
        Preference::best_match(&self.accepted_languages, candidates)
    }

    pub fn preferred_character_set<'a>(&self, candidates: &'a [CharacterSet]) -> Option<&'a CharacterSet> {
        Preference::best_match(&self.accepted_character_sets, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientInfo;
    use crate::data::{Encoding, Language};
    use http::HeaderMap;
    use http::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, "curl/8.5.0".parse().unwrap());
        headers.insert(ACCEPT, "text/html;q=0.8, application/json".parse().unwrap());
        headers.append(ACCEPT_ENCODING, "gzip;q=0.5".parse().unwrap());
        headers.append(ACCEPT_ENCODING, "br, identity;q=0".parse().unwrap());
        headers.insert(ACCEPT_LANGUAGE, "fr-CA, en;q=0.7".parse().unwrap());
        headers
    }

    #[test]
    fn test_from_headers() {
        let info = ClientInfo::from_headers(&headers());

        assert_eq!(info.agent(), Some("curl/8.5.0"));
        assert_eq!(info.accepted_media_types()[0].metadata(), &mime::APPLICATION_JSON);
        assert_eq!(info.accepted_encodings().len(), 3);
        assert_eq!(info.accepted_encodings()[0].metadata(), &Encoding::BROTLI);
    }

    #[test]
    fn test_preferred_values() {
        let info = ClientInfo::from_headers(&headers());

        let candidates = [Encoding::GZIP, Encoding::IDENTITY, Encoding::ZSTD];
        assert_eq!(info.preferred_encoding(&candidates), Some(&Encoding::GZIP));

        let media_types = [mime::TEXT_HTML, mime::APPLICATION_JSON];
        assert_eq!(info.preferred_media_type(&media_types), Some(&mime::APPLICATION_JSON));

        let languages = [Language::new("en-US"), Language::new("fr")];
        assert_eq!(info.preferred_language(&languages), Some(&Language::new("en-US")));
    }

    #[test]
    fn test_empty_client_accepts_nothing_in_particular() {
        let info = ClientInfo::new();
        assert_eq!(info.agent(), None);
        assert_eq!(info.preferred_encoding(&[Encoding::GZIP]), None);
    }
}
