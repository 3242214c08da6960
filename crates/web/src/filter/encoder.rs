use http::header::VARY;
use http::{HeaderValue, StatusCode};
use tracing::{debug, trace, warn};
use uniform_http::data::Encoding;
use uniform_http::message::{Request, Response};
use uniform_http::representation::EncodeRepresentation;

use crate::filter::Filter;

/// Compresses response entities with the best encoding the client accepts.
///
/// Responses are left untouched when they can't carry a body (`1xx`, `204`, `304`), when
/// the entity is missing, unavailable, already encoded or known to be smaller than
/// [`minimum_size`](EncodeFilterBuilder::minimum_size), and when the client sent no
/// `Accept-Encoding` preference or prefers `identity`.
#[derive(Debug, Clone)]
pub struct EncodeFilter {
    // supported encodings in server preference order, `identity` last
    candidates: Vec<Encoding>,
    minimum_size: u64,
}

impl EncodeFilter {
    pub const DEFAULT_MINIMUM_SIZE: u64 = 1024;

    pub fn builder() -> EncodeFilterBuilder {
        EncodeFilterBuilder::new()
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.candidates[..self.candidates.len() - 1]
    }

    pub fn minimum_size(&self) -> u64 {
        self.minimum_size
    }

    fn select(&self, request: &Request) -> Option<&Encoding> {
        let client_info = request.client_info();
        if client_info.accepted_encodings().is_empty() {
            return None;
        }
        client_info.preferred_encoding(&self.candidates).filter(|encoding| **encoding != Encoding::IDENTITY)
    }
}

impl Default for EncodeFilter {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Filter for EncodeFilter {
    fn after_handle(&self, request: &mut Request, response: &mut Response) {
        let status = response.status().code();
        if status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
            return;
        }

        let Some(entity) = response.entity() else {
            return;
        };
        if !entity.is_available() || entity.encodings().iter().any(|encoding| *encoding != Encoding::IDENTITY) {
            return;
        }
        if let Some(size) = entity.size().filter(|size| *size < self.minimum_size) {
            trace!(response = %response.id(), size, minimum_size = self.minimum_size, "entity too small to encode");
            return;
        }

        let Some(encoding) = self.select(request).cloned() else {
            return;
        };
        let Some(entity) = response.take_entity() else {
            return;
        };
        match EncodeRepresentation::new(encoding.clone(), entity) {
            Ok(encoded) => {
                response.set_entity(Box::new(encoded));
                response.headers_mut().append(VARY, HeaderValue::from_static("accept-encoding"));
                debug!(response = %response.id(), %encoding, "encoded response entity");
            }
            Err(e) => warn!(cause = %e, response = %response.id(), "unable to encode response entity"),
        }
    }
}

#[derive(Debug)]
pub struct EncodeFilterBuilder {
    encodings: Vec<Encoding>,
    minimum_size: u64,
}

impl EncodeFilterBuilder {
    fn new() -> Self {
        let encodings = EncodeRepresentation::SUPPORTED.into_iter().filter(|e| *e != Encoding::IDENTITY).collect();
        Self { encodings, minimum_size: EncodeFilter::DEFAULT_MINIMUM_SIZE }
    }

    /// Replaces the offered encodings, most preferred first. Encodings that can't be
    /// applied are logged and left out.
    pub fn encodings(mut self, encodings: impl IntoIterator<Item = Encoding>) -> Self {
        self.encodings.clear();
        for encoding in encodings {
            if encoding == Encoding::IDENTITY || self.encodings.contains(&encoding) {
                continue;
            }
            if EncodeRepresentation::can_encode(&encoding) {
                self.encodings.push(encoding);
            } else {
                warn!(%encoding, "unsupported encoding, ignoring it");
            }
        }
        self
    }

    /// Entities whose size is known and below this value are sent as is.
    pub fn minimum_size(mut self, minimum_size: u64) -> Self {
        self.minimum_size = minimum_size;
        self
    }

    pub fn build(self) -> EncodeFilter {
        let mut candidates = self.encodings;
        candidates.push(Encoding::IDENTITY);
        EncodeFilter { candidates, minimum_size: self.minimum_size }
    }
}

#[cfg(test)]
mod tests {
    use super::EncodeFilter;
    use crate::filter::Filter;
    use flate2::read::GzDecoder;
    use http::StatusCode;
    use std::io::Read;
    use uniform_http::data::Encoding;
    use uniform_http::message::{Request, Response};
    use uniform_http::representation::StringRepresentation;

    fn request(accept_encoding: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/report");
        if let Some(value) = accept_encoding {
            builder = builder.header("Accept-Encoding", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        Request::from(parts)
    }

    fn response(text: &str) -> Response {
        let mut response = Response::new();
        response.set_entity_text(text, mime::TEXT_PLAIN_UTF_8);
        response
    }

    #[test]
    fn test_encodes_large_entity() {
        let text = "uniform ".repeat(512);
        let mut response = response(&text);

        EncodeFilter::default().after_handle(&mut request(Some("gzip")), &mut response);

        let entity = response.entity().unwrap();
        assert_eq!(entity.encodings(), &[Encoding::GZIP]);
        assert_eq!(entity.size(), None);
        assert_eq!(response.headers().get("vary").unwrap(), "accept-encoding");

        let mut decoded = String::new();
        GzDecoder::new(entity.stream().unwrap()).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_leaves_small_entity() {
        let mut response = response("tiny");

        EncodeFilter::default().after_handle(&mut request(Some("gzip")), &mut response);

        assert!(response.entity().unwrap().encodings().is_empty());
        assert!(response.headers().get("vary").is_none());
    }

    #[test]
    fn test_follows_client_preference() {
        let filter = EncodeFilter::builder().minimum_size(0).build();

        let mut response = response("payload");
        filter.after_handle(&mut request(Some("gzip;q=0.5, br")), &mut response);
        assert_eq!(response.entity().unwrap().encodings(), &[Encoding::BROTLI]);

        let mut response = self::response("payload");
        filter.after_handle(&mut request(Some("identity, gzip;q=0.5")), &mut response);
        assert!(response.entity().unwrap().encodings().is_empty());

        let mut response = self::response("payload");
        filter.after_handle(&mut request(None), &mut response);
        assert!(response.entity().unwrap().encodings().is_empty());
    }

    #[test]
    fn test_skips_bodiless_and_encoded() {
        let filter = EncodeFilter::builder().minimum_size(0).build();

        let mut response = response("payload");
        response.set_status(StatusCode::NOT_MODIFIED);
        filter.after_handle(&mut request(Some("gzip")), &mut response);
        assert!(response.entity().unwrap().encodings().is_empty());

        let mut response = Response::new();
        response.set_entity(Box::new(StringRepresentation::plain("payload").with_encoding(Encoding::DEFLATE)));
        filter.after_handle(&mut request(Some("gzip")), &mut response);
        assert_eq!(response.entity().unwrap().encodings(), &[Encoding::DEFLATE]);

        let mut response = Response::new();
        filter.after_handle(&mut request(Some("gzip")), &mut response);
        assert!(response.entity().is_none());
    }

    #[test]
    fn test_builder_drops_unsupported() {
        let filter = EncodeFilter::builder()
            .encodings([Encoding::COMPRESS, Encoding::GZIP, Encoding::IDENTITY, Encoding::GZIP, Encoding::DEFLATE])
            .build();

        assert_eq!(filter.encodings(), &[Encoding::GZIP, Encoding::DEFLATE]);
        assert_eq!(filter.minimum_size(), EncodeFilter::DEFAULT_MINIMUM_SIZE);
    }
}
