use std::io::Read;

use mime::Mime;

use crate::data::{Digest, DigestAlgorithm, Encoding, Tag};
use crate::error::{DigestError, RepresentationError};
use crate::representation::Representation;

/// A reusable in-memory textual entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRepresentation {
    text: String,
    media_type: Mime,
    encodings: Vec<Encoding>,
    tag: Option<Tag>,
    digest: Option<Digest>,
}

impl StringRepresentation {
    pub fn new(text: impl Into<String>, media_type: Mime) -> Self {
        Self { text: text.into(), media_type, encodings: vec![], tag: None, digest: None }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, mime::TEXT_PLAIN_UTF_8)
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encodings.push(encoding);
        self
    }

    pub fn with_digest(mut self, digest: Digest) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Computes and attaches a digest of the current text.
    pub fn with_computed_digest(self, algorithm: DigestAlgorithm) -> Result<Self, DigestError> {
        let digest = Digest::compute(algorithm, self.text.as_bytes())?;
        Ok(self.with_digest(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Representation for StringRepresentation {
    fn media_type(&self) -> &Mime {
        &self.media_type
    }

    fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    fn size(&self) -> Option<u64> {
        Some(self.text.len() as u64)
    }

    fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, RepresentationError> {
        Ok(Box::new(self.text.as_bytes()))
    }

    fn text(&self) -> Result<String, RepresentationError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::StringRepresentation;
    use crate::data::{DigestAlgorithm, Tag};
    use crate::representation::Representation;
    use http_body_util::BodyExt;
    use std::io::BufRead;

    #[test]
    fn test_reusable() {
        let entity = StringRepresentation::plain("hello").with_tag(Tag::strong("v1"));

        assert_eq!(entity.size(), Some(5));
        assert_eq!(entity.text().unwrap(), "hello");
        assert_eq!(entity.text().unwrap(), "hello");
        assert!(entity.is_available());
        assert!(!entity.is_transient());
        assert_eq!(entity.tag(), Some(&Tag::strong("v1")));
        assert_eq!(entity.media_type(), &mime::TEXT_PLAIN_UTF_8);
    }

    #[test]
    fn test_write_and_reader() {
        let entity = StringRepresentation::plain("line one\nline two\n");
        let mut target = Vec::new();
        assert_eq!(entity.write(&mut target).unwrap(), 18);
        assert_eq!(target, b"line one\nline two\n");

        let lines = entity.reader().unwrap().lines().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[test]
    fn test_computed_digest() {
        let entity = StringRepresentation::plain("abc").with_computed_digest(DigestAlgorithm::Sha256).unwrap();
        assert_eq!(
            entity.digest().unwrap().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(StringRepresentation::plain("abc").with_computed_digest(DigestAlgorithm::Md5).is_err());
    }

    #[tokio::test]
    async fn test_channel() {
        let entity = StringRepresentation::plain("streamed");
        let body = entity.channel().unwrap();
        assert_eq!(http_body::Body::size_hint(&body).exact(), Some(8));

        let body = body.collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"streamed");
    }
}
