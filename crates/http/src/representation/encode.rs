use std::io::{self, Read, Write};

use bytes::{Buf, Bytes, BytesMut};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use mime::Mime;
use tracing::trace;
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::data::{Digest, Encoding, Tag};
use crate::error::RepresentationError;
use crate::representation::Representation;

// inspired by actix-http's content encoder
struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One compressor per supported content encoding.
enum Encoder {
    Gzip(GzEncoder<Writer>),
    Deflate(ZlibEncoder<Writer>),
    Zstd(ZstdEncoder<'static, Writer>),
    Br(Box<brotli::CompressorWriter<Writer>>),
}

impl Encoder {
    fn gzip() -> Self {
        Self::Gzip(GzEncoder::new(Writer::new(), Compression::best()))
    }

    fn deflate() -> Self {
        Self::Deflate(ZlibEncoder::new(Writer::new(), Compression::best()))
    }

    fn zstd() -> io::Result<Self> {
        Ok(Self::Zstd(ZstdEncoder::new(Writer::new(), 6)?))
    }

    fn br() -> Self {
        Self::Br(Box::new(brotli::CompressorWriter::new(
            Writer::new(),
            32 * 1024, // 32 KiB buffer
            3,         // BROTLI_PARAM_QUALITY
            22,        // BROTLI_PARAM_LGWIN
        )))
    }

    fn for_encoding(encoding: &Encoding) -> Result<Self, RepresentationError> {
        match encoding.name().to_ascii_lowercase().as_str() {
            "gzip" => Ok(Self::gzip()),
            "deflate" => Ok(Self::deflate()),
            "zstd" => Ok(Self::zstd()?),
            "br" => Ok(Self::br()),
            _ => Err(RepresentationError::unsupported_encoding(encoding)),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Gzip(encoder) => encoder,
            Self::Deflate(encoder) => encoder,
            Self::Zstd(encoder) => encoder,
            Self::Br(encoder) => &mut **encoder,
        }
    }

    fn finish(self) -> io::Result<Bytes> {
        let writer = match self {
            Self::Gzip(encoder) => encoder.finish()?,
            Self::Deflate(encoder) => encoder.finish()?,
            Self::Zstd(encoder) => encoder.finish()?,
            Self::Br(mut encoder) => {
                encoder.flush()?;
                encoder.into_inner()
            }
        };
        Ok(writer.buf.freeze())
    }
}

/// Wraps another entity and compresses its content with one content encoding.
///
/// The compressed size is unknown until the content is streamed, so [`size`](Representation::size)
/// reports `None` unless the encoding is `identity`.
#[derive(Debug)]
pub struct EncodeRepresentation {
    encoding: Encoding,
    encodings: Vec<Encoding>,
    // weakened whenever the content is actually encoded
    tag: Option<Tag>,
    inner: Box<dyn Representation>,
}

impl EncodeRepresentation {
    /// Encodings this wrapper can apply, most preferred first.
    pub const SUPPORTED: [Encoding; 5] =
        [Encoding::ZSTD, Encoding::BROTLI, Encoding::GZIP, Encoding::DEFLATE, Encoding::IDENTITY];

    pub fn new(encoding: Encoding, inner: Box<dyn Representation>) -> Result<Self, RepresentationError> {
        if !Self::can_encode(&encoding) {
            return Err(RepresentationError::unsupported_encoding(&encoding));
        }

        let mut encodings = inner.encodings().to_vec();
        if encoding != Encoding::IDENTITY {
            encodings.push(encoding.clone());
        }
        let tag = match inner.tag() {
            Some(tag) if encoding != Encoding::IDENTITY => Some(Tag::new(tag.name(), true)),
            tag => tag.cloned(),
        };
        Ok(Self { encoding, encodings, tag, inner })
    }

    pub fn can_encode(encoding: &Encoding) -> bool {
        Self::SUPPORTED.contains(encoding)
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn inner(&self) -> &dyn Representation {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn Representation> {
        self.inner
    }

    fn encode(&self) -> Result<Bytes, RepresentationError> {
        let mut encoder = Encoder::for_encoding(&self.encoding)?;
        let written = io::copy(&mut self.inner.stream()?, encoder.writer())?;
        let bytes = encoder.finish()?;
        trace!(encoding = %self.encoding, written, encoded = bytes.len(), "encoded representation");
        Ok(bytes)
    }
}

impl Representation for EncodeRepresentation {
    fn media_type(&self) -> &Mime {
        self.inner.media_type()
    }

    fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    fn size(&self) -> Option<u64> {
        if self.encoding == Encoding::IDENTITY { self.inner.size() } else { None }
    }

    fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    fn digest(&self) -> Option<&Digest> {
        self.inner.digest()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn is_transient(&self) -> bool {
        self.inner.is_transient()
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, RepresentationError> {
        if self.encoding == Encoding::IDENTITY {
            return self.inner.stream();
        }
        Ok(Box::new(self.encode()?.reader()))
    }

    fn release(&self) {
        self.inner.release();
    }
}

#[cfg(test)]
mod tests {
    use super::EncodeRepresentation;
    use crate::data::{Encoding, Tag};
    use crate::error::RepresentationError;
    use crate::representation::{Representation, StringRepresentation};
    use flate2::read::{GzDecoder, ZlibDecoder};
    use std::io::Read;

    fn payload() -> String {
        "uniform ".repeat(512)
    }

    fn encoded(encoding: Encoding) -> Vec<u8> {
        let entity = EncodeRepresentation::new(encoding, Box::new(StringRepresentation::plain(payload()))).unwrap();
        let mut bytes = Vec::new();
        entity.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_gzip() {
        let bytes = encoded(Encoding::GZIP);
        assert!(bytes.len() < payload().len());

        let mut decoded = String::new();
        GzDecoder::new(&bytes[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, payload());
    }

    #[test]
    fn test_deflate() {
        let mut decoded = String::new();
        ZlibDecoder::new(&encoded(Encoding::DEFLATE)[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, payload());
    }

    #[test]
    fn test_zstd() {
        let decoded = zstd::decode_all(&encoded(Encoding::ZSTD)[..]).unwrap();
        assert_eq!(decoded, payload().as_bytes());
    }

    #[test]
    fn test_brotli() {
        let mut decoded = Vec::new();
        brotli::Decompressor::new(&encoded(Encoding::BROTLI)[..], 4096).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, payload().as_bytes());
    }

    #[test]
    fn test_metadata() {
        let inner = StringRepresentation::plain("x").with_encoding(Encoding::value_of("custom"));
        let entity = EncodeRepresentation::new(Encoding::GZIP, Box::new(inner)).unwrap();

        assert_eq!(entity.encodings(), &[Encoding::value_of("custom"), Encoding::GZIP]);
        assert_eq!(entity.size(), None);
        assert_eq!(entity.media_type(), &mime::TEXT_PLAIN_UTF_8);

        let identity = EncodeRepresentation::new(Encoding::IDENTITY, Box::new(StringRepresentation::plain("x"))).unwrap();
        assert_eq!(identity.size(), Some(1));
        assert!(identity.encodings().is_empty());
        assert_eq!(identity.text().unwrap(), "x");
    }

    #[test]
    fn test_encoded_tag_is_weak() {
        let inner = StringRepresentation::plain("x").with_tag(Tag::strong("v1"));
        let entity = EncodeRepresentation::new(Encoding::GZIP, Box::new(inner)).unwrap();
        assert_eq!(entity.tag(), Some(&Tag::weak("v1")));
        assert_eq!(entity.inner().tag(), Some(&Tag::strong("v1")));

        let inner = StringRepresentation::plain("x").with_tag(Tag::strong("v1"));
        let identity = EncodeRepresentation::new(Encoding::IDENTITY, Box::new(inner)).unwrap();
        assert_eq!(identity.tag(), Some(&Tag::strong("v1")));
    }

    #[test]
    fn test_unsupported() {
        let result = EncodeRepresentation::new(Encoding::COMPRESS, Box::new(StringRepresentation::plain("x")));
        assert!(matches!(result, Err(RepresentationError::UnsupportedEncoding { .. })));
    }
}
