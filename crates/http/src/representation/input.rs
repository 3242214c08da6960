use std::fmt;
use std::io::Read;
use std::sync::{Mutex, MutexGuard, PoisonError};

use mime::Mime;

use crate::error::RepresentationError;
use crate::representation::Representation;

type Source = Option<Box<dyn Read + Send>>;

/// A transient entity backed by a reader: its content can be streamed exactly once.
pub struct InputRepresentation {
    media_type: Mime,
    size: Option<u64>,
    source: Mutex<Source>,
}

impl InputRepresentation {
    pub fn new<R: Read + Send + 'static>(source: R, media_type: Mime) -> Self {
        Self { media_type, size: None, source: Mutex::new(Some(Box::new(source))) }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    fn source(&self) -> MutexGuard<'_, Source> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for InputRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRepresentation")
            .field("media_type", &self.media_type)
            .field("size", &self.size)
            .field("available", &self.is_available())
            .finish()
    }
}

impl Representation for InputRepresentation {
    fn media_type(&self) -> &Mime {
        &self.media_type
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_available(&self) -> bool {
        self.source().is_some()
    }

    fn is_transient(&self) -> bool {
        true
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, RepresentationError> {
        match self.source().take() {
            Some(source) => Ok(source),
            None => Err(RepresentationError::unavailable("input has already been consumed")),
        }
    }

    fn release(&self) {
        self.source().take();
    }
}

#[cfg(test)]
mod tests {
    use super::InputRepresentation;
    use crate::error::RepresentationError;
    use crate::representation::Representation;
    use std::io::Cursor;

    #[test]
    fn test_consumed_once() {
        let entity = InputRepresentation::new(Cursor::new(b"payload".to_vec()), mime::APPLICATION_OCTET_STREAM);

        assert!(entity.is_transient());
        assert!(entity.is_available());
        assert_eq!(entity.text().unwrap(), "payload");
        assert!(!entity.is_available());
        assert!(matches!(entity.text(), Err(RepresentationError::Unavailable { .. })));
    }

    #[test]
    fn test_release_drops_source() {
        let entity = InputRepresentation::new(Cursor::new(vec![1, 2, 3]), mime::APPLICATION_OCTET_STREAM).with_size(3);
        assert_eq!(entity.size(), Some(3));

        entity.release();
        entity.release();
        assert!(!entity.is_available());
        assert!(entity.stream().is_err());
    }

    #[test]
    fn test_invalid_text() {
        let entity = InputRepresentation::new(Cursor::new(vec![0xff, 0xfe]), mime::TEXT_PLAIN);
        assert!(matches!(entity.text(), Err(RepresentationError::InvalidText { .. })));
    }
}
