//! Requests, responses and their shared [`Message`] state.
//!
//! [`Request`] and [`Response`] embed a [`Message`] and dereference to it, so attributes,
//! cache directives, warnings and the entity are reached the same way on both sides.

mod request;
mod response;

pub use request::Request;
pub use response::Response;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use mime::Mime;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::warn;

use crate::data::{CacheDirective, Warning};
use crate::representation::{Representation, StringRepresentation};
use crate::utils::lazy_mut;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    pub fn next() -> Self {
        Self(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State shared by requests and responses.
///
/// The attribute map and the directive and warning lists are only allocated when first
/// touched. The entity is held, not owned beyond that: [`Message::release`] forwards the
/// release to it exactly once per entity.
#[derive(Debug)]
pub struct Message {
    id: MessageId,
    attributes: OnceCell<HashMap<String, Value>>,
    cache_directives: OnceCell<Vec<CacheDirective>>,
    warnings: OnceCell<Vec<Warning>>,
    entity: Option<Box<dyn Representation>>,
    entity_text: Option<String>,
    entity_released: bool,
}

impl Message {
    pub fn new() -> Self {
        Self {
            id: MessageId::next(),
            attributes: OnceCell::new(),
            cache_directives: OnceCell::new(),
            warnings: OnceCell::new(),
            entity: None,
            entity_text: None,
            entity_released: false,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Out-of-band values attached to the message; iteration order is unspecified.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        self.attributes.get_or_init(HashMap::new)
    }

    pub fn attributes_mut(&mut self) -> &mut HashMap<String, Value> {
        lazy_mut(&mut self.attributes, HashMap::new)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get().and_then(|attributes| attributes.get(name))
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes_mut().insert(name.into(), value.into())
    }

    pub fn cache_directives(&self) -> &[CacheDirective] {
        self.cache_directives.get_or_init(Vec::new)
    }

    pub fn add_cache_directive(&mut self, directive: CacheDirective) {
        lazy_mut(&mut self.cache_directives, Vec::new).push(directive);
    }

    pub fn warnings(&self) -> &[Warning] {
        self.warnings.get_or_init(Vec::new)
    }

    pub fn add_warning(&mut self, warning: Warning) {
        lazy_mut(&mut self.warnings, Vec::new).push(warning);
    }

    pub fn entity(&self) -> Option<&dyn Representation> {
        self.entity.as_deref()
    }

    /// Replaces the entity; the previous one is dropped without being released.
    pub fn set_entity(&mut self, entity: Box<dyn Representation>) {
        self.entity = Some(entity);
        self.entity_text = None;
        self.entity_released = false;
    }

    pub fn set_entity_text(&mut self, text: impl Into<String>, media_type: Mime) {
        self.set_entity(Box::new(StringRepresentation::new(text, media_type)));
    }

    pub fn take_entity(&mut self) -> Option<Box<dyn Representation>> {
        self.entity_text = None;
        self.entity_released = false;
        self.entity.take()
    }

    /// False when there is no entity or the entity can no longer be read.
    pub fn is_entity_available(&self) -> bool {
        self.entity.as_ref().is_some_and(|entity| entity.is_available())
    }

    /// The entity content as text, read once and cached.
    ///
    /// A failing read is logged and leaves the cache empty, so a later call tries again.
    pub fn entity_as_text(&mut self) -> Option<&str> {
        if self.entity_text.is_none() {
            let entity = self.entity.as_ref()?;
            match entity.text() {
                Ok(text) => self.entity_text = Some(text),
                Err(e) => {
                    warn!(cause = %e, message = %self.id, "unable to read entity as text");
                    return None;
                }
            }
        }
        self.entity_text.as_deref()
    }

    /// Releases the entity. Calling it again is a no-op until a new entity is set.
    pub fn release(&mut self) {
        if self.entity_released {
            return;
        }
        if let Some(entity) = &self.entity {
            entity.release();
        }
        self.entity_released = true;
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use crate::data::{CacheDirective, Warning};
    use crate::error::RepresentationError;
    use crate::representation::{InputRepresentation, Representation};
    use mime::Mime;
    use serde_json::json;
    use std::io::{Cursor, Read};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingRepresentation {
        media_type: Mime,
        releases: Arc<AtomicUsize>,
    }

    impl CountingRepresentation {
        fn new(releases: Arc<AtomicUsize>) -> Self {
            Self { media_type: mime::TEXT_PLAIN, releases }
        }
    }

    impl Representation for CountingRepresentation {
        fn media_type(&self) -> &Mime {
            &self.media_type
        }

        fn size(&self) -> Option<u64> {
            Some(0)
        }

        fn is_available(&self) -> bool {
            self.releases.load(Ordering::SeqCst) == 0
        }

        fn stream(&self) -> Result<Box<dyn Read + Send + '_>, RepresentationError> {
            Ok(Box::new(Cursor::new(Vec::new())))
        }

        fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Message::new().id(), Message::new().id());
    }

    #[test]
    fn test_release_is_idempotent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut message = Message::new();
        message.set_entity(Box::new(CountingRepresentation::new(releases.clone())));
        assert!(message.is_entity_available());

        message.release();
        message.release();
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(!message.is_entity_available());

        message.set_entity(Box::new(CountingRepresentation::new(Arc::new(AtomicUsize::new(0)))));
        message.release();
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_without_entity() {
        let mut message = Message::new();
        message.release();
        message.release();
        assert!(!message.is_entity_available());
    }

    #[test]
    fn test_entity_text_is_cached() {
        let mut message = Message::new();
        message.set_entity(Box::new(InputRepresentation::new(Cursor::new(b"once".to_vec()), mime::TEXT_PLAIN)));

        assert_eq!(message.entity_as_text(), Some("once"));
        // the stream is consumed, the cache still answers
        assert!(!message.is_entity_available());
        assert_eq!(message.entity_as_text(), Some("once"));
    }

    #[test]
    fn test_failed_entity_text_is_not_cached() {
        let mut message = Message::new();
        let entity = InputRepresentation::new(Cursor::new(b"gone".to_vec()), mime::TEXT_PLAIN);
        entity.release();
        message.set_entity(Box::new(entity));

        assert_eq!(message.entity_as_text(), None);
        assert_eq!(message.entity_as_text(), None);

        message.set_entity_text("fresh", mime::TEXT_PLAIN_UTF_8);
        assert_eq!(message.entity_as_text(), Some("fresh"));
    }

    #[test]
    fn test_lazy_collections() {
        let mut message = Message::new();
        assert!(message.attributes().is_empty());
        assert_eq!(message.attribute("user"), None);

        message.set_attribute("user", "alice");
        message.set_attribute("roles", json!(["admin"]));
        assert_eq!(message.attribute("user"), Some(&json!("alice")));
        assert_eq!(message.attributes().len(), 2);

        message.add_cache_directive(CacheDirective::no_cache());
        message.add_cache_directive(CacheDirective::max_age(10));
        message.add_warning(Warning::new(Warning::RESPONSE_IS_STALE, "cache", "stale"));
        assert_eq!(message.cache_directives()[0], CacheDirective::no_cache());
        assert_eq!(message.cache_directives()[1], CacheDirective::max_age(10));
        assert_eq!(message.warnings().len(), 1);
    }
}
