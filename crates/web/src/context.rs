//! Processing contexts and the ambient "current" state of a thread.
//!
//! Handlers receive the request and response explicitly. For code that can't be handed
//! those parameters, the chain also keeps the id of the response being processed and the
//! [`Context`] of the active link in a thread local slot, reachable through
//! [`current_response_id`] and [`current_context`]. The slot is only changed through an
//! [`AmbientGuard`], which puts the previous state back when dropped, unwinding included.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use uniform_http::data::Form;
use uniform_http::message::MessageId;

/// Configuration and shared state of a group of handlers.
///
/// `parameters` are fixed at build time; `attributes` can be changed at runtime by any
/// thread holding the context.
#[derive(Debug, Default)]
pub struct Context {
    name: Option<String>,
    parameters: Form,
    attributes: RwLock<HashMap<String, Value>>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parameters(&self) -> &Form {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.first_value(name)
    }

    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.write().unwrap_or_else(PoisonError::into_inner).insert(name.into(), value.into())
    }

    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.write().unwrap_or_else(PoisonError::into_inner).remove(name)
    }

    /// A new context inheriting this one's parameters but none of its attributes.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), parameters: self.parameters.clone(), attributes: RwLock::default() }
    }
}

#[derive(Debug)]
pub struct ContextBuilder {
    name: Option<String>,
    parameters: Form,
    attributes: HashMap<String, Value>,
}

impl ContextBuilder {
    fn new() -> Self {
        Self { name: None, parameters: Form::new(), attributes: HashMap::new() }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.add(name, value);
        self
    }

    /// Adds the parameters of a query string such as `level=debug&retries=3`.
    pub fn parameters_from_query(mut self, query: &str) -> Self {
        self.parameters.extend(Form::parse(query, Form::QUERY_SEPARATOR));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Context {
        Context { name: self.name, parameters: self.parameters, attributes: RwLock::new(self.attributes) }
    }
}

#[derive(Debug, Clone, Default)]
struct Ambient {
    response_id: Option<MessageId>,
    context: Option<Arc<Context>>,
}

thread_local! {
    static AMBIENT: RefCell<Ambient> = RefCell::new(Ambient::default());
}

/// Id of the response the current thread is processing, if any.
pub fn current_response_id() -> Option<MessageId> {
    AMBIENT.with_borrow(|ambient| ambient.response_id)
}

/// Context of the handler the current thread is running, if any.
pub fn current_context() -> Option<Arc<Context>> {
    AMBIENT.with_borrow(|ambient| ambient.context.clone())
}

/// Scope guard over the ambient state of the current thread.
///
/// Whatever happens while the guard is alive, including a panic, the ambient state
/// captured at creation is put back when it drops.
#[derive(Debug)]
#[must_use = "the ambient state is restored as soon as the guard is dropped"]
pub struct AmbientGuard {
    saved: Ambient,
    // the slot is thread local, so is the guard
    _not_send: PhantomData<*const ()>,
}

impl AmbientGuard {
    /// Makes `response_id` current, together with `context` when one is given; a `None`
    /// context keeps the current one.
    pub fn enter(response_id: MessageId, context: Option<Arc<Context>>) -> Self {
        let saved = AMBIENT.with_borrow_mut(|ambient| {
            let saved = ambient.clone();
            ambient.response_id = Some(response_id);
            if context.is_some() {
                ambient.context = context;
            }
            saved
        });
        Self { saved, _not_send: PhantomData }
    }

    /// Captures the current state without changing it.
    pub fn capture() -> Self {
        Self { saved: AMBIENT.with_borrow(Ambient::clone), _not_send: PhantomData }
    }
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        // the slot may already be gone while the thread shuts down
        let _ = AMBIENT.try_with(|ambient| *ambient.borrow_mut() = saved);
    }
}

#[cfg(test)]
mod tests {
    use super::{AmbientGuard, Context, current_context, current_response_id};
    use serde_json::json;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use uniform_http::message::MessageId;

    #[test]
    fn test_builder() {
        let context = Context::builder()
            .name("api")
            .parameter("timeout", "30")
            .parameters_from_query("level=debug&level=trace")
            .attribute("version", 2)
            .build();

        assert_eq!(context.name(), Some("api"));
        assert_eq!(context.parameter("timeout"), Some("30"));
        assert_eq!(context.parameters().values("level"), vec!["debug", "trace"]);
        assert_eq!(context.attribute("version"), Some(json!(2)));

        context.set_attribute("version", 3);
        assert_eq!(context.attribute("version"), Some(json!(3)));
        assert_eq!(context.remove_attribute("version"), Some(json!(3)));

        let child = context.child("api/v2");
        assert_eq!(child.parameter("timeout"), Some("30"));
        assert_eq!(child.attribute("version"), None);
    }

    #[test]
    fn test_guard_restores() {
        let outer = Arc::new(Context::builder().name("outer").build());
        let inner = Arc::new(Context::builder().name("inner").build());
        let (first, second) = (MessageId::next(), MessageId::next());

        assert_eq!(current_response_id(), None);
        {
            let _outer = AmbientGuard::enter(first, Some(Arc::clone(&outer)));
            {
                let _inner = AmbientGuard::enter(second, Some(Arc::clone(&inner)));
                assert_eq!(current_response_id(), Some(second));
                assert!(Arc::ptr_eq(&current_context().unwrap(), &inner));
            }
            {
                let _keep = AmbientGuard::enter(second, None);
                assert!(Arc::ptr_eq(&current_context().unwrap(), &outer));
            }
            assert_eq!(current_response_id(), Some(first));
            assert!(Arc::ptr_eq(&current_context().unwrap(), &outer));
        }
        assert_eq!(current_response_id(), None);
        assert!(current_context().is_none());
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let id = MessageId::next();
        let _scope = AmbientGuard::enter(id, None);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = AmbientGuard::capture();
            let _other = AmbientGuard::enter(MessageId::next(), Some(Arc::new(Context::default())));
            panic!("downstream failure");
        }));

        assert!(result.is_err());
        assert_eq!(current_response_id(), Some(id));
        assert!(current_context().is_none());
    }
}
