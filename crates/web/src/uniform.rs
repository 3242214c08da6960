use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;
use uniform_http::message::{Request, Response};

use crate::Context;

/// The single operation every stage of request processing implements.
///
/// Nothing is returned: a handler signals its outcome by mutating `response` (status,
/// entity, headers). The call is transport agnostic, it runs on the caller's thread.
pub trait Uniform: Send + Sync {
    fn handle(&self, request: &mut Request, response: &mut Response);
}

/// A [`Uniform`] with a start/stop lifecycle and an optional [`Context`].
///
/// `start` and `stop` are idempotent: they only act on an actual state change.
pub trait Handler: Uniform {
    fn start(&self) {}

    fn stop(&self) {}

    fn is_started(&self) -> bool {
        true
    }

    fn context(&self) -> Option<Arc<Context>> {
        None
    }
}

/// Started/stopped flag whose transitions happen once even under concurrent calls.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    started: AtomicBool,
}

impl Lifecycle {
    /// Moves to started, returning whether this call made the transition.
    pub(crate) fn begin_start(&self) -> bool {
        self.started.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    /// Moves to stopped, returning whether this call made the transition.
    pub(crate) fn begin_stop(&self) -> bool {
        self.started.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// A terminal handler backed by a closure
pub struct FnHandler<F> {
    f: F,
    context: Option<Arc<Context>>,
    lifecycle: Lifecycle,
}

impl<F> FnHandler<F>
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn new(f: F) -> Self {
        Self { f, context: None, lifecycle: Lifecycle::default() }
    }

    pub fn with_context(mut self, context: Arc<Context>) -> Self {
        self.context = Some(context);
        self
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    FnHandler::new(f)
}

impl<F> Uniform for FnHandler<F>
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn handle(&self, request: &mut Request, response: &mut Response) {
        (self.f)(request, response);
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn start(&self) {
        if self.lifecycle.begin_start() {
            trace!("started fn handler");
        }
    }

    fn stop(&self) {
        if self.lifecycle.begin_stop() {
            trace!("stopped fn handler");
        }
    }

    fn is_started(&self) -> bool {
        self.lifecycle.is_started()
    }

    fn context(&self) -> Option<Arc<Context>> {
        self.context.clone()
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("context", &self.context).field("lifecycle", &self.lifecycle).finish()
    }
}
