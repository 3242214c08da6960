//! Filters: handlers that run code before and after a downstream handler.
//!
//! A [`Filter`] only holds the hooks. The chaining itself lives in [`FilterLink`], which
//! owns a filter, the optional next handler, an optional [`Context`] and the lifecycle
//! state. Each call walks `before -> dispatch -> after`, where [`FilterResult`] returned by
//! the before hook decides how far it goes.

mod encoder;
mod validator;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use uniform_http::data::Status;
use uniform_http::message::{Request, Response};

use crate::context::{AmbientGuard, Context};
use crate::uniform::{Handler, Lifecycle, Uniform};

pub use encoder::{EncodeFilter, EncodeFilterBuilder};
pub use validator::{ValidationError, Validator};

/// Outcome of [`Filter::before_handle`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterResult {
    /// Invoke the next handler, then the after hook.
    Continue,
    /// Don't invoke the next handler, but still run the after hook.
    Skip,
    /// Stop processing here, neither the next handler nor the after hook run.
    Stop,
}

/// Hooks around the invocation of a downstream handler.
///
/// Every method has a no-op default, so a filter only implements what it cares about.
pub trait Filter: Send + Sync {
    fn before_handle(&self, _request: &mut Request, _response: &mut Response) -> FilterResult {
        FilterResult::Continue
    }

    fn after_handle(&self, _request: &mut Request, _response: &mut Response) {}

    /// Called when the owning link starts, before the downstream handler starts.
    fn on_start(&self) {}

    /// Called when the owning link stops, after the downstream handler stopped.
    fn on_stop(&self) {}
}

/// One link of a chain: a filter plus the handler it guards.
pub struct FilterLink<F> {
    filter: F,
    next: Option<Arc<dyn Handler>>,
    context: Option<Arc<Context>>,
    lifecycle: Lifecycle,
}

impl<F: Filter> FilterLink<F> {
    pub fn new(filter: F) -> Self {
        Self { filter, next: None, context: None, lifecycle: Lifecycle::default() }
    }

    pub fn with_next(mut self, next: Arc<dyn Handler>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_context(mut self, context: Arc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn set_next(&mut self, next: Option<Arc<dyn Handler>>) {
        self.next = next;
    }

    pub fn next(&self) -> Option<&Arc<dyn Handler>> {
        self.next.as_ref()
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    fn dispatch(&self, request: &mut Request, response: &mut Response) {
        let Some(next) = &self.next else {
            warn!(response = %response.id(), "no next handler attached to the filter, answering 500");
            response.set_status(Status::SERVER_ERROR_INTERNAL);
            return;
        };

        // whatever the downstream handler does to the ambient state is undone here
        let _restore = AmbientGuard::capture();
        next.handle(request, response);
    }
}

impl<F: Filter> Uniform for FilterLink<F> {
    fn handle(&self, request: &mut Request, response: &mut Response) {
        if !self.is_started() {
            self.start();
        }

        let _scope = AmbientGuard::enter(response.id(), self.context.clone());
        match self.filter.before_handle(request, response) {
            FilterResult::Continue => {
                self.dispatch(request, response);
                self.filter.after_handle(request, response);
            }
            FilterResult::Skip => {
                trace!(response = %response.id(), "skipping next handler");
                self.filter.after_handle(request, response);
            }
            FilterResult::Stop => {
                trace!(response = %response.id(), "filter stopped the processing");
            }
        }
    }
}

impl<F: Filter> Handler for FilterLink<F> {
    fn start(&self) {
        if !self.lifecycle.begin_start() {
            return;
        }
        self.filter.on_start();
        if let Some(next) = &self.next {
            next.start();
        }
        debug!(context = ?self.context.as_ref().and_then(|c| c.name()), "filter started");
    }

    fn stop(&self) {
        if !self.lifecycle.begin_stop() {
            return;
        }
        if let Some(next) = &self.next {
            next.stop();
        }
        self.filter.on_stop();
        debug!(context = ?self.context.as_ref().and_then(|c| c.name()), "filter stopped");
    }

    fn is_started(&self) -> bool {
        self.lifecycle.is_started()
    }

    fn context(&self) -> Option<Arc<Context>> {
        self.context.clone()
    }
}

impl<F: fmt::Debug> fmt::Debug for FilterLink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterLink")
            .field("filter", &self.filter)
            .field("has_next", &self.next.is_some())
            .field("context", &self.context)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

struct FnFilter<F>(F);

impl<F> Filter for FnFilter<F>
where
    F: Fn(&mut Request, &mut Response) -> FilterResult + Send + Sync,
{
    fn before_handle(&self, request: &mut Request, response: &mut Response) -> FilterResult {
        (self.0)(request, response)
    }
}

/// A filter running `f` as its before hook.
pub fn fn_filter<F>(f: F) -> impl Filter
where
    F: Fn(&mut Request, &mut Response) -> FilterResult + Send + Sync,
{
    FnFilter(f)
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterLink, FilterResult, fn_filter};
    use crate::context::{Context, current_context, current_response_id};
    use crate::uniform::{Handler, Uniform, handler_fn};
    use http::StatusCode;
    use mockall::mock;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Arc, Mutex};
    use uniform_http::data::Status;
    use uniform_http::message::{Request, Response};

    mock! {
        Downstream {}

        impl Uniform for Downstream {
            fn handle(&self, request: &mut Request, response: &mut Response);
        }

        impl Handler for Downstream {
            fn start(&self);
            fn stop(&self);
            fn is_started(&self) -> bool;
            fn context(&self) -> Option<Arc<Context>>;
        }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records every hook it goes through, tagged with its name.
    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        result: FilterResult,
        log: Log,
    }

    impl Recorder {
        fn new(name: &'static str, result: FilterResult, log: &Log) -> Self {
            Self { name, result, log: Arc::clone(log) }
        }

        fn record(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{event} {}", self.name));
        }
    }

    impl Filter for Recorder {
        fn before_handle(&self, _request: &mut Request, _response: &mut Response) -> FilterResult {
            self.record("before");
            self.result
        }

        fn after_handle(&self, _request: &mut Request, _response: &mut Response) {
            let context = current_context().and_then(|c| c.name().map(ToOwned::to_owned));
            self.record(&format!("after({})", context.unwrap_or_default()));
        }

        fn on_start(&self) {
            self.record("start");
        }

        fn on_stop(&self) {
            self.record("stop");
        }
    }

    fn passive_downstream() -> MockDownstream {
        let mut downstream = MockDownstream::new();
        downstream.expect_start().return_const(());
        downstream.expect_stop().return_const(());
        downstream
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_continue_without_next() {
        let log = Log::default();
        let link = FilterLink::new(Recorder::new("a", FilterResult::Continue, &log));

        let mut response = Response::new();
        link.handle(&mut Request::default(), &mut response);

        assert_eq!(response.status(), &Status::SERVER_ERROR_INTERNAL);
        assert_eq!(entries(&log), vec!["start a", "before a", "after() a"]);
    }

    #[test]
    fn test_continue_dispatches() {
        let log = Log::default();
        let mut downstream = passive_downstream();
        downstream.expect_handle().times(1).returning(|_, response| response.set_status(StatusCode::ACCEPTED));

        let link = FilterLink::new(Recorder::new("a", FilterResult::Continue, &log)).with_next(Arc::new(downstream));
        let mut response = Response::new();
        link.handle(&mut Request::default(), &mut response);

        assert_eq!(response.status().code(), StatusCode::ACCEPTED);
        assert_eq!(entries(&log), vec!["start a", "before a", "after() a"]);
    }

    #[test]
    fn test_skip() {
        let log = Log::default();
        let mut downstream = passive_downstream();
        downstream.expect_handle().never();

        let link = FilterLink::new(Recorder::new("a", FilterResult::Skip, &log)).with_next(Arc::new(downstream));
        let mut response = Response::new();
        link.handle(&mut Request::default(), &mut response);

        assert_eq!(response.status(), &Status::SUCCESS_OK);
        assert_eq!(entries(&log), vec!["start a", "before a", "after() a"]);
    }

    #[test]
    fn test_stop() {
        let log = Log::default();
        let mut downstream = passive_downstream();
        downstream.expect_handle().never();

        let link = FilterLink::new(Recorder::new("a", FilterResult::Stop, &log)).with_next(Arc::new(downstream));
        link.handle(&mut Request::default(), &mut Response::new());

        assert_eq!(entries(&log), vec!["start a", "before a"]);
    }

    #[test]
    fn test_lifecycle_order() {
        let log = Log::default();
        let mut terminal = MockDownstream::new();
        terminal.expect_start().times(1).return_const(());
        terminal.expect_stop().times(1).return_const(());

        let c = FilterLink::new(Recorder::new("c", FilterResult::Continue, &log)).with_next(Arc::new(terminal));
        let b = FilterLink::new(Recorder::new("b", FilterResult::Continue, &log)).with_next(Arc::new(c));
        let a = FilterLink::new(Recorder::new("a", FilterResult::Continue, &log)).with_next(Arc::new(b));

        a.start();
        a.start();
        assert!(a.is_started());
        assert!(a.next().unwrap().is_started());

        a.stop();
        a.stop();
        assert!(!a.is_started());

        assert_eq!(entries(&log), vec!["start a", "start b", "start c", "stop c", "stop b", "stop a"]);
    }

    #[test]
    fn test_ambient_context_restored() {
        let log = Log::default();
        let outer = Arc::new(Context::builder().name("outer").build());
        let inner = Arc::new(Context::builder().name("inner").build());

        let terminal = handler_fn(|_request: &mut Request, response: &mut Response| {
            assert_eq!(current_response_id(), Some(response.id()));
            assert_eq!(current_context().unwrap().name(), Some("inner"));
        });
        let inner_link = FilterLink::new(Recorder::new("inner", FilterResult::Continue, &log))
            .with_next(Arc::new(terminal))
            .with_context(inner);
        let outer_link = FilterLink::new(Recorder::new("outer", FilterResult::Continue, &log))
            .with_next(Arc::new(inner_link))
            .with_context(outer);

        outer_link.handle(&mut Request::default(), &mut Response::new());

        assert_eq!(
            entries(&log),
            vec!["start outer", "start inner", "before outer", "before inner", "after(inner) inner", "after(outer) outer"]
        );
        assert!(current_context().is_none());
        assert_eq!(current_response_id(), None);
    }

    #[test]
    fn test_ambient_context_restored_on_panic() {
        let log = Log::default();
        let downstream = handler_fn(|_: &mut Request, _: &mut Response| panic!("downstream failure"));

        let link = FilterLink::new(Recorder::new("a", FilterResult::Continue, &log))
            .with_next(Arc::new(downstream))
            .with_context(Arc::new(Context::builder().name("guarded").build()));

        let result = catch_unwind(AssertUnwindSafe(|| {
            link.handle(&mut Request::default(), &mut Response::new());
        }));

        assert!(result.is_err());
        assert!(current_context().is_none());
        assert_eq!(current_response_id(), None);
        assert_eq!(entries(&log), vec!["start a", "before a"]);
    }

    #[test]
    fn test_fn_filter() {
        let filter = fn_filter(|request: &mut Request, response: &mut Response| {
            if request.uri().path() == "/private" {
                response.set_status(StatusCode::FORBIDDEN);
                FilterResult::Stop
            } else {
                FilterResult::Continue
            }
        });
        let terminal = handler_fn(|_: &mut Request, response: &mut Response| response.set_status(StatusCode::NO_CONTENT));
        let link = FilterLink::new(filter).with_next(Arc::new(terminal));

        let mut response = Response::new();
        link.handle(&mut Request::get("/private".parse().unwrap()), &mut response);
        assert_eq!(response.status().code(), StatusCode::FORBIDDEN);

        let mut response = Response::new();
        link.handle(&mut Request::get("/public".parse().unwrap()), &mut response);
        assert_eq!(response.status().code(), StatusCode::NO_CONTENT);
    }
}
