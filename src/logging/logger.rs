use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

/// Observer interface for codec span events.  Implement this trait and
/// wrap it in a [`Listener`] to receive timing data and annotations from
/// the encode / decode passes.
///
/// All methods are called synchronously from the codec; keep them
/// lightweight.
pub trait PerfListener {
    /// Return whether this listener cares about the given span.  If `false`,
    /// none of the other callbacks will fire for that span.
    fn is_interested_in_span(&self, span_id: u64) -> bool;
    /// Called when a span begins.
    fn on_span_start(&self, span_id: u64, start_time: Instant);
    /// Called at each checkpoint within a span, with the wall-clock duration
    /// since the previous checkpoint (or span start).
    fn on_check_point(
        &self,
        span_id: u64,
        point_time: Instant,
        duration_since_last_checkpoint: Duration,
        label: &str,
    );
    /// Called when a free-text annotation is attached to a span.
    fn on_annotate(&self, span_id: u64, annotation: &str);
    /// Called when a span ends, with its total duration.
    fn on_span_end(&self, span_id: u64, span_duration: Duration);
}

/// A clonable, reference-counted wrapper around a [`PerfListener`].
#[derive(Clone)]
pub struct Listener {
    inner_impl: Rc<dyn PerfListener>,
}

impl Listener {
    pub fn new(listener: Rc<dyn PerfListener>) -> Listener {
        Listener {
            inner_impl: listener,
        }
    }
}

impl Deref for Listener {
    type Target = dyn PerfListener;
    fn deref(&self) -> &Self::Target {
        &*self.inner_impl
    }
}

struct OpenSpan {
    span_id: u64,
    start_time: Instant,
    last_point: Instant,
    listeners: Vec<Listener>,
}

impl OpenSpan {
    fn point(&mut self, label: &str) {
        let now = Instant::now();
        let since_last = now.duration_since(self.last_point);
        self.listeners
            .iter()
            .for_each(|l| l.on_check_point(self.span_id, now, since_last, label));
        self.last_point = now;
    }

    fn annotate(&self, annotation: &str) {
        self.listeners
            .iter()
            .for_each(|l| l.on_annotate(self.span_id, annotation));
    }
}

/// Tracks open codec spans and fans events out to registered
/// [`Listener`]s.
///
/// **Not `Send` or `Sync`**; the span table lives in a `RefCell`.  Each
/// [`crate::Codec`] owns its own logger.
pub struct PerfLogger {
    spans: RefCell<HashMap<u64, OpenSpan>>,
    listeners: Vec<Listener>,
}

impl PerfLogger {
    /// Create a logger fanning out to `listeners`.  An empty `Vec` turns
    /// every call into a map lookup that finds nothing.
    pub fn new(listeners: Vec<Listener>) -> PerfLogger {
        PerfLogger {
            spans: RefCell::new(HashMap::new()),
            listeners,
        }
    }

    /// Open `span_id`.  Re-opening a span that is already open restarts it.
    pub fn start(&self, span_id: u64) {
        let listeners = self
            .listeners
            .iter()
            .filter(|l| l.is_interested_in_span(span_id))
            .cloned()
            .collect::<Vec<_>>();
        if listeners.is_empty() {
            return;
        }
        let start_time = Instant::now();
        listeners
            .iter()
            .for_each(|l| l.on_span_start(span_id, start_time));
        self.spans.borrow_mut().insert(
            span_id,
            OpenSpan {
                span_id,
                start_time,
                last_point: start_time,
                listeners,
            },
        );
    }

    pub fn check_point(&self, span_id: u64, label: impl AsRef<str>) {
        if let Some(span) = self.spans.borrow_mut().get_mut(&span_id) {
            span.point(label.as_ref());
        }
    }

    pub fn annotate(&self, span_id: u64, annotation: impl AsRef<str>) {
        if let Some(span) = self.spans.borrow().get(&span_id) {
            span.annotate(annotation.as_ref());
        }
    }

    /// Close `span_id` and report its total duration.  Closing a span that
    /// was never opened is a no-op.
    pub fn end(&self, span_id: u64) {
        let closed = self.spans.borrow_mut().remove(&span_id);
        if let Some(span) = closed {
            let duration = span.start_time.elapsed();
            span.listeners
                .iter()
                .for_each(|l| l.on_span_end(span_id, duration));
        }
    }
}
