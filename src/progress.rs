//! Progress reporting for guessing and translation passes.
//!
//! Listeners are consumed, never produced, by the engine. Every pass takes a [`Progress`], which
//! wraps an optional listener and turns into a no-op when none is supplied.

use std::fmt;
use std::sync::Arc;

/// Receives progress updates from a scan.
///
/// Implementors must tolerate being called from a worker thread.
pub trait ProgressListener: Send + Sync {
    /// Total amount of work, when known.
    fn set_total(&self, _total: usize) {}

    /// Amount of work completed so far.
    fn set_completed(&self, _completed: usize) {}

    /// The pass has finished (successfully or not).
    fn complete(&self) {}
}

/// Optional listener handle passed through sources and scans.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    listener: Option<&'a dyn ProgressListener>,
}

impl<'a> Progress<'a> {
    pub fn new(listener: Option<&'a dyn ProgressListener>) -> Self {
        Self { listener }
    }

    /// A progress handle that ignores every update.
    pub fn none() -> Self {
        Self { listener: None }
    }

    pub fn set_total(&self, total: usize) {
        if let Some(l) = self.listener {
            l.set_total(total);
        }
    }

    pub fn set_completed(&self, completed: usize) {
        if let Some(l) = self.listener {
            l.set_completed(completed);
        }
    }

    pub fn complete(&self) {
        if let Some(l) = self.listener {
            l.complete();
        }
    }
}

impl<'a> From<&'a dyn ProgressListener> for Progress<'a> {
    fn from(listener: &'a dyn ProgressListener) -> Self {
        Self::new(Some(listener))
    }
}

impl fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("listener_set", &self.listener.is_some())
            .finish()
    }
}

/// A listener that fans out updates to a list of listeners.
#[derive(Default)]
pub struct CompositeListener {
    listeners: Vec<Arc<dyn ProgressListener>>,
}

impl CompositeListener {
    pub fn new(listeners: Vec<Arc<dyn ProgressListener>>) -> Self {
        Self { listeners }
    }
}

impl fmt::Debug for CompositeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeListener")
            .field("listeners_len", &self.listeners.len())
            .finish()
    }
}

impl ProgressListener for CompositeListener {
    fn set_total(&self, total: usize) {
        for l in &self.listeners {
            l.set_total(total);
        }
    }

    fn set_completed(&self, completed: usize) {
        for l in &self.listeners {
            l.set_completed(completed);
        }
    }

    fn complete(&self) {
        for l in &self.listeners {
            l.complete();
        }
    }
}

/// Logs progress through `tracing`, once every `every` rows.
#[derive(Debug)]
pub struct LoggingListener {
    every: usize,
}

impl LoggingListener {
    pub fn new(every: usize) -> Self {
        Self { every: every.max(1) }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl ProgressListener for LoggingListener {
    fn set_total(&self, total: usize) {
        tracing::debug!(total, "translation progress total");
    }

    fn set_completed(&self, completed: usize) {
        if completed % self.every == 0 {
            tracing::debug!(completed, "translation progress");
        }
    }

    fn complete(&self) {
        tracing::debug!("translation progress complete");
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeListener, Progress, ProgressListener};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        completed: AtomicUsize,
        done: AtomicUsize,
    }

    impl ProgressListener for Counting {
        fn set_completed(&self, completed: usize) {
            self.completed.store(completed, Ordering::SeqCst);
        }
        fn complete(&self) {
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn none_progress_is_a_no_op() {
        let p = Progress::none();
        p.set_total(10);
        p.set_completed(5);
        p.complete();
    }

    #[test]
    fn composite_fans_out() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let a_dyn: Arc<dyn ProgressListener> = a.clone();
        let b_dyn: Arc<dyn ProgressListener> = b.clone();
        let composite = CompositeListener::new(vec![a_dyn, b_dyn]);
        let listener: &dyn ProgressListener = &composite;
        let p = Progress::from(listener);
        p.set_completed(3);
        p.complete();
        assert_eq!(a.completed.load(Ordering::SeqCst), 3);
        assert_eq!(b.done.load(Ordering::SeqCst), 1);
    }
}
