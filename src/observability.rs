//! Outcome reporting for translation runs.
//!
//! A [`TranslationObserver`] attached to [`crate::translate::ReadOptions`] is told about
//! successful reads, failed reads (with a computed [`TranslationSeverity`]), alerts, and every
//! cell that was turned into a missing value by a fault-tolerant read.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::error::TranslationError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TranslationSeverity {
    /// Informational event (e.g. a cancelled read).
    Info,
    /// Warning-level event (non-fatal misuse, tolerated bad cells).
    Warning,
    /// Error-level event (the read failed).
    Error,
    /// Critical error (I/O, unreachable sources, contract violations).
    Critical,
}

/// Context about a translation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationContext {
    /// Identity of the source being read.
    pub source_id: String,
    /// Whether unparsable cells degrade to missing values.
    pub fault_tolerant: bool,
}

/// Stats reported on a successful read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Materialized rows.
    pub rows: usize,
    /// Source rows consumed as annotations.
    pub annotation_rows: usize,
    /// Cells stored as missing because they could not be coerced.
    pub unparsable_cells: usize,
}

/// A cell a fault-tolerant read could not coerce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Source row index (0-based, annotation rows included).
    pub row: usize,
    /// Attribute name at the time of the failure.
    pub column: String,
    pub raw: String,
    pub message: String,
}

impl ParseIssue {
    /// Strict reads surface the same information as an error.
    pub fn into_error(self) -> TranslationError {
        TranslationError::UnparsableValue {
            row: self.row,
            column: self.column,
            raw: self.raw,
            message: self.message,
        }
    }
}

/// Observer interface for translation outcomes.
///
/// Implementors can record metrics, logs, review queues, or trigger alerts.
pub trait TranslationObserver: Send + Sync {
    /// Called when a read succeeds.
    fn on_success(&self, _ctx: &TranslationContext, _stats: TranslationStats) {}

    /// Called when a read fails.
    fn on_failure(
        &self,
        _ctx: &TranslationContext,
        _severity: TranslationSeverity,
        _error: &TranslationError,
    ) {
    }

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &TranslationContext, severity: TranslationSeverity, error: &TranslationError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called for every cell a fault-tolerant read stored as missing.
    fn on_unparsable(&self, _ctx: &TranslationContext, _issue: &ParseIssue) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn TranslationObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn TranslationObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl TranslationObserver for CompositeObserver {
    fn on_success(&self, ctx: &TranslationContext, stats: TranslationStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &TranslationContext, severity: TranslationSeverity, error: &TranslationError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &TranslationContext, severity: TranslationSeverity, error: &TranslationError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_unparsable(&self, ctx: &TranslationContext, issue: &ParseIssue) {
        for o in &self.observers {
            o.on_unparsable(ctx, issue);
        }
    }
}

/// Logs translation events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl TranslationObserver for TracingObserver {
    fn on_success(&self, ctx: &TranslationContext, stats: TranslationStats) {
        tracing::info!(
            source = %ctx.source_id,
            rows = stats.rows,
            annotation_rows = stats.annotation_rows,
            unparsable_cells = stats.unparsable_cells,
            "translation finished"
        );
    }

    fn on_failure(&self, ctx: &TranslationContext, severity: TranslationSeverity, error: &TranslationError) {
        tracing::warn!(source = %ctx.source_id, ?severity, %error, "translation failed");
    }

    fn on_alert(&self, ctx: &TranslationContext, severity: TranslationSeverity, error: &TranslationError) {
        tracing::error!(source = %ctx.source_id, ?severity, %error, "translation alert");
    }

    fn on_unparsable(&self, ctx: &TranslationContext, issue: &ParseIssue) {
        tracing::debug!(
            source = %ctx.source_id,
            row = issue.row,
            column = %issue.column,
            raw = %issue.raw,
            "unparsable value stored as missing"
        );
    }
}

/// Classify an error for observer callbacks.
pub fn severity_for_error(e: &TranslationError) -> TranslationSeverity {
    match e {
        TranslationError::Io(_) => TranslationSeverity::Critical,
        TranslationError::SourceOpen { .. } => TranslationSeverity::Critical,
        TranslationError::SourceExhausted { .. } => TranslationSeverity::Critical,
        TranslationError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => TranslationSeverity::Critical,
            _ => TranslationSeverity::Error,
        },
        TranslationError::Polars(err) => {
            // Polars wraps I/O failures without a dedicated variant; look through the chain.
            if error_chain_contains_io(err) {
                TranslationSeverity::Critical
            } else {
                TranslationSeverity::Error
            }
        }
        #[cfg(feature = "excel")]
        TranslationError::Excel(_) => TranslationSeverity::Error,
        TranslationError::UnparsableValue { .. } => TranslationSeverity::Error,
        TranslationError::Configuration { .. } => TranslationSeverity::Error,
        TranslationError::ReadInProgress | TranslationError::Closed => TranslationSeverity::Warning,
        TranslationError::Cancelled => TranslationSeverity::Info,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
