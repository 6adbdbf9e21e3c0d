//! Translation of a [`DataSource`] into a typed [`Dataset`].
//!
//! A [`Translator`] owns exactly one source. [`Translator::read`] performs a full pass:
//!
//! 1. finalize one [`Attribute`] per selected column (`Unknown` becomes `Polynominal`)
//! 2. reset the source and scan rows until exhausted, `max_rows` is reached, or the translator
//!    is closed
//! 3. annotation rows rename (`Name`) or annotate the selected attributes and are never
//!    materialized; other rows are coerced cell by cell
//! 4. user-defined names and roles are applied to the finished dataset
//!
//! [`Translator::close`] may be called from another thread while a read is running: it requests
//! cancellation, waits until the read loop has observed it and left, then closes the source.
//!
//! ```
//! use rust_data_translation::config::{ConfigurationOptions, TranslationConfiguration};
//! use rust_data_translation::source::MemorySource;
//! use rust_data_translation::translate::{ReadOptions, Translator};
//!
//! # fn main() -> Result<(), rust_data_translation::TranslationError> {
//! let source = MemorySource::from_strs(&["id", "flag"], &[&["1", "y"], &["2", "n"]]);
//! let translator = Translator::new(source);
//! let mut config = translator.configure(&ConfigurationOptions::default())?;
//! translator.guess_value_types(&mut config, 100, None)?;
//! let ds = translator.read(&config, &ReadOptions::default(), None)?;
//! assert_eq!(ds.row_count(), 2);
//! translator.close()?;
//! # Ok(())
//! # }
//! ```

mod cancel;
mod coerce;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{AnnotationKind, ConfigurationOptions, TranslationConfiguration};
use crate::error::{TranslationError, TranslationResult};
use crate::guess::{GuessReport, TypeGuesser};
use crate::observability::{
    severity_for_error, ParseIssue, TranslationContext, TranslationObserver, TranslationSeverity,
    TranslationStats,
};
use crate::progress::{Progress, ProgressListener};
use crate::source::DataSource;
use crate::types::{Attribute, Dataset, Role, Value};

pub use cancel::CancellationToken;

use cancel::ReadGate;
use coerce::coerce_cell;

/// Options controlling one [`Translator::read`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReadOptions {
    /// Store unparsable cells as missing values instead of aborting the read.
    pub fault_tolerant: bool,
    /// Maximum number of source rows to consume (annotation rows included).
    ///
    /// `None` or `Some(0)` reads the whole source.
    pub max_rows: Option<usize>,
    /// Optional observer for outcomes and tolerated parse failures.
    pub observer: Option<Arc<dyn TranslationObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: TranslationSeverity,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("fault_tolerant", &self.fault_tolerant)
            .field("max_rows", &self.max_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            fault_tolerant: true,
            max_rows: None,
            observer: None,
            alert_at_or_above: TranslationSeverity::Critical,
        }
    }
}

impl ReadOptions {
    /// Strict reads abort on the first unparsable cell.
    pub fn strict() -> Self {
        Self {
            fault_tolerant: false,
            ..Self::default()
        }
    }
}

/// Turns one [`DataSource`] into typed [`Dataset`]s.
///
/// `Translator` is `Sync`: share it (e.g. in an `Arc`) to call [`Translator::close`] from another
/// thread while [`Translator::read`] runs. At most one read or guessing pass runs at a time.
pub struct Translator<S: DataSource> {
    source: Mutex<Option<S>>,
    gate: ReadGate,
    cancel: CancellationToken,
}

impl<S: DataSource> fmt::Debug for Translator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("reading", &self.gate.is_reading())
            .field("closed", &self.gate.is_closed())
            .finish()
    }
}

impl<S: DataSource> Translator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Mutex::new(Some(source)),
            gate: ReadGate::new(),
            cancel: CancellationToken::new(),
        }
    }

    fn lock_source(&self) -> MutexGuard<'_, Option<S>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Probe the owned source and build its default configuration.
    pub fn configure(&self, options: &ConfigurationOptions) -> TranslationResult<TranslationConfiguration> {
        let _guard = self.gate.enter()?;
        let source = self.lock_source();
        let source = source.as_ref().ok_or(TranslationError::Closed)?;
        Ok(TranslationConfiguration::from_source(source, options))
    }

    /// Run a [`TypeGuesser`] pass over the owned source. `max_probe_rows == 0` scans everything.
    pub fn guess_value_types(
        &self,
        config: &mut TranslationConfiguration,
        max_probe_rows: usize,
        listener: Option<&dyn ProgressListener>,
    ) -> TranslationResult<GuessReport> {
        let _guard = self.gate.enter()?;
        let mut source = self.lock_source();
        let source = source.as_mut().ok_or(TranslationError::Closed)?;
        TypeGuesser::new(max_probe_rows).guess(config, source, Progress::new(listener), &self.cancel)
    }

    /// Read the whole source (or up to `options.max_rows` rows) into a [`Dataset`].
    ///
    /// Fails with [`TranslationError::ReadInProgress`] if another pass is running,
    /// [`TranslationError::Closed`] after [`Self::close`], [`TranslationError::Cancelled`] if the
    /// translator was closed mid-read, and [`TranslationError::UnparsableValue`] on the first bad
    /// cell of a strict read.
    pub fn read(
        &self,
        config: &TranslationConfiguration,
        options: &ReadOptions,
        listener: Option<&dyn ProgressListener>,
    ) -> TranslationResult<Dataset> {
        let _guard = self.gate.enter()?;
        let progress = Progress::new(listener);
        let mut source = self.lock_source();
        let source = source.as_mut().ok_or(TranslationError::Closed)?;

        let ctx = TranslationContext {
            source_id: source.source_id(),
            fault_tolerant: options.fault_tolerant,
        };
        tracing::debug!(
            source = %ctx.source_id,
            fault_tolerant = options.fault_tolerant,
            max_rows = ?options.max_rows,
            "translation started"
        );

        let result = self.scan(source, config, options, &ctx, progress);
        progress.complete();

        if let Some(obs) = options.observer.as_ref() {
            match &result {
                Ok((_, stats)) => obs.on_success(&ctx, *stats),
                Err(e) => {
                    let sev = severity_for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        match result {
            Ok((dataset, stats)) => {
                tracing::debug!(
                    source = %ctx.source_id,
                    rows = stats.rows,
                    annotation_rows = stats.annotation_rows,
                    unparsable_cells = stats.unparsable_cells,
                    "translation finished"
                );
                Ok(dataset)
            }
            Err(e) => {
                tracing::debug!(source = %ctx.source_id, error = %e, "translation aborted");
                Err(e)
            }
        }
    }

    fn scan(
        &self,
        source: &mut S,
        config: &TranslationConfiguration,
        options: &ReadOptions,
        ctx: &TranslationContext,
        progress: Progress<'_>,
    ) -> TranslationResult<(Dataset, TranslationStats)> {
        let selected: Vec<usize> = config
            .selected_indices()
            .into_iter()
            .filter(|&col| col < source.column_count())
            .collect();
        let mut attributes: Vec<Attribute> = selected
            .iter()
            .filter_map(|&col| config.column(col))
            .map(|c| Attribute::new(c.original_name.clone(), c.value_type))
            .collect();
        let format = config.date_format();
        let max_rows = options.max_rows.filter(|&n| n > 0);

        source.reset(progress)?;
        if let Some(n) = max_rows {
            progress.set_total(n);
        }

        let mut rows: Vec<Vec<Value>> = Vec::new();
        let mut stats = TranslationStats::default();
        let mut row = 0usize;
        while source.has_next() && max_rows.is_none_or(|n| row < n) {
            if self.cancel.is_cancelled() {
                tracing::info!(source = %ctx.source_id, row, "translation cancelled");
                return Err(TranslationError::Cancelled);
            }
            source.next(progress)?;

            match config.annotation(row) {
                Some(AnnotationKind::Name) => {
                    for (attribute, &col) in attributes.iter_mut().zip(&selected) {
                        if source.is_missing(col) {
                            continue;
                        }
                        if let Some(name) = source.get_string(col) {
                            attribute.name = name.trim().to_string();
                        }
                    }
                    stats.annotation_rows += 1;
                }
                Some(AnnotationKind::Custom(key)) => {
                    // Every selected attribute gets the key; absent cells store "".
                    for (attribute, &col) in attributes.iter_mut().zip(&selected) {
                        let value = source.get_string(col).unwrap_or_default().into_owned();
                        attribute.annotations.insert(key.clone(), value);
                    }
                    stats.annotation_rows += 1;
                }
                None => {
                    let mut out = Vec::with_capacity(selected.len());
                    for (attribute, &col) in attributes.iter_mut().zip(&selected) {
                        match coerce_cell(&*source, col, attribute, format) {
                            Ok(value) => out.push(value),
                            Err(message) => {
                                let issue = ParseIssue {
                                    row,
                                    column: attribute.name.clone(),
                                    raw: source.get_string(col).unwrap_or_default().into_owned(),
                                    message,
                                };
                                if !options.fault_tolerant {
                                    return Err(issue.into_error());
                                }
                                if let Some(obs) = options.observer.as_ref() {
                                    obs.on_unparsable(ctx, &issue);
                                }
                                stats.unparsable_cells += 1;
                                out.push(Value::Missing);
                            }
                        }
                    }
                    rows.push(out);
                }
            }
            row += 1;
        }

        apply_user_metadata(&mut attributes, &selected, config);
        stats.rows = rows.len();
        Ok((Dataset::new(attributes, rows), stats))
    }

    /// Cancel any in-flight pass, wait for it to leave its scan loop, and close the source.
    ///
    /// The translator rejects every further call with [`TranslationError::Closed`]. Closing twice
    /// is a no-op.
    pub fn close(&self) -> TranslationResult<()> {
        self.cancel.cancel();
        if !self.gate.close() {
            return Ok(());
        }
        let source = self.lock_source().take();
        match source {
            Some(mut source) => {
                tracing::debug!(source = %source.source_id(), "closing source");
                source.close()
            }
            None => Ok(()),
        }
    }
}

impl<S: DataSource> Drop for Translator<S> {
    fn drop(&mut self) {
        if let Some(mut source) = self.lock_source().take() {
            if let Err(e) = source.close() {
                tracing::warn!(error = %e, "failed to close source on drop");
            }
        }
    }
}

/// Apply deferred user-defined names and special roles.
///
/// A special role held by several attributes stays with the last one.
fn apply_user_metadata(
    attributes: &mut [Attribute],
    selected: &[usize],
    config: &TranslationConfiguration,
) {
    let mut holders: HashMap<Role, usize> = HashMap::new();
    for (pos, &col) in selected.iter().enumerate() {
        let Some(column) = config.column(col) else {
            continue;
        };
        if let Some(name) = &column.user_defined_name {
            attributes[pos].name = name.clone();
        }
        if column.role.is_special() {
            if let Some(previous) = holders.insert(column.role.clone(), pos) {
                tracing::warn!(
                    role = %column.role,
                    replaced = %attributes[previous].name,
                    by = %attributes[pos].name,
                    "special role assigned twice; keeping the later attribute"
                );
                attributes[previous].role = Role::Regular;
            }
            attributes[pos].role = column.role.clone();
        }
    }
}
