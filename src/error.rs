use thiserror::Error;

/// Convenience result type for translation operations.
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Error type returned by sources, configuration loading, type guessing and translation.
///
/// This is a single error enum shared across every [`crate::source::DataSource`] adapter and
/// the [`crate::translate::Translator`].
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Underlying I/O error (e.g. file not found while re-reading a source).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Data frame / SQL error raised by Polars.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[cfg(feature = "excel")]
    /// Spreadsheet error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The underlying source could not be opened or connected.
    #[error("cannot open source '{source_id}': {message}")]
    SourceOpen { source_id: String, message: String },

    /// A cell could not be coerced to its column's finalized [`crate::types::ValueType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    UnparsableValue {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Persisted column metadata or an edit command is malformed.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// `next()` was called on a source with no remaining rows.
    #[error("source exhausted: no row after row {row}")]
    SourceExhausted { row: usize },

    /// The read observed a cancellation request and stopped.
    #[error("translation cancelled")]
    Cancelled,

    /// The translator was closed and can no longer read.
    #[error("translator is closed")]
    Closed,

    /// Another read is already running on this translator.
    #[error("a read is already in progress on this translator")]
    ReadInProgress,
}

impl TranslationError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn source_open(source_id: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::SourceOpen {
            source_id: source_id.into(),
            message: err.to_string(),
        }
    }
}
