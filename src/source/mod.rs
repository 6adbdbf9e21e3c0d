//! The forward-only, resettable cursor contract the engine reads from, plus concrete adapters.
//!
//! The engine performs at least two passes over every source (type guessing, then translation),
//! so every adapter must support repeated [`DataSource::reset`] calls.
//!
//! Adapters:
//! - [`memory`]: rows held in memory
//! - [`csv`]: delimited text
//! - [`excel`]: spreadsheets (feature `excel`)
//! - [`frame`]: Polars data frames and SQL query results (feature `sql`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod frame;
pub mod memory;

use std::borrow::Cow;

use chrono::NaiveDateTime;

use crate::date::DateFormat;
use crate::error::TranslationResult;
use crate::progress::Progress;
use crate::types::ValueType;

pub use self::csv::{CsvOptions, CsvSource};
#[cfg(feature = "excel")]
pub use self::excel::{ExcelOptions, ExcelSource};
pub use self::frame::DataFrameSource;
pub use self::memory::MemorySource;

/// A forward-only, resettable, single-cursor view over the rows of a concrete source.
///
/// Cell accessors refer to the current row, i.e. the row most recently reached by
/// [`DataSource::next`]. Calling `next` when [`DataSource::has_next`] is `false` is a contract
/// violation and yields [`crate::TranslationError::SourceExhausted`].
///
/// The numeric and date accessors default to parsing [`DataSource::get_string`]; adapters with
/// native typed cells override them.
pub trait DataSource: Send {
    /// Human readable identity used in errors and logs (a path, a sheet name, ...).
    fn source_id(&self) -> String;

    /// Rewind the cursor to before the first row.
    fn reset(&mut self, progress: Progress<'_>) -> TranslationResult<()>;

    fn has_next(&self) -> bool;

    /// Advance the cursor by one row.
    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()>;

    fn column_count(&self) -> usize;

    fn column_names(&self) -> Vec<String>;

    /// Best-effort declared types, one per column. May be all [`ValueType::Unknown`].
    fn value_type_hints(&self) -> Vec<ValueType> {
        vec![ValueType::Unknown; self.column_count()]
    }

    fn is_missing(&self, col: usize) -> bool;

    /// Text of the cell at `col`, or `None` if the row has no such cell.
    fn get_string(&self, col: usize) -> Option<Cow<'_, str>>;

    fn get_number(&self, col: usize) -> Option<f64> {
        parse_number(&self.get_string(col)?)
    }

    fn get_integer(&self, col: usize) -> Option<i64> {
        self.get_string(col)?.trim().parse::<i64>().ok()
    }

    fn get_date(&self, col: usize, format: &DateFormat) -> Option<NaiveDateTime> {
        format.parse(&self.get_string(col)?)
    }

    /// Release the underlying resources. Further calls are a no-op.
    fn close(&mut self) -> TranslationResult<()> {
        Ok(())
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn source_id(&self) -> String {
        (**self).source_id()
    }

    fn reset(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        (**self).reset(progress)
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        (**self).next(progress)
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn column_names(&self) -> Vec<String> {
        (**self).column_names()
    }

    fn value_type_hints(&self) -> Vec<ValueType> {
        (**self).value_type_hints()
    }

    fn is_missing(&self, col: usize) -> bool {
        (**self).is_missing(col)
    }

    fn get_string(&self, col: usize) -> Option<Cow<'_, str>> {
        (**self).get_string(col)
    }

    fn get_number(&self, col: usize) -> Option<f64> {
        (**self).get_number(col)
    }

    fn get_integer(&self, col: usize) -> Option<i64> {
        (**self).get_integer(col)
    }

    fn get_date(&self, col: usize, format: &DateFormat) -> Option<NaiveDateTime> {
        (**self).get_date(col, format)
    }

    fn close(&mut self) -> TranslationResult<()> {
        (**self).close()
    }
}

/// Parses a finite floating point number from trimmed text.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a whole float to `i64`, or `None` when it has a fraction or lies outside `i64`.
///
/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
pub(crate) fn whole_to_i64(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Text cells are missing when absent or blank.
pub(crate) fn is_blank(cell: Option<&str>) -> bool {
    cell.is_none_or(|s| s.trim().is_empty())
}
