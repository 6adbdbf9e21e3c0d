//! Polars data frames (and SQL query results) as a source.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, TimeUnit};

use crate::date::DateFormat;
use crate::error::{TranslationError, TranslationResult};
use crate::progress::Progress;
use crate::types::ValueType;

use super::{parse_number, whole_to_i64, DataSource};

/// A [`DataSource`] over an in-memory Polars [`DataFrame`].
///
/// Column dtypes are reported as type hints. Numeric and temporal cells are read natively; string
/// cells fall back to the default parsing.
pub struct DataFrameSource {
    id: String,
    frame: DataFrame,
    cursor: Option<usize>,
}

impl DataFrameSource {
    pub fn new(id: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            id: id.into(),
            frame,
            cursor: None,
        }
    }

    /// Run `query` against the given named tables and expose the result rows.
    ///
    /// Returns [`TranslationError::SourceOpen`] if the query cannot be planned or executed.
    #[cfg(feature = "sql")]
    pub fn from_sql(tables: Vec<(String, DataFrame)>, query: &str) -> TranslationResult<Self> {
        use polars::prelude::IntoLazy;

        let id = format!("sql: {query}");
        let mut ctx = polars_sql::SQLContext::new();
        for (name, df) in tables {
            ctx.register(&name, df.lazy());
        }
        let frame = ctx
            .execute(query)
            .and_then(|lf| lf.collect())
            .map_err(|e| TranslationError::source_open(&id, e))?;
        tracing::debug!(rows = frame.height(), columns = frame.width(), "sql source ready");
        Ok(Self::new(id, frame))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    fn column(&self, col: usize) -> Option<&Column> {
        self.frame.columns().get(col)
    }

    fn value(&self, col: usize) -> Option<AnyValue<'_>> {
        let row = self.cursor?;
        self.column(col)?.get(row).ok()
    }
}

impl DataSource for DataFrameSource {
    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn reset(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        self.cursor = None;
        progress.set_total(self.frame.height());
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.frame.height()
    }

    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.frame.height() {
            return Err(TranslationError::SourceExhausted { row: next });
        }
        self.cursor = Some(next);
        progress.set_completed(next + 1);
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.frame.width()
    }

    fn column_names(&self) -> Vec<String> {
        self.frame
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn value_type_hints(&self) -> Vec<ValueType> {
        self.frame
            .columns()
            .iter()
            .map(|c| dtype_hint(c.dtype()))
            .collect()
    }

    fn is_missing(&self, col: usize) -> bool {
        match self.value(col) {
            None | Some(AnyValue::Null) => true,
            Some(AnyValue::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    fn get_string(&self, col: usize) -> Option<Cow<'_, str>> {
        match self.value(col)? {
            AnyValue::Null => None,
            AnyValue::String(s) => Some(Cow::Borrowed(s)),
            other => Some(Cow::Owned(other.str_value().into_owned())),
        }
    }

    fn get_number(&self, col: usize) -> Option<f64> {
        let dtype = self.column(col)?.dtype();
        match self.value(col)? {
            AnyValue::String(s) => parse_number(s),
            v if dtype.is_integer() || dtype.is_float() => v.extract::<f64>(),
            _ => None,
        }
    }

    fn get_integer(&self, col: usize) -> Option<i64> {
        let dtype = self.column(col)?.dtype();
        match self.value(col)? {
            AnyValue::String(s) => s.trim().parse::<i64>().ok(),
            v if dtype.is_integer() => v.extract::<i64>(),
            v if dtype.is_float() => v.extract::<f64>().and_then(whole_to_i64),
            _ => None,
        }
    }

    fn get_date(&self, col: usize, format: &DateFormat) -> Option<NaiveDateTime> {
        match self.value(col)? {
            AnyValue::String(s) => format.parse(s),
            AnyValue::Date(days) => NaiveDate::from_ymd_opt(1970, 1, 1)?
                .checked_add_signed(TimeDelta::days(i64::from(days)))
                .map(|d| d.and_time(chrono::NaiveTime::MIN)),
            AnyValue::Datetime(v, unit, _) => {
                let dt = match unit {
                    TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                    TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                    TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                };
                dt.map(|d| d.naive_utc())
            }
            _ => None,
        }
    }
}

fn dtype_hint(dtype: &DataType) -> ValueType {
    match dtype {
        d if d.is_integer() => ValueType::Integer,
        d if d.is_float() => ValueType::Real,
        DataType::Date => ValueType::Date,
        DataType::Datetime(..) => ValueType::DateTime,
        DataType::Boolean => ValueType::Binominal,
        _ => ValueType::Unknown,
    }
}
