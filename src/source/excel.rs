#![cfg(feature = "excel")]

use std::borrow::Cow;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::NaiveDateTime;

use crate::date::DateFormat;
use crate::error::{TranslationError, TranslationResult};
use crate::progress::Progress;
use crate::types::ValueType;

use super::{parse_number, whole_to_i64, DataSource};

/// Options for reading one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcelOptions {
    /// Sheet to read; `None` picks the first sheet in the workbook.
    pub sheet: Option<String>,
    /// If `true`, the first non-empty row supplies column names and is not a row.
    pub has_headers: bool,
}

/// A [`DataSource`] over one worksheet of an Excel/ODS workbook, read with `calamine`.
///
/// The sheet range is loaded once when the source is opened; resets only rewind the cursor.
/// Numeric and date cells are read natively; text cells fall back to the default parsing.
pub struct ExcelSource {
    id: String,
    range: Range<Data>,
    names: Vec<String>,
    /// First data row within `range`.
    first_row: usize,
    /// Absolute row index of the current row; `None` before the first `next`.
    cursor: Option<usize>,
}

impl ExcelSource {
    /// Open a workbook and load one sheet.
    ///
    /// Returns [`TranslationError::SourceOpen`] if the workbook or the sheet cannot be opened.
    pub fn from_path(path: impl AsRef<Path>, options: &ExcelOptions) -> TranslationResult<Self> {
        let path = path.as_ref();
        let id = path.display().to_string();
        let mut workbook =
            open_workbook_auto(path).map_err(|e| TranslationError::source_open(&id, e))?;

        let sheet = match &options.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| TranslationError::source_open(&id, "workbook has no sheets"))?,
        };
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| TranslationError::source_open(format!("{id}:{sheet}"), e))?;

        Ok(Self::from_range(format!("{id}:{sheet}"), range, options.has_headers))
    }

    /// Wrap an already loaded sheet range.
    pub fn from_range(id: impl Into<String>, range: Range<Data>, has_headers: bool) -> Self {
        let width = range.width();
        let (names, first_row) = if has_headers {
            let header_idx = range
                .rows()
                .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)));
            match header_idx {
                Some(idx) => {
                    let mut names: Vec<String> = (0..width)
                        .map(|col| range.get((idx, col)).map(header_string).unwrap_or_default())
                        .collect();
                    for (i, n) in names.iter_mut().enumerate() {
                        if n.trim().is_empty() {
                            *n = format!("att{}", i + 1);
                        }
                    }
                    (names, idx + 1)
                }
                None => (Vec::new(), range.height()),
            }
        } else {
            ((1..=width).map(|i| format!("att{i}")).collect(), 0)
        };

        Self {
            id: id.into(),
            range,
            names,
            first_row,
            cursor: None,
        }
    }

    fn cell(&self, col: usize) -> Option<&Data> {
        self.range.get((self.cursor?, col))
    }
}

impl DataSource for ExcelSource {
    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn reset(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        self.cursor = None;
        progress.set_total(self.range.height().saturating_sub(self.first_row));
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.cursor.map_or(self.first_row, |c| c + 1) < self.range.height()
    }

    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        let next = self.cursor.map_or(self.first_row, |c| c + 1);
        if next >= self.range.height() {
            return Err(TranslationError::SourceExhausted {
                row: next - self.first_row,
            });
        }
        self.cursor = Some(next);
        progress.set_completed(next + 1 - self.first_row);
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn value_type_hints(&self) -> Vec<ValueType> {
        (0..self.names.len())
            .map(|col| match self.range.get((self.first_row, col)) {
                Some(Data::Int(_)) => ValueType::Integer,
                Some(Data::Float(_)) => ValueType::Real,
                Some(Data::DateTime(_) | Data::DateTimeIso(_)) => ValueType::DateTime,
                Some(Data::Bool(_)) => ValueType::Binominal,
                _ => ValueType::Unknown,
            })
            .collect()
    }

    fn is_missing(&self, col: usize) -> bool {
        match self.cell(col) {
            None | Some(Data::Empty) => true,
            Some(Data::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    fn get_string(&self, col: usize) -> Option<Cow<'_, str>> {
        match self.cell(col)? {
            Data::Empty => None,
            Data::String(s) => Some(Cow::Borrowed(s.as_str())),
            Data::Float(f) => match whole_to_i64(*f) {
                Some(i) => Some(Cow::Owned(i.to_string())),
                None => Some(Cow::Owned(f.to_string())),
            },
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    fn get_number(&self, col: usize) -> Option<f64> {
        match self.cell(col)? {
            Data::Int(i) => Some(*i as f64),
            Data::Float(f) => Some(*f),
            Data::String(s) => parse_number(s),
            _ => None,
        }
    }

    fn get_integer(&self, col: usize) -> Option<i64> {
        match self.cell(col)? {
            Data::Int(i) => Some(*i),
            Data::Float(f) => whole_to_i64(*f),
            Data::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    fn get_date(&self, col: usize, format: &DateFormat) -> Option<NaiveDateTime> {
        match self.cell(col)? {
            Data::String(s) => format.parse(s),
            c @ (Data::DateTime(_) | Data::DateTimeIso(_)) => c.as_datetime(),
            _ => None,
        }
    }
}

fn header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => whole_to_i64(*f).map_or_else(|| f.to_string(), |i| i.to_string()),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
