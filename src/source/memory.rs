//! In-memory rows of optional strings.

use std::borrow::Cow;

use crate::error::{TranslationError, TranslationResult};
use crate::progress::Progress;
use crate::types::ValueType;

use super::{is_blank, DataSource};

/// A [`DataSource`] over rows held in memory.
///
/// `None` cells and blank strings are missing. Rows shorter than the column count yield missing
/// cells for the absent columns.
#[derive(Debug, Clone)]
pub struct MemorySource {
    names: Vec<String>,
    hints: Vec<ValueType>,
    rows: Vec<Vec<Option<String>>>,
    /// Index of the current row; `None` before the first `next`.
    cursor: Option<usize>,
}

impl MemorySource {
    pub fn new(names: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let hints = vec![ValueType::Unknown; names.len()];
        Self {
            names,
            hints,
            rows,
            cursor: None,
        }
    }

    /// Build from string slices; empty strings become missing cells.
    pub fn from_strs(names: &[&str], rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| (!c.is_empty()).then(|| c.to_string()))
                    .collect()
            })
            .collect();
        Self::new(names.iter().map(|n| n.to_string()).collect(), rows)
    }

    /// Declare per-column type hints.
    pub fn with_type_hints(mut self, hints: Vec<ValueType>) -> Self {
        self.hints = hints;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, col: usize) -> Option<&str> {
        self.rows.get(self.cursor?)?.get(col)?.as_deref()
    }
}

impl DataSource for MemorySource {
    fn source_id(&self) -> String {
        format!("memory[{}x{}]", self.rows.len(), self.names.len())
    }

    fn reset(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        self.cursor = None;
        progress.set_total(self.rows.len());
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.rows.len()
    }

    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.rows.len() {
            return Err(TranslationError::SourceExhausted { row: next });
        }
        self.cursor = Some(next);
        progress.set_completed(next + 1);
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn value_type_hints(&self) -> Vec<ValueType> {
        let mut hints = self.hints.clone();
        hints.resize(self.names.len(), ValueType::Unknown);
        hints
    }

    fn is_missing(&self, col: usize) -> bool {
        is_blank(self.cell(col))
    }

    fn get_string(&self, col: usize) -> Option<Cow<'_, str>> {
        self.cell(col).map(Cow::Borrowed)
    }
}
