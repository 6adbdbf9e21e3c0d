//! Translation configuration: per-column metadata plus the annotation-row map.
//!
//! A [`TranslationConfiguration`] is built from a probe of a [`DataSource`] (names and column
//! count), optionally refined by persisted [`ColumnOverride`]s, by the
//! [`crate::guess::TypeGuesser`], and by [`ColumnEdit`] commands, then handed read-only to a
//! [`crate::translate::Translator`].
//!
//! ```
//! use rust_data_translation::config::{ConfigurationOptions, TranslationConfiguration};
//! use rust_data_translation::source::MemorySource;
//!
//! let source = MemorySource::from_strs(&["a", "b"], &[&["Id", "Score"], &["1", "2.5"]]);
//! let config = TranslationConfiguration::from_source(
//!     &source,
//!     &ConfigurationOptions {
//!         first_row_as_names: true,
//!         ..Default::default()
//!     },
//! );
//! assert!(config.annotation(0).is_some());
//! assert_eq!(config.selected_indices(), vec![0, 1]);
//! ```

mod column;
mod edit;
mod persist;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date::{DateFormat, DEFAULT_DATE_PATTERN};
use crate::error::{TranslationError, TranslationResult};
use crate::source::DataSource;
use crate::types::ValueType;

pub use column::ColumnMetadata;
pub use edit::ColumnEdit;
pub use persist::ColumnOverride;

/// Reserved annotation key for rows that carry attribute names.
pub const NAME_ANNOTATION: &str = "Name";

/// What an annotation row encodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// The row holds attribute names.
    Name,
    /// The row holds a named annotation (e.g. `"Unit"`) for each attribute.
    Custom(String),
}

impl AnnotationKind {
    pub fn as_str(&self) -> &str {
        match self {
            AnnotationKind::Name => NAME_ANNOTATION,
            AnnotationKind::Custom(key) => key,
        }
    }
}

impl From<&str> for AnnotationKind {
    fn from(s: &str) -> Self {
        if s == NAME_ANNOTATION {
            AnnotationKind::Name
        } else {
            AnnotationKind::Custom(s.to_string())
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnnotationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnnotationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AnnotationKind::from(s.as_str()))
    }
}

/// Source row index → annotation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationMap {
    rows: HashMap<usize, AnnotationKind>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: usize, kind: AnnotationKind) -> Option<AnnotationKind> {
        self.rows.insert(row, kind)
    }

    pub fn remove(&mut self, row: usize) -> Option<AnnotationKind> {
        self.rows.remove(&row)
    }

    pub fn get(&self, row: usize) -> Option<&AnnotationKind> {
        self.rows.get(&row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entries ordered by row index.
    pub fn entries(&self) -> Vec<(usize, &AnnotationKind)> {
        let mut out: Vec<_> = self.rows.iter().map(|(r, k)| (*r, k)).collect();
        out.sort_by_key(|(r, _)| *r);
        out
    }

    /// Lowest row registered as [`AnnotationKind::Name`].
    pub fn name_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .filter(|(_, k)| **k == AnnotationKind::Name)
            .map(|(r, _)| *r)
            .min()
    }
}

impl FromIterator<(usize, AnnotationKind)> for AnnotationMap {
    fn from_iter<I: IntoIterator<Item = (usize, AnnotationKind)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Options used when building a configuration from a source probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationOptions {
    /// Register source row 0 as the [`AnnotationKind::Name`] row.
    ///
    /// Takes precedence over [`Self::annotations`]: when set, the explicit list is ignored.
    pub first_row_as_names: bool,
    /// Explicit annotation rows, used when `first_row_as_names` is off.
    pub annotations: Vec<(usize, AnnotationKind)>,
    /// Locale tag carried to downstream consumers (e.g. `"en_US"`).
    pub locale: String,
    /// `chrono` strftime pattern for date, time and date-time cells.
    pub date_pattern: String,
    /// Seed column types from [`DataSource::value_type_hints`] instead of `Unknown`.
    pub trust_source_types: bool,
}

impl Default for ConfigurationOptions {
    fn default() -> Self {
        Self {
            first_row_as_names: false,
            annotations: Vec::new(),
            locale: "en_US".to_string(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            trust_source_types: false,
        }
    }
}

/// Per-column metadata, annotation rows, locale and date pattern for one import session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationConfiguration {
    columns: Vec<ColumnMetadata>,
    annotations: AnnotationMap,
    locale: String,
    date_format: DateFormat,
}

impl TranslationConfiguration {
    /// Build from explicit parts.
    pub fn new(
        columns: Vec<ColumnMetadata>,
        annotations: AnnotationMap,
        locale: impl Into<String>,
        date_format: DateFormat,
    ) -> Self {
        Self {
            columns,
            annotations,
            locale: locale.into(),
            date_format,
        }
    }

    /// Probe `source` for column names and build the default configuration.
    pub fn from_source<S: DataSource + ?Sized>(source: &S, options: &ConfigurationOptions) -> Self {
        let names = source.column_names();
        let hints = if options.trust_source_types {
            source.value_type_hints()
        } else {
            Vec::new()
        };

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let mut column = ColumnMetadata::new(name);
                if let Some(hint) = hints.get(i) {
                    column.value_type = *hint;
                }
                column
            })
            .collect::<Vec<_>>();

        let annotations = if options.first_row_as_names {
            if !options.annotations.is_empty() {
                tracing::warn!(
                    ignored = options.annotations.len(),
                    "first_row_as_names is set; explicit annotation rows are ignored"
                );
            }
            AnnotationMap::from_iter([(0, AnnotationKind::Name)])
        } else {
            options.annotations.iter().cloned().collect()
        };

        tracing::debug!(
            source = %source.source_id(),
            columns = columns.len(),
            annotation_rows = annotations.len(),
            "configuration probed"
        );

        Self {
            columns,
            annotations,
            locale: options.locale.clone(),
            date_format: DateFormat::new(options.date_pattern.clone()),
        }
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnMetadata> {
        self.columns.get(index)
    }

    pub(crate) fn column_mut(&mut self, index: usize) -> Option<&mut ColumnMetadata> {
        self.columns.get_mut(index)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Annotation registered for source row `row`, if any.
    pub fn annotation(&self, row: usize) -> Option<&AnnotationKind> {
        self.annotations.get(row)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Source column indices of selected columns, in source order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of columns whose type is still [`ValueType::Unknown`].
    pub fn unknown_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.value_type == ValueType::Unknown)
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply persisted overrides on top of the current metadata.
    ///
    /// All indices are validated before anything is applied; an out-of-range index leaves the
    /// configuration untouched and returns [`TranslationError::Configuration`]. So does a
    /// custom role whose name collides with a built-in one.
    pub fn apply_overrides(&mut self, overrides: &[ColumnOverride]) -> TranslationResult<()> {
        if let Some(bad) = overrides.iter().find(|o| o.index >= self.columns.len()) {
            return Err(TranslationError::configuration(format!(
                "column index {} out of range (source has {} columns)",
                bad.index,
                self.columns.len()
            )));
        }
        for o in overrides {
            o.role.validate()?;
        }
        for o in overrides {
            let column = &mut self.columns[o.index];
            column.user_defined_name = o.user_defined_name.clone();
            column.selected = o.selected;
            column.value_type = o.value_type;
            column.role = o.role.clone();
        }
        tracing::debug!(applied = overrides.len(), "column overrides applied");
        Ok(())
    }

    /// Builder-style [`Self::apply_overrides`].
    pub fn with_overrides(mut self, overrides: &[ColumnOverride]) -> TranslationResult<Self> {
        self.apply_overrides(overrides)?;
        Ok(self)
    }

    /// Export the per-column state for persistence.
    pub fn to_overrides(&self) -> Vec<ColumnOverride> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, c)| ColumnOverride {
                index,
                user_defined_name: c.user_defined_name.clone(),
                selected: c.selected,
                value_type: c.value_type,
                role: c.role.clone(),
            })
            .collect()
    }

    /// Apply an edit command and return the resulting configuration.
    pub fn apply(&self, edit: ColumnEdit) -> TranslationResult<Self> {
        if let Some(column) = edit.column() {
            if column >= self.columns.len() {
                return Err(TranslationError::configuration(format!(
                    "edit refers to column {column}, source has {} columns",
                    self.columns.len()
                )));
            }
        }

        let mut next = self.clone();
        match edit {
            ColumnEdit::Rename { column, name } => {
                next.columns[column].user_defined_name = Some(name);
            }
            ColumnEdit::ClearName { column } => {
                next.columns[column].user_defined_name = None;
            }
            ColumnEdit::SetSelected { column, selected } => {
                next.columns[column].selected = selected;
            }
            ColumnEdit::SetValueType { column, value_type } => {
                next.columns[column].value_type = value_type;
            }
            ColumnEdit::SetRole { column, role } => {
                role.validate()?;
                next.columns[column].role = role;
            }
            ColumnEdit::SetAnnotation { row, kind } => {
                next.annotations.insert(row, kind);
            }
            ColumnEdit::ClearAnnotation { row } => {
                next.annotations.remove(row);
            }
        }
        Ok(next)
    }
}
