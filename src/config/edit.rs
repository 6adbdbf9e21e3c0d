use serde::{Deserialize, Serialize};

use crate::types::{Role, ValueType};

use super::AnnotationKind;

/// An immutable edit command applied with [`super::TranslationConfiguration::apply`].
///
/// Front ends describe user changes as commands instead of mutating the configuration in place;
/// applying a command yields a new configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum ColumnEdit {
    Rename { column: usize, name: String },
    ClearName { column: usize },
    SetSelected { column: usize, selected: bool },
    SetValueType { column: usize, value_type: ValueType },
    SetRole { column: usize, role: Role },
    SetAnnotation { row: usize, kind: AnnotationKind },
    ClearAnnotation { row: usize },
}

impl ColumnEdit {
    /// Column the edit refers to, if it is a column edit.
    pub fn column(&self) -> Option<usize> {
        match self {
            ColumnEdit::Rename { column, .. }
            | ColumnEdit::ClearName { column }
            | ColumnEdit::SetSelected { column, .. }
            | ColumnEdit::SetValueType { column, .. }
            | ColumnEdit::SetRole { column, .. } => Some(*column),
            ColumnEdit::SetAnnotation { .. } | ColumnEdit::ClearAnnotation { .. } => None,
        }
    }
}
