use serde::{Deserialize, Serialize};

use crate::types::{Role, ValueType};

/// Per-column descriptor of a [`super::TranslationConfiguration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Name reported by the source.
    pub original_name: String,
    /// Name chosen by the user; applied after the read, overriding annotation names.
    pub user_defined_name: Option<String>,
    pub value_type: ValueType,
    pub role: Role,
    /// Unselected columns are not materialized.
    pub selected: bool,
}

impl ColumnMetadata {
    /// Probe defaults: `Unknown`, `Regular`, selected.
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            user_defined_name: None,
            value_type: ValueType::Unknown,
            role: Role::Regular,
            selected: true,
        }
    }

    /// The user-defined name if set, otherwise the original name.
    pub fn name(&self) -> &str {
        self.user_defined_name
            .as_deref()
            .unwrap_or(&self.original_name)
    }
}
