//! Persisted column overrides.
//!
//! Overrides are stored as a flat parameter list of `(key, value)` pairs:
//!
//! - key: the source column index, in decimal
//! - value: the tuple `name.selected.value_type.role`, where `.` and `\` inside a component are
//!   escaped with `\`, and an empty name means "no user-defined name"
//!
//! ```
//! use rust_data_translation::config::ColumnOverride;
//!
//! let list = vec![("2".to_string(), r"unit\.price.true.real.regular".to_string())];
//! let overrides = ColumnOverride::parse_parameter_list(&list).unwrap();
//! assert_eq!(overrides[0].index, 2);
//! assert_eq!(overrides[0].user_defined_name.as_deref(), Some("unit.price"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{TranslationError, TranslationResult};
use crate::types::{Role, ValueType};

const SEPARATOR: char = '.';
const ESCAPE: char = '\\';

/// User overrides for one source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverride {
    /// Source column index.
    pub index: usize,
    pub user_defined_name: Option<String>,
    pub selected: bool,
    pub value_type: ValueType,
    pub role: Role,
}

impl ColumnOverride {
    /// Decode one `(key, value)` entry.
    pub fn from_parameter(key: &str, value: &str) -> TranslationResult<Self> {
        let index = key.trim().parse::<usize>().map_err(|_| {
            TranslationError::configuration(format!("invalid column index '{key}'"))
        })?;

        let parts = split_tuple(value);
        let [name, selected, value_type, role] = parts.as_slice() else {
            return Err(TranslationError::configuration(format!(
                "column {index}: expected 4 tuple components, found {} in '{value}'",
                parts.len()
            )));
        };

        let selected = selected.trim().parse::<bool>().map_err(|_| {
            TranslationError::configuration(format!(
                "column {index}: invalid selection flag '{selected}'"
            ))
        })?;

        Ok(Self {
            index,
            user_defined_name: (!name.is_empty()).then(|| name.clone()),
            selected,
            value_type: value_type.parse()?,
            role: Role::from(role.as_str()),
        })
    }

    /// Encode as one `(key, value)` entry.
    pub fn to_parameter(&self) -> (String, String) {
        let fields = [
            self.user_defined_name.as_deref().unwrap_or(""),
            if self.selected { "true" } else { "false" },
            self.value_type.as_str(),
            self.role.as_str(),
        ];
        let value = fields
            .iter()
            .map(|f| escape(f))
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string());
        (self.index.to_string(), value)
    }

    /// Decode a whole parameter list, preserving order.
    pub fn parse_parameter_list(list: &[(String, String)]) -> TranslationResult<Vec<Self>> {
        list.iter()
            .map(|(k, v)| Self::from_parameter(k, v))
            .collect()
    }

    pub fn to_parameter_list(overrides: &[Self]) -> Vec<(String, String)> {
        overrides.iter().map(Self::to_parameter).collect()
    }

    /// Decode overrides stored as a JSON array.
    pub fn from_json(input: &str) -> TranslationResult<Vec<Self>> {
        serde_json::from_str(input)
            .map_err(|e| TranslationError::configuration(format!("invalid override json: {e}")))
    }

    pub fn to_json(overrides: &[Self]) -> TranslationResult<String> {
        serde_json::to_string_pretty(overrides)
            .map_err(|e| TranslationError::configuration(format!("cannot encode overrides: {e}")))
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

fn split_tuple(value: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                if let (Some(next), Some(last)) = (chars.next(), parts.last_mut()) {
                    last.push(next);
                }
            }
            SEPARATOR => parts.push(String::new()),
            other => {
                if let Some(last) = parts.last_mut() {
                    last.push(other);
                }
            }
        }
    }
    parts
}
