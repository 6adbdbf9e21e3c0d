//! Coercion of the current source row's cells into typed [`Value`]s.

use crate::date::DateFormat;
use crate::source::{whole_to_i64, DataSource};
use crate::types::{Attribute, Value, ValueType};

/// Coerce cell `col` by the attribute's finalized type.
///
/// Missing cells become [`Value::Missing`]. Categorical cells are registered in the attribute's
/// mapping. The error is a human-readable reason.
pub(crate) fn coerce_cell<S: DataSource + ?Sized>(
    source: &S,
    col: usize,
    attribute: &mut Attribute,
    format: &DateFormat,
) -> Result<Value, String> {
    if source.is_missing(col) {
        return Ok(Value::Missing);
    }

    match attribute.value_type {
        ValueType::Integer => source
            .get_integer(col)
            .or_else(|| {
                source.get_number(col).and_then(whole_to_i64)
            })
            .map(Value::Integer)
            .ok_or_else(|| "expected integer".to_string()),
        ValueType::Real => source
            .get_number(col)
            .map(Value::Real)
            .ok_or_else(|| "expected number".to_string()),
        ValueType::Date | ValueType::Time | ValueType::DateTime => source
            .get_date(col, format)
            .map(Value::Timestamp)
            .ok_or_else(|| format!("expected {} matching '{}'", attribute.value_type, format.pattern())),
        _ => {
            let raw = source.get_string(col).unwrap_or_default();
            let value_type = attribute.value_type;
            let mapping = attribute.mapping.get_or_insert_with(Default::default);
            mapping.map_or_insert(&raw).map(Value::Nominal).ok_or_else(|| {
                format!(
                    "{value_type} attribute already holds {} distinct values",
                    mapping.len()
                )
            })
        }
    }
}
