//! Core data model types for translation.
//!
//! A translation produces an in-memory [`Dataset`]: an ordered list of typed [`Attribute`]s plus
//! row-major [`Value`] storage. Categorical attributes carry a [`NominalMapping`] that maps the
//! original strings to the indices stored in the rows.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TranslationError;

/// Logical value type of a column.
///
/// `Integer → Real → Date → Binominal → Polynominal` is the widening order consulted by the
/// [`crate::guess::TypeGuesser`]. `Time`, `DateTime` and `String` are only ever set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Not yet determined.
    #[default]
    Unknown,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Real,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time of day.
    DateTime,
    /// Categorical with at most two distinct values.
    Binominal,
    /// Categorical with any number of distinct values.
    Polynominal,
    /// Free text.
    String,
}

impl ValueType {
    /// All value types, in declaration order.
    pub const ALL: [ValueType; 9] = [
        ValueType::Unknown,
        ValueType::Integer,
        ValueType::Real,
        ValueType::Date,
        ValueType::Time,
        ValueType::DateTime,
        ValueType::Binominal,
        ValueType::Polynominal,
        ValueType::String,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Unknown => "unknown",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::DateTime => "date_time",
            ValueType::Binominal => "binominal",
            ValueType::Polynominal => "polynominal",
            ValueType::String => "string",
        }
    }

    /// `Integer` or `Real`.
    pub fn is_numerical(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Real)
    }

    /// `Date`, `Time` or `DateTime`.
    pub fn is_date_time(self) -> bool {
        matches!(self, ValueType::Date | ValueType::Time | ValueType::DateTime)
    }

    /// Values of this type are stored as indices into a [`NominalMapping`].
    pub fn is_nominal(self) -> bool {
        matches!(
            self,
            ValueType::Binominal | ValueType::Polynominal | ValueType::String
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ValueType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| TranslationError::configuration(format!("unknown value type '{s}'")))
    }
}

/// Semantic tag on an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Ordinary data column.
    #[default]
    Regular,
    /// Row identifier.
    Id,
    /// Target / label column.
    Label,
    /// Row weight.
    Weight,
    /// Any other special tag.
    ///
    /// The name must not read back as another role (`"id"`, `"label"`, `"weight"`, `"regular"`,
    /// `"attribute"`, blank or padded names); see [`Role::validate`].
    Custom(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Regular => "regular",
            Role::Id => "id",
            Role::Label => "label",
            Role::Weight => "weight",
            Role::Custom(name) => name,
        }
    }

    /// Build a custom role, rejecting names that would read back as a different role.
    pub fn custom(name: impl Into<String>) -> Result<Self, TranslationError> {
        let role = Role::Custom(name.into());
        role.validate()?;
        Ok(role)
    }

    /// Fails for a `Custom` role whose persisted string parses back as something else.
    pub fn validate(&self) -> Result<(), TranslationError> {
        match self {
            Role::Custom(name) if Role::from(name.as_str()) != *self => {
                Err(TranslationError::configuration(format!(
                    "custom role '{name}' is reserved or would not survive persistence"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn is_special(&self) -> bool {
        !matches!(self, Role::Regular)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "regular" | "attribute" => Role::Regular,
            "id" => Role::Id,
            "label" => Role::Label,
            "weight" => Role::Weight,
            other => Role::Custom(other.to_string()),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::from(s.as_str()))
    }
}

/// A single typed value in a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty or unparsable (in fault-tolerant mode) value.
    Missing,
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Real(f64),
    /// Date, time or date-time. Times are stored on `1970-01-01`.
    Timestamp(NaiveDateTime),
    /// Index into the attribute's [`NominalMapping`].
    Nominal(usize),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// Incrementally built string ↔ index dictionary of a categorical attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NominalMapping {
    values: Vec<String>,
    index: HashMap<String, usize>,
    capacity: Option<usize>,
}

impl NominalMapping {
    /// Unbounded mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping that accepts at most `capacity` distinct values.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Returns the index of `value`, registering it first if it is new.
    ///
    /// Returns `None` if the value is new and the mapping is full.
    pub fn map_or_insert(&mut self, value: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(value) {
            return Some(idx);
        }
        if self.capacity.is_some_and(|cap| self.values.len() >= cap) {
            return None;
        }
        let idx = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        Some(idx)
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Registered values in index order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A finalized, typed column of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Finalized value type (never [`ValueType::Unknown`]).
    pub value_type: ValueType,
    /// Semantic role.
    pub role: Role,
    /// Named annotations collected from annotation rows (e.g. `"Unit" → "kg"`).
    pub annotations: BTreeMap<String, String>,
    /// Dictionary for categorical attributes; `None` for numeric and date attributes.
    pub mapping: Option<NominalMapping>,
}

impl Attribute {
    /// Create a regular attribute. `Unknown` finalizes to `Polynominal`.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        let value_type = match value_type {
            ValueType::Unknown => ValueType::Polynominal,
            other => other,
        };
        let mapping = match value_type {
            ValueType::Binominal => Some(NominalMapping::bounded(2)),
            t if t.is_nominal() => Some(NominalMapping::new()),
            _ => None,
        };
        Self {
            name: name.into(),
            value_type,
            role: Role::Regular,
            annotations: BTreeMap::new(),
            mapping,
        }
    }
}

/// In-memory typed dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Ordered attribute descriptors.
    pub attributes: Vec<Attribute>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create a dataset from attributes and rows.
    pub fn new(attributes: Vec<Attribute>, rows: Vec<Vec<Value>>) -> Self {
        Self { attributes, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate attribute names in order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    /// Returns the index of an attribute by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Returns the attribute carrying `role`, if any.
    pub fn special(&self, role: &Role) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.role == role)
    }

    /// Resolves a stored value to its display string.
    ///
    /// Nominal indices are looked up in the attribute's mapping; missing values yield `None`.
    pub fn display_value(&self, row: usize, col: usize) -> Option<String> {
        let value = self.rows.get(row)?.get(col)?;
        match value {
            Value::Missing => None,
            Value::Integer(v) => Some(v.to_string()),
            Value::Real(v) => Some(v.to_string()),
            Value::Timestamp(v) => Some(v.to_string()),
            Value::Nominal(idx) => self
                .attributes
                .get(col)?
                .mapping
                .as_ref()?
                .value(*idx)
                .map(str::to_string),
        }
    }

    /// Column `col` as display strings, one per row.
    pub fn column_strings(&self, col: usize) -> Vec<Option<String>> {
        (0..self.row_count())
            .map(|row| self.display_value(row, col))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Attribute, NominalMapping, Role, ValueType};

    #[test]
    fn value_type_parses_case_insensitively() {
        assert_eq!("Date_Time".parse::<ValueType>().unwrap(), ValueType::DateTime);
        assert_eq!("binominal".parse::<ValueType>().unwrap(), ValueType::Binominal);
        assert!("decimal".parse::<ValueType>().is_err());
    }

    #[test]
    fn bounded_mapping_rejects_third_value() {
        let mut m = NominalMapping::bounded(2);
        assert_eq!(m.map_or_insert("yes"), Some(0));
        assert_eq!(m.map_or_insert("no"), Some(1));
        assert_eq!(m.map_or_insert("yes"), Some(0));
        assert_eq!(m.map_or_insert("maybe"), None);
        assert_eq!(m.values(), ["yes".to_string(), "no".to_string()]);
    }

    #[test]
    fn unknown_attribute_finalizes_to_polynominal() {
        let a = Attribute::new("x", ValueType::Unknown);
        assert_eq!(a.value_type, ValueType::Polynominal);
        assert!(a.mapping.is_some());
        assert!(Attribute::new("n", ValueType::Real).mapping.is_none());
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::from("label"), Role::Label);
        assert_eq!(Role::from("cluster"), Role::Custom("cluster".to_string()));
        assert_eq!(Role::from("cluster").to_string(), "cluster");
        assert!(!Role::from("regular").is_special());
    }

    #[test]
    fn custom_roles_may_not_shadow_built_ins() {
        for name in ["label", "id", "weight", "regular", "attribute", "", " batch"] {
            assert!(Role::custom(name).is_err(), "{name:?}");
        }
        assert_eq!(
            Role::custom("batch").unwrap(),
            Role::Custom("batch".to_string())
        );
        assert!(Role::Id.validate().is_ok());
    }
}
