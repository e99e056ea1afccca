//! Declared shape of a single payload field.

use super::ContractDefinitionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON type a field is declared to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A JSON string.
    String,
    /// Any JSON number, integer or float.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
}

impl FieldType {
    /// Returns `true` when `value` is of this type.
    #[must_use]
    pub const fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Object, Value::Object(_))
                | (Self::Array, Value::Array(_))
        )
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns the type name of an arbitrary JSON value.
    #[must_use]
    pub const fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled regular expression attached to a field.
///
/// Serializes as its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPattern(Regex);

impl FieldPattern {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns the regex compiler's error when `source` is not a valid
    /// pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` when the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for FieldPattern {
    type Error = regex::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<FieldPattern> for String {
    fn from(value: FieldPattern) -> Self {
        value.0.as_str().to_owned()
    }
}

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound, inclusive.
    pub min: Option<f64>,
    /// Upper bound, inclusive.
    pub max: Option<f64>,
}

impl NumericRange {
    /// Returns `true` when `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "[{min}, {max}]"),
            (Some(min), None) => write!(f, ">= {min}"),
            (None, Some(max)) => write!(f, "<= {max}"),
            (None, None) => f.write_str("any"),
        }
    }
}

/// Describes one payload field of a [`super::HandoffContract`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContract {
    name: String,
    field_type: FieldType,
    required: bool,
    pattern: Option<FieldPattern>,
    allowed_values: Vec<Value>,
    range: Option<NumericRange>,
    max_length: Option<usize>,
    pii: bool,
    financial_data: bool,
    sensitive: bool,
}

impl FieldContract {
    fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            pattern: None,
            allowed_values: Vec::new(),
            range: None,
            max_length: None,
            pii: false,
            financial_data: false,
            sensitive: false,
        }
    }

    /// Declares a field that must be present.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, true)
    }

    /// Declares a field that is checked only when present.
    #[must_use]
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, false)
    }

    /// Attaches a regular expression the stringified value must match.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDefinitionError::InvalidPattern`] when the pattern
    /// does not compile.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, ContractDefinitionError> {
        let compiled =
            FieldPattern::new(pattern).map_err(|err| ContractDefinitionError::InvalidPattern {
                field: self.name.clone(),
                message: err.to_string(),
            })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// Restricts the field to an enumeration of allowed values.
    #[must_use]
    pub fn with_allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.allowed_values = values.into_iter().collect();
        self
    }

    /// Attaches inclusive numeric bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDefinitionError::EmptyRange`] when both bounds are
    /// given and `min > max`.
    pub fn with_range(
        mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, ContractDefinitionError> {
        if let (Some(low), Some(high)) = (min, max)
            && low > high
        {
            return Err(ContractDefinitionError::EmptyRange {
                field: self.name.clone(),
            });
        }
        self.range = Some(NumericRange { min, max });
        Ok(self)
    }

    /// Caps string length in characters, or array length in elements.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Flags the field as personally identifiable information.
    #[must_use]
    pub const fn pii(mut self) -> Self {
        self.pii = true;
        self
    }

    /// Flags the field as carrying financial records.
    #[must_use]
    pub const fn financial_data(mut self) -> Self {
        self.financial_data = true;
        self
    }

    /// Flags the field for masking before it reaches the audit store.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the declared pattern, if any.
    #[must_use]
    pub const fn pattern(&self) -> Option<&FieldPattern> {
        self.pattern.as_ref()
    }

    /// Returns the allowed values; empty means unrestricted.
    #[must_use]
    pub fn allowed_values(&self) -> &[Value] {
        &self.allowed_values
    }

    /// Returns the numeric bounds, if any.
    #[must_use]
    pub const fn range(&self) -> Option<NumericRange> {
        self.range
    }

    /// Returns the maximum length, if any.
    #[must_use]
    pub const fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Returns whether the field holds PII.
    #[must_use]
    pub const fn is_pii(&self) -> bool {
        self.pii
    }

    /// Returns whether the field holds financial records.
    #[must_use]
    pub const fn is_financial_data(&self) -> bool {
        self.financial_data
    }

    /// Returns whether the field must be masked before persistence.
    ///
    /// PII fields are always masked.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        self.sensitive || self.pii
    }
}
