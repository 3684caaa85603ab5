//! Type-constraint atoms over the JSON value model.

use serde_json::Value;

/// The value types a key may be constrained to.
///
/// `Int` and `Float` are distinct: an integer never satisfies a float-only
/// constraint and vice versa. Accept any number with
/// `[ValueType::Int, ValueType::Float]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Whether `value` is of this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::Null => value.is_null(),
            ValueType::Bool => value.is_boolean(),
            ValueType::Int => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_f64(),
            ValueType::String => value.is_string(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }
}

/// Format a value for error messages and renderings: compact JSON.
pub(crate) fn fmt_value(value: &Value) -> String {
    value.to_string()
}
