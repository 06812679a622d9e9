//! Values that may appear in a response `result`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire representation of a host entity that is not a plain scalar.
///
/// Descriptors are created at serialization time and are only meaningful
/// while the host entity they name is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandleDescriptor {
    /// Host identity of the entity.
    pub id: i64,
    /// Runtime kind of the entity, when known.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl HandleDescriptor {
    /// Builds a descriptor without a type tag.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self { id, kind: None }
    }

    /// Builds a descriptor tagged with the entity's runtime kind.
    #[must_use]
    pub fn typed(id: i64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: Some(kind.into()),
        }
    }
}

/// A wire-safe value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Non-integral number.
    Float(f64),
    /// UTF-8 text.
    Str(String),
    /// Ordered sequence.
    List(Vec<WireValue>),
    /// Reference to a live host entity.
    Handle(HandleDescriptor),
}

impl WireValue {
    /// Returns the handle id when the value is a descriptor.
    #[must_use]
    pub const fn handle_id(&self) -> Option<i64> {
        match self {
            Self::Handle(handle) => Some(handle.id),
            _ => None,
        }
    }

    /// Returns the integer payload, accepting descriptors as their id.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Handle(handle) => Some(handle.id),
            _ => None,
        }
    }

    /// Converts the value into a generic JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.to_json())
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<HandleDescriptor> for WireValue {
    fn from(value: HandleDescriptor) -> Self {
        Self::Handle(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for WireValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!(null), WireValue::Null)]
    #[case(json!(true), WireValue::Bool(true))]
    #[case(json!(42), WireValue::Int(42))]
    #[case(json!(3.5), WireValue::Float(3.5))]
    #[case(json!("text"), WireValue::from("text"))]
    #[case(json!({"id": 5}), WireValue::Handle(HandleDescriptor::new(5)))]
    #[case(
        json!({"id": 5, "type": "Image"}),
        WireValue::Handle(HandleDescriptor::typed(5, "Image"))
    )]
    #[case(
        json!([1, {"id": 2}]),
        WireValue::List(vec![WireValue::Int(1), WireValue::Handle(HandleDescriptor::new(2))])
    )]
    fn decodes_every_value_shape(#[case] input: serde_json::Value, #[case] expected: WireValue) {
        let decoded: WireValue = serde_json::from_value(input).expect("decode wire value");
        assert_eq!(decoded, expected);
    }

    #[test]
    fn descriptor_without_kind_omits_type_field() {
        let encoded = serde_json::to_string(&WireValue::Handle(HandleDescriptor::new(5)))
            .expect("encode handle");
        assert_eq!(encoded, r#"{"id":5}"#);
    }

    #[test]
    fn arbitrary_maps_are_not_values() {
        let result = serde_json::from_value::<WireValue>(json!({"name": "layer"}));
        assert!(result.is_err());
    }

    #[test]
    fn as_i64_accepts_handles() {
        assert_eq!(WireValue::Handle(HandleDescriptor::new(9)).as_i64(), Some(9));
        assert_eq!(WireValue::Int(4).as_i64(), Some(4));
        assert_eq!(WireValue::from("4").as_i64(), None);
    }
}
