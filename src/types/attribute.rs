//! DynamoDB attribute values and their plain JSON form.
//!
//! Callers work with [`Item`], an ordinary JSON object. The wire uses the
//! type-tagged [`AttributeValue`]; conversion happens at the facade boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// A table item as plain JSON values.
pub type Item = Map<String, Value>;

/// Type-tagged attribute map as sent on the wire.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// A DynamoDB attribute value, serialized as `{"S": "..."}` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, carried as its decimal string.
    N(String),
    /// Binary, carried as base64.
    B(String),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null marker.
    #[serde(rename = "NULL")]
    Null(bool),
    /// List.
    L(Vec<AttributeValue>),
    /// Map.
    M(HashMap<String, AttributeValue>),
    /// String set.
    SS(Vec<String>),
    /// Number set.
    NS(Vec<String>),
    /// Binary set.
    BS(Vec<String>),
}

impl AttributeValue {
    /// Tag a plain JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Null => AttributeValue::Null(true),
            Value::Array(items) => AttributeValue::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Strip the type tag.
    ///
    /// Numbers become JSON numbers, or stay strings when they do not fit one.
    /// Binary values stay base64 strings.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::S(s) | AttributeValue::B(s) => Value::String(s.clone()),
            AttributeValue::N(n) => number_to_json(n),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::L(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            AttributeValue::M(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            AttributeValue::SS(values) | AttributeValue::BS(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::NS(values) => {
                Value::Array(values.iter().map(|n| number_to_json(n)).collect())
            }
        }
    }
}

fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

/// Tag every attribute of a plain item.
pub fn to_attribute_map(item: &Item) -> AttributeMap {
    item.iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
        .collect()
}

/// Strip the tags from every attribute of a wire item.
pub fn from_attribute_map(attributes: &AttributeMap) -> Item {
    attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let value = AttributeValue::from_json(&json!({
            "name": "widget",
            "count": 3,
            "active": true,
            "missing": null,
            "tags": ["a", 1]
        }));

        let wire = serde_json::to_value(&value).unwrap();
        assert_eq!(
            wire,
            json!({"M": {
                "name": {"S": "widget"},
                "count": {"N": "3"},
                "active": {"BOOL": true},
                "missing": {"NULL": true},
                "tags": {"L": [{"S": "a"}, {"N": "1"}]}
            }})
        );
    }

    #[test]
    fn test_deserialize_sets_and_binary() {
        let value: AttributeValue = serde_json::from_value(json!({"SS": ["x", "y"]})).unwrap();
        assert_eq!(value.to_json(), json!(["x", "y"]));

        let value: AttributeValue = serde_json::from_value(json!({"NS": ["1", "2.5"]})).unwrap();
        assert_eq!(value.to_json(), json!([1, 2.5]));

        let value: AttributeValue = serde_json::from_value(json!({"B": "aGVsbG8="})).unwrap();
        assert_eq!(value.to_json(), json!("aGVsbG8="));
    }

    #[test]
    fn test_number_decoding() {
        assert_eq!(AttributeValue::N("42".into()).to_json(), json!(42));
        assert_eq!(AttributeValue::N("-7".into()).to_json(), json!(-7));
        assert_eq!(AttributeValue::N("0.5".into()).to_json(), json!(0.5));
        assert_eq!(
            AttributeValue::N("18446744073709551616".into()).to_json(),
            json!(18446744073709551616.0)
        );
        assert_eq!(AttributeValue::N("abc".into()).to_json(), json!("abc"));
    }

    #[test]
    fn test_item_conversion() {
        let item: Item = json!({"id": "1", "score": 10, "ok": false})
            .as_object()
            .cloned()
            .unwrap();

        let wire = to_attribute_map(&item);
        assert_eq!(wire["id"], AttributeValue::S("1".into()));
        assert_eq!(wire["score"], AttributeValue::N("10".into()));
        assert_eq!(wire["ok"], AttributeValue::Bool(false));

        assert_eq!(from_attribute_map(&wire), item);
    }
}
