//! Common enums and request shapes.

use super::attribute::AttributeValue;
use crate::error::AwsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Role of an attribute in a table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    /// Partition key.
    Hash,
    /// Sort key.
    Range,
}

/// Declared type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarAttributeType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
}

/// One element of a table's key schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    /// Attribute name.
    pub attribute_name: String,
    /// Partition or sort key.
    pub key_type: KeyType,
}

impl KeySchemaElement {
    /// Partition key element.
    pub fn hash(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Hash,
        }
    }

    /// Sort key element.
    pub fn range(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Range,
        }
    }
}

/// Type declaration for a key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    /// Attribute name.
    pub attribute_name: String,
    /// Attribute type.
    pub attribute_type: ScalarAttributeType,
}

impl AttributeDefinition {
    /// Create a definition.
    pub fn new(attribute_name: impl Into<String>, attribute_type: ScalarAttributeType) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            attribute_type,
        }
    }
}

/// Provisioned read and write capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    /// Read capacity units.
    pub read_capacity_units: i64,
    /// Write capacity units.
    pub write_capacity_units: i64,
}

impl ProvisionedThroughput {
    /// Create a throughput setting.
    pub fn new(read_capacity_units: i64, write_capacity_units: i64) -> Self {
        Self {
            read_capacity_units,
            write_capacity_units,
        }
    }
}

/// Declared type of the value in an equality scan filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary, given as base64.
    B,
    /// Boolean.
    Bool,
}

impl FilterType {
    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::S => "S",
            FilterType::N => "N",
            FilterType::B => "B",
            FilterType::Bool => "BOOL",
        }
    }

    /// Tag `value` with this type.
    pub fn attribute_value(&self, value: &Value) -> Result<AttributeValue, AwsError> {
        let mismatch = || {
            AwsError::validation(format!(
                "filter value {} does not match type {}",
                value,
                self.as_str()
            ))
        };

        match (self, value) {
            (FilterType::S, Value::String(s)) => Ok(AttributeValue::S(s.clone())),
            (FilterType::N, Value::Number(n)) => Ok(AttributeValue::N(n.to_string())),
            (FilterType::N, Value::String(s)) if s.parse::<f64>().is_ok() => {
                Ok(AttributeValue::N(s.clone()))
            }
            (FilterType::B, Value::String(s)) => Ok(AttributeValue::B(s.clone())),
            (FilterType::Bool, Value::Bool(b)) => Ok(AttributeValue::Bool(*b)),
            _ => Err(mismatch()),
        }
    }
}

impl std::str::FromStr for FilterType {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(FilterType::S),
            "N" => Ok(FilterType::N),
            "B" => Ok(FilterType::B),
            "BOOL" => Ok(FilterType::Bool),
            other => Err(AwsError::validation(format!(
                "unknown filter type: {}",
                other
            ))),
        }
    }
}

/// Type of a Parameter Store parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterType {
    /// Plain string.
    #[default]
    String,
    /// Comma-separated list.
    StringList,
    /// KMS-encrypted string.
    SecureString,
}

impl ParameterType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::StringList => "StringList",
            ParameterType::SecureString => "SecureString",
        }
    }
}

/// How a Lambda function is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvocationType {
    /// Wait for the result.
    #[default]
    RequestResponse,
    /// Queue the event and return immediately.
    Event,
    /// Validate parameters and permissions only.
    DryRun,
}

impl InvocationType {
    /// Value of the `X-Amz-Invocation-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
            InvocationType::Event => "Event",
            InvocationType::DryRun => "DryRun",
        }
    }
}

/// Body of a queue message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Sent as-is.
    Text(String),
    /// Sent as the map's `Debug` rendering, not as JSON.
    ///
    /// Values print with their `serde_json` variant names, so
    /// `{"a": "x"}` goes out as `{"a": String("x")}`. Use
    /// [`crate::SqsService::send_json_message`] for a JSON body.
    Map(BTreeMap<String, Value>),
}

impl MessageBody {
    /// The string that goes on the wire.
    pub fn render(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Map(map) => format!("{:?}", map),
        }
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        MessageBody::Text(text.to_string())
    }
}

impl From<String> for MessageBody {
    fn from(text: String) -> Self {
        MessageBody::Text(text)
    }
}

impl From<BTreeMap<String, Value>> for MessageBody {
    fn from(map: BTreeMap<String, Value>) -> Self {
        MessageBody::Map(map)
    }
}
