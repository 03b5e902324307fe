//! Response types returned by the facades.

use super::attribute::{from_attribute_map, AttributeMap, Item};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// Raw `GetItem` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemOutput {
    /// The item with type tags, if the key matched.
    pub item: Option<AttributeMap>,
    /// Capacity consumed, when requested.
    pub consumed_capacity: Option<Value>,
    /// AWS request ID.
    #[serde(skip)]
    pub request_id: Option<String>,
}

impl GetItemOutput {
    /// The item with type tags stripped.
    pub fn plain_item(&self) -> Option<Item> {
        self.item.as_ref().map(from_attribute_map)
    }
}

/// One page of a table scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    /// Items on this page, type tags stripped.
    pub items: Vec<Item>,
    /// Items returned after filtering.
    pub count: i64,
    /// Items evaluated before filtering.
    pub scanned_count: i64,
    /// Where the next page starts; `None` on the last page.
    pub last_evaluated_key: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawScanOutput {
    #[serde(default)]
    pub items: Vec<AttributeMap>,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub scanned_count: i64,
    pub last_evaluated_key: Option<AttributeMap>,
}

impl From<RawScanOutput> for ScanOutput {
    fn from(raw: RawScanOutput) -> Self {
        Self {
            items: raw.items.iter().map(from_attribute_map).collect(),
            count: raw.count,
            scanned_count: raw.scanned_count,
            last_evaluated_key: raw.last_evaluated_key.as_ref().map(from_attribute_map),
        }
    }
}

/// Result of sending a queue message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageOutput {
    /// Message ID assigned by the queue.
    pub message_id: String,
    /// MD5 of the body as received by the queue.
    #[serde(rename = "MD5OfMessageBody")]
    pub md5_of_message_body: String,
    /// Sequence number, FIFO queues only.
    pub sequence_number: Option<String>,
}

/// Summary of a secret from `ListSecrets`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretListEntry {
    /// Secret ARN.
    #[serde(rename = "ARN")]
    pub arn: String,
    /// Secret name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Last change, seconds since the epoch.
    pub last_changed_date: Option<f64>,
    /// Scheduled deletion, seconds since the epoch.
    pub deleted_date: Option<f64>,
}

/// Result of a Lambda invocation.
#[derive(Debug, Clone)]
pub struct InvokeOutput {
    /// HTTP status: 200 for `RequestResponse`, 202 for `Event`, 204 for `DryRun`.
    pub status_code: u16,
    /// Function response.
    pub payload: Bytes,
    /// Set when the function raised an error.
    pub function_error: Option<String>,
    /// Version that ran.
    pub executed_version: Option<String>,
    /// Base64 tail of the execution log, when requested.
    pub log_result: Option<String>,
}
