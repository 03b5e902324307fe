//! Key-value table facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::AwsConfig;
use crate::error::AwsError;
use crate::types::{
    to_attribute_map, AttributeDefinition, AttributeMap, FilterType, GetItemOutput, Item,
    KeySchemaElement, ProvisionedThroughput, RawScanOutput, ScanOutput,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Facade over DynamoDB tables.
///
/// Items are plain JSON objects; the type-tagged wire format is handled here.
#[derive(Debug)]
pub struct DynamoDbService {
    client: ServiceClient,
}

impl DynamoDbService {
    /// Create the facade from a configured [`AwsConfig`].
    pub fn new(config: &AwsConfig) -> Result<Self, AwsError> {
        Self::with_factory(config, &ClientFactory::new())
    }

    /// Create the facade with a custom client factory.
    pub fn with_factory(config: &AwsConfig, factory: &ClientFactory) -> Result<Self, AwsError> {
        if !config.is_configured() {
            return Err(AwsError::MissingConfiguration);
        }
        Ok(Self {
            client: factory.from_snapshot(Service::DynamoDb, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Insert or fully replace an item.
    #[instrument(skip(self, item))]
    pub async fn put_item(&self, table: &str, item: &Item) -> Result<bool, AwsError> {
        self.client
            .json_call(
                "PutItem",
                &json!({
                    "TableName": table,
                    "Item": to_attribute_map(item),
                }),
            )
            .await?;
        Ok(true)
    }

    /// Raw `GetItem` response, type tags included.
    #[instrument(skip(self, key))]
    pub async fn get_record(&self, table: &str, key: &Item) -> Result<GetItemOutput, AwsError> {
        let (response, request_id) = self
            .client
            .json_call_with_request_id(
                "GetItem",
                &json!({
                    "TableName": table,
                    "Key": to_attribute_map(key),
                    "ReturnConsumedCapacity": "TOTAL",
                }),
            )
            .await?;

        let mut record: GetItemOutput = serde_json::from_value(response)?;
        record.request_id = request_id;
        Ok(record)
    }

    /// Fetch an item. `None` when no item has this key.
    #[instrument(skip(self, key))]
    pub async fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, AwsError> {
        let record = self.get_record(table, key).await?;
        Ok(record.plain_item())
    }

    /// Fetch one attribute of an item. `None` when the item or attribute is absent.
    #[instrument(skip(self, key))]
    pub async fn get_item_value(
        &self,
        table: &str,
        key: &Item,
        attribute: &str,
    ) -> Result<Option<Value>, AwsError> {
        let item = self.get_item(table, key).await?;
        Ok(item.and_then(|mut item| item.remove(attribute)))
    }

    /// True if an item with this key exists. Every error counts as absent.
    #[instrument(skip(self, key))]
    pub async fn key_exists(&self, table: &str, key: &Item) -> bool {
        match self.get_item(table, key).await {
            Ok(item) => item.is_some(),
            Err(e) => {
                debug!(error = %e, "Key check failed");
                false
            }
        }
    }

    /// Apply an update expression.
    ///
    /// The expression is sent verbatim; `expression_values` are type-tagged.
    #[instrument(skip(self, key, expression_values))]
    pub async fn update_item(
        &self,
        table: &str,
        key: &Item,
        update_expression: &str,
        expression_values: &Item,
    ) -> Result<bool, AwsError> {
        let mut input = json!({
            "TableName": table,
            "Key": to_attribute_map(key),
            "UpdateExpression": update_expression,
        });
        if !expression_values.is_empty() {
            input["ExpressionAttributeValues"] =
                serde_json::to_value(to_attribute_map(expression_values))?;
        }

        self.client.json_call("UpdateItem", &input).await?;
        Ok(true)
    }

    /// Delete an item. Deleting a missing key succeeds.
    #[instrument(skip(self, key))]
    pub async fn delete_item(&self, table: &str, key: &Item) -> Result<bool, AwsError> {
        self.client
            .json_call(
                "DeleteItem",
                &json!({
                    "TableName": table,
                    "Key": to_attribute_map(key),
                }),
            )
            .await?;
        Ok(true)
    }

    /// First scan page only (at most 1 MB of data).
    ///
    /// `last_evaluated_key` is set when more pages exist; see
    /// [`DynamoDbService::scan_all`].
    #[instrument(skip(self))]
    pub async fn scan_table(&self, table: &str) -> Result<ScanOutput, AwsError> {
        let raw = self.scan_raw(json!({ "TableName": table }), None).await?;
        Ok(raw.into())
    }

    /// Every item in the table, following `LastEvaluatedKey`.
    #[instrument(skip(self))]
    pub async fn scan_all(&self, table: &str) -> Result<Vec<Item>, AwsError> {
        self.scan_pages(json!({ "TableName": table })).await
    }

    /// Items whose `attribute` equals `value`, across every page.
    ///
    /// `value` is tagged with `attribute_type` before it is sent.
    #[instrument(skip(self, value))]
    pub async fn scan_filter_elements(
        &self,
        table: &str,
        attribute: &str,
        value: &Value,
        attribute_type: FilterType,
    ) -> Result<Vec<Item>, AwsError> {
        let tagged = attribute_type.attribute_value(value)?;

        let input = json!({
            "TableName": table,
            "FilterExpression": "#attr = :value",
            "ExpressionAttributeNames": { "#attr": attribute },
            "ExpressionAttributeValues": { ":value": tagged },
        });

        self.scan_pages(input).await
    }

    /// Create a table with provisioned throughput.
    #[instrument(skip(self, key_schema, attribute_definitions))]
    pub async fn create_table(
        &self,
        table: &str,
        key_schema: &[KeySchemaElement],
        attribute_definitions: &[AttributeDefinition],
        throughput: ProvisionedThroughput,
    ) -> Result<bool, AwsError> {
        if key_schema.is_empty() {
            return Err(AwsError::validation("key schema must not be empty"));
        }

        self.client
            .json_call(
                "CreateTable",
                &json!({
                    "TableName": table,
                    "KeySchema": key_schema,
                    "AttributeDefinitions": attribute_definitions,
                    "ProvisionedThroughput": throughput,
                }),
            )
            .await?;
        Ok(true)
    }

    /// Delete a table.
    #[instrument(skip(self))]
    pub async fn delete_table(&self, table: &str) -> Result<bool, AwsError> {
        self.client
            .json_call("DeleteTable", &json!({ "TableName": table }))
            .await?;
        Ok(true)
    }

    async fn scan_raw(
        &self,
        mut input: Value,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawScanOutput, AwsError> {
        if let Some(start) = exclusive_start_key {
            input["ExclusiveStartKey"] = serde_json::to_value(start)?;
        }
        let response = self.client.json_call("Scan", &input).await?;
        Ok(serde_json::from_value(response)?)
    }

    async fn scan_pages(&self, input: Value) -> Result<Vec<Item>, AwsError> {
        let mut items = Vec::new();
        let mut start_key: Option<AttributeMap> = None;
        let mut pages = 0usize;

        loop {
            let mut raw = self.scan_raw(input.clone(), start_key.take()).await?;
            pages += 1;
            start_key = raw.last_evaluated_key.take();
            items.extend(ScanOutput::from(raw).items);

            if start_key.is_none() {
                break;
            }
        }

        debug!(pages, count = items.len(), "Scan complete");
        Ok(items)
    }
}
