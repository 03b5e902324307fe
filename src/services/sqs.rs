//! Queue facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::AwsConfig;
use crate::error::{AwsError, ResponseError};
use crate::types::{MessageBody, SendMessageOutput};
use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Facade over SQS queues.
#[derive(Debug)]
pub struct SqsService {
    client: ServiceClient,
}

impl SqsService {
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
            client: factory.from_snapshot(Service::Sqs, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Build a map message body from key/value pairs.
    pub fn create_message<K, V, I>(pairs: I) -> BTreeMap<String, Value>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }

    /// Resolve a queue name to its URL.
    #[instrument(skip(self))]
    pub async fn get_queue_url(&self, queue_name: &str) -> Result<String, AwsError> {
        let response = self
            .client
            .json_call("GetQueueUrl", &json!({ "QueueName": queue_name }))
            .await?;

        response["QueueUrl"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                AwsError::Response(ResponseError::MissingField {
                    field: "QueueUrl".to_string(),
                })
            })
    }

    /// Send a message to a queue by name.
    ///
    /// Text is sent as-is. A map is sent as its `Debug` rendering, which is
    /// not JSON; use [`SqsService::send_json_message`] for JSON.
    #[instrument(skip(self, body))]
    pub async fn send_message(
        &self,
        queue_name: &str,
        body: impl Into<MessageBody>,
    ) -> Result<SendMessageOutput, AwsError> {
        let rendered = body.into().render();
        self.send_raw(queue_name, rendered).await
    }

    /// Send a JSON-encoded message to a queue by name.
    #[instrument(skip(self, message))]
    pub async fn send_json_message<T: Serialize + ?Sized>(
        &self,
        queue_name: &str,
        message: &T,
    ) -> Result<SendMessageOutput, AwsError> {
        let rendered = serde_json::to_string(message)?;
        self.send_raw(queue_name, rendered).await
    }

    async fn send_raw(
        &self,
        queue_name: &str,
        body: String,
    ) -> Result<SendMessageOutput, AwsError> {
        if body.is_empty() {
            return Err(AwsError::validation("message body must not be empty"));
        }

        let queue_url = self.get_queue_url(queue_name).await?;

        let response = self
            .client
            .json_call(
                "SendMessage",
                &json!({
                    "QueueUrl": queue_url,
                    "MessageBody": body,
                }),
            )
            .await?;
        let output: SendMessageOutput = serde_json::from_value(response)?;

        let local = md5_hex(&body);
        if !output.md5_of_message_body.eq_ignore_ascii_case(&local) {
            return Err(AwsError::Response(ResponseError::ChecksumMismatch {
                expected: output.md5_of_message_body,
                actual: local,
            }));
        }

        debug!(message_id = %output.message_id, "Message sent");
        Ok(output)
    }
}

/// Hex MD5 of a message body, as SQS reports it.
pub(crate) fn md5_hex(body: &str) -> String {
    hex::encode(Md5::digest(body.as_bytes()))
}
