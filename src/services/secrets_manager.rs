//! Secrets Manager facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::AwsConfig;
use crate::error::{AwsError, ResponseError};
use crate::types::SecretListEntry;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListSecretsOutput {
    #[serde(default)]
    secret_list: Vec<SecretListEntry>,
    next_token: Option<String>,
}

/// Facade over Secrets Manager.
///
/// Secret values are never logged.
#[derive(Debug)]
pub struct SecretsManagerService {
    client: ServiceClient,
}

impl SecretsManagerService {
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
            client: factory.from_snapshot(Service::SecretsManager, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Create a string secret.
    #[instrument(skip(self, secret))]
    pub async fn create_secret(&self, name: &str, secret: SecretString) -> Result<bool, AwsError> {
        self.client
            .json_call(
                "CreateSecret",
                &json!({
                    "Name": name,
                    "SecretString": secret.expose_secret(),
                }),
            )
            .await?;
        Ok(true)
    }

    /// Create a binary secret.
    #[instrument(skip(self, secret))]
    pub async fn create_binary_secret(&self, name: &str, secret: &[u8]) -> Result<bool, AwsError> {
        self.client
            .json_call(
                "CreateSecret",
                &json!({
                    "Name": name,
                    "SecretBinary": STANDARD.encode(secret),
                }),
            )
            .await?;
        Ok(true)
    }

    /// String value of a secret, by name or ARN.
    #[instrument(skip(self))]
    pub async fn get_secret_value(&self, secret_id: &str) -> Result<String, AwsError> {
        let response = self.fetch_secret(secret_id).await?;
        response["SecretString"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| missing_field("SecretString"))
    }

    /// Binary value of a secret, by name or ARN.
    #[instrument(skip(self))]
    pub async fn get_binary_secret_value(&self, secret_id: &str) -> Result<Vec<u8>, AwsError> {
        let response = self.fetch_secret(secret_id).await?;
        let encoded = response["SecretBinary"]
            .as_str()
            .ok_or_else(|| missing_field("SecretBinary"))?;

        STANDARD.decode(encoded).map_err(|e| {
            AwsError::Response(ResponseError::InvalidResponse {
                message: format!("SecretBinary is not valid base64: {}", e),
            })
        })
    }

    /// ARN of a secret, looked up by name.
    #[instrument(skip(self))]
    pub async fn get_secret_id_by_name(&self, name: &str) -> Result<String, AwsError> {
        let response = self.fetch_secret(name).await?;
        response["ARN"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| missing_field("ARN"))
    }

    /// Name of a secret, looked up by ARN.
    #[instrument(skip(self))]
    pub async fn get_secret_name_by_id(&self, secret_id: &str) -> Result<String, AwsError> {
        let response = self
            .client
            .json_call("DescribeSecret", &json!({ "SecretId": secret_id }))
            .await?;
        response["Name"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| missing_field("Name"))
    }

    /// Schedule a secret for deletion after the default recovery window.
    #[instrument(skip(self))]
    pub async fn delete_secret(&self, secret_id: &str) -> Result<bool, AwsError> {
        self.client
            .json_call("DeleteSecret", &json!({ "SecretId": secret_id }))
            .await?;
        Ok(true)
    }

    /// Delete a secret immediately, with no recovery window.
    #[instrument(skip(self))]
    pub async fn force_delete_secret(&self, secret_id: &str) -> Result<bool, AwsError> {
        self.client
            .json_call(
                "DeleteSecret",
                &json!({
                    "SecretId": secret_id,
                    "ForceDeleteWithoutRecovery": true,
                }),
            )
            .await?;
        Ok(true)
    }

    /// First page of secrets in the account.
    #[instrument(skip(self))]
    pub async fn list_secrets(&self) -> Result<Vec<SecretListEntry>, AwsError> {
        let page = self.list_page(None).await?;
        Ok(page.secret_list)
    }

    /// Every secret in the account, following `NextToken`.
    #[instrument(skip(self))]
    pub async fn list_all_secrets(&self) -> Result<Vec<SecretListEntry>, AwsError> {
        let mut secrets = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page(token.take()).await?;
            secrets.extend(page.secret_list);
            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        debug!(count = secrets.len(), "Listed secrets");
        Ok(secrets)
    }

    async fn list_page(&self, next_token: Option<String>) -> Result<ListSecretsOutput, AwsError> {
        let mut input = json!({});
        if let Some(token) = next_token {
            input["NextToken"] = Value::String(token);
        }
        let response = self.client.json_call("ListSecrets", &input).await?;
        Ok(serde_json::from_value(response)?)
    }

    async fn fetch_secret(&self, secret_id: &str) -> Result<Value, AwsError> {
        self.client
            .json_call("GetSecretValue", &json!({ "SecretId": secret_id }))
            .await
    }
}

fn missing_field(field: &str) -> AwsError {
    AwsError::Response(ResponseError::MissingField {
        field: field.to_string(),
    })
}
