//! Function invoker facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::AwsConfig;
use crate::error::{parse_json_error, AwsError, ResponseError};
use crate::signing::uri_encode_query;
use crate::types::{InvocationType, InvokeOutput};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

const API_VERSION: &str = "2015-03-31";

/// Facade over Lambda invocations.
#[derive(Debug)]
pub struct LambdaService {
    client: ServiceClient,
}

impl LambdaService {
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
            client: factory.from_snapshot(Service::Lambda, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Invoke a function by name or ARN.
    ///
    /// A function that raised still returns `Ok`; check
    /// [`InvokeOutput::function_error`].
    #[instrument(skip(self, payload))]
    pub async fn invoke(
        &self,
        function_name: &str,
        invocation_type: InvocationType,
        payload: Option<Bytes>,
    ) -> Result<InvokeOutput, AwsError> {
        if function_name.is_empty() {
            return Err(AwsError::validation("function name must not be empty"));
        }

        let path = format!(
            "/{}/functions/{}/invocations",
            API_VERSION,
            uri_encode_query(function_name)
        );

        let mut headers = HashMap::new();
        headers.insert(
            "x-amz-invocation-type".to_string(),
            invocation_type.as_str().to_string(),
        );
        if payload.is_some() {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }

        let response = self.client.send("POST", &path, &[], headers, payload).await?;

        if !response.is_success() {
            return Err(parse_json_error("lambda", &response));
        }

        let header = |name: &str| response.get_header(name).map(String::from);
        let output = InvokeOutput {
            status_code: response.status,
            function_error: header("x-amz-function-error"),
            executed_version: header("x-amz-executed-version"),
            log_result: header("x-amz-log-result"),
            payload: response.body.clone(),
        };

        debug!(status = output.status_code, "Function invoked");
        Ok(output)
    }

    /// Invoke synchronously with a JSON payload and return the response text.
    #[instrument(skip(self, payload))]
    pub async fn invoke_json<T: Serialize + ?Sized>(
        &self,
        function_name: &str,
        payload: &T,
    ) -> Result<String, AwsError> {
        let body = Bytes::from(serde_json::to_vec(payload)?);
        let output = self
            .invoke(function_name, InvocationType::RequestResponse, Some(body))
            .await?;

        if let Some(function_error) = &output.function_error {
            warn!(function_error = %function_error, "Function returned an error");
        }

        String::from_utf8(output.payload.to_vec()).map_err(|e| {
            AwsError::Response(ResponseError::InvalidUtf8 {
                context: "function payload".to_string(),
                message: e.to_string(),
            })
        })
    }
}
