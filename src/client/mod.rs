//! Service clients and the factory that builds them.
//!
//! A [`ServiceClient`] bundles the resolved endpoint, a SigV4 signer scoped to
//! one service and region, and the HTTP transport. Facades own exactly one.

use crate::config::{ConfigSnapshot, Region, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use crate::credentials::{
    AwsCredentials, ChainCredentialsProvider, CredentialsProvider, StaticCredentialsProvider,
};
use crate::error::{parse_json_error, AwsError, SigningError};
use crate::signing::{uri_encode_query, AwsSigner, AwsSignerV4};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// AWS services the facades talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Simple Storage Service.
    S3,
    /// DynamoDB.
    DynamoDb,
    /// Simple Queue Service.
    Sqs,
    /// Systems Manager (Parameter Store).
    Ssm,
    /// Secrets Manager.
    SecretsManager,
    /// Lambda.
    Lambda,
}

/// Target prefix and content-type version of an AWS JSON-protocol service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonProtocol {
    /// Prepended to the operation in `x-amz-target`.
    pub target_prefix: &'static str,
    /// `1.0` or `1.1`.
    pub version: &'static str,
}

impl Service {
    /// Name used in the SigV4 credential scope.
    pub fn signing_name(&self) -> &'static str {
        match self {
            Service::S3 => "s3",
            Service::DynamoDb => "dynamodb",
            Service::Sqs => "sqs",
            Service::Ssm => "ssm",
            Service::SecretsManager => "secretsmanager",
            Service::Lambda => "lambda",
        }
    }

    /// Leftmost label of the service hostname.
    pub fn endpoint_prefix(&self) -> &'static str {
        self.signing_name()
    }

    /// JSON protocol details, for services that speak it.
    pub fn json_protocol(&self) -> Option<JsonProtocol> {
        let (target_prefix, version) = match self {
            Service::DynamoDb => ("DynamoDB_20120810", "1.0"),
            Service::Sqs => ("AmazonSQS", "1.0"),
            Service::Ssm => ("AmazonSSM", "1.1"),
            Service::SecretsManager => ("secretsmanager", "1.1"),
            Service::S3 | Service::Lambda => return None,
        };
        Some(JsonProtocol {
            target_prefix,
            version,
        })
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signing_name())
    }
}

/// Builds [`ServiceClient`]s.
///
/// By default every client gets its own pooled `reqwest` transport. Tests
/// inject a shared transport with [`ClientFactory::with_transport`].
#[derive(Clone)]
pub struct ClientFactory {
    transport: Option<Arc<dyn HttpTransport>>,
    connect_timeout: Duration,
    read_timeout: Duration,
    verify_ssl: bool,
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self {
            transport: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            verify_ssl: true,
        }
    }
}

impl ClientFactory {
    /// Factory that creates a `reqwest` transport per client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose clients all share the given transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport: Some(transport),
            ..Self::default()
        }
    }

    /// Connect timeout for transports this factory creates.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Read timeout for transports this factory creates.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Whether created transports verify TLS certificates.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Client for a regional endpoint.
    ///
    /// An explicit endpoint wins over `https://{prefix}.{region}.amazonaws.com`.
    /// Explicit credentials win over the environment/profile chain.
    pub fn get_client(
        &self,
        service: Service,
        region: Region,
        endpoint: Option<&Url>,
        credentials: Option<AwsCredentials>,
    ) -> Result<ServiceClient, AwsError> {
        let default_endpoint = format!(
            "https://{}.{}.amazonaws.com",
            service.endpoint_prefix(),
            region
        );
        self.build(
            service,
            region.as_str(),
            endpoint,
            &default_endpoint,
            credentials,
            self.connect_timeout,
            self.read_timeout,
            self.verify_ssl,
        )
    }

    /// Client for the partition-global endpoint `https://{prefix}.amazonaws.com`,
    /// signed for `us-east-1`.
    pub fn get_global_client(
        &self,
        service: Service,
        endpoint: Option<&Url>,
        credentials: Option<AwsCredentials>,
    ) -> Result<ServiceClient, AwsError> {
        let default_endpoint = format!("https://{}.amazonaws.com", service.endpoint_prefix());
        self.build(
            service,
            Region::UsEast1.as_str(),
            endpoint,
            &default_endpoint,
            credentials,
            self.connect_timeout,
            self.read_timeout,
            self.verify_ssl,
        )
    }

    /// Client configured from a config snapshot.
    ///
    /// Fails with [`AwsError::MissingConfiguration`] when no region was set.
    pub fn from_snapshot(
        &self,
        service: Service,
        snapshot: &ConfigSnapshot,
    ) -> Result<ServiceClient, AwsError> {
        let region = snapshot.region.ok_or(AwsError::MissingConfiguration)?;
        let default_endpoint = format!(
            "https://{}.{}.amazonaws.com",
            service.endpoint_prefix(),
            region
        );
        self.build(
            service,
            region.as_str(),
            snapshot.endpoint_url.as_ref(),
            &default_endpoint,
            snapshot.static_credentials(),
            snapshot.connect_timeout,
            snapshot.read_timeout,
            snapshot.verify_ssl,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        service: Service,
        region: &str,
        endpoint: Option<&Url>,
        default_endpoint: &str,
        credentials: Option<AwsCredentials>,
        connect_timeout: Duration,
        read_timeout: Duration,
        verify_ssl: bool,
    ) -> Result<ServiceClient, AwsError> {
        let (endpoint, custom_endpoint) = match endpoint {
            Some(url) => (url.clone(), true),
            None => (
                Url::parse(default_endpoint).map_err(|e| {
                    AwsError::validation(format!("invalid endpoint {}: {}", default_endpoint, e))
                })?,
                false,
            ),
        };

        let credentials_provider: Arc<dyn CredentialsProvider> = match credentials {
            Some(creds) => Arc::new(StaticCredentialsProvider::new(creds)),
            None => Arc::new(ChainCredentialsProvider::new()),
        };

        let transport: Arc<dyn HttpTransport> = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(
                ReqwestTransport::builder()
                    .connect_timeout(connect_timeout)
                    .read_timeout(read_timeout)
                    .verify_ssl(verify_ssl)
                    .build()?,
            ),
        };

        debug!(
            service = %service,
            region,
            endpoint = %endpoint,
            credentials = credentials_provider.name(),
            "Created service client"
        );

        Ok(ServiceClient {
            service,
            region: region.to_string(),
            endpoint,
            path_style: custom_endpoint,
            signer: Arc::new(AwsSignerV4::new(
                credentials_provider,
                region,
                service.signing_name(),
            )),
            transport,
        })
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("custom_transport", &self.transport.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// A connected, signing client for one service.
pub struct ServiceClient {
    service: Service,
    region: String,
    endpoint: Url,
    path_style: bool,
    signer: Arc<dyn AwsSigner>,
    transport: Arc<dyn HttpTransport>,
}

impl ServiceClient {
    /// Service this client talks to.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Region requests are signed for.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Base endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// True when the endpoint was overridden, so S3 buckets go in the path.
    pub fn uses_path_style(&self) -> bool {
        self.path_style
    }

    /// Join an already-encoded path and raw query pairs onto a base URL.
    pub(crate) fn build_url(
        base: &Url,
        encoded_path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, AwsError> {
        let mut url = base.clone();

        let base_path = base.path().trim_end_matches('/');
        let path = encoded_path.trim_start_matches('/');
        url.set_path(&format!("{}/{}", base_path, path));

        let query_string = query
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    uri_encode_query(k)
                } else {
                    format!("{}={}", uri_encode_query(k), uri_encode_query(v))
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(if query_string.is_empty() {
            None
        } else {
            Some(&query_string)
        });

        if url.host_str().is_none() {
            return Err(SigningError::InvalidUrl {
                message: url.to_string(),
            }
            .into());
        }
        Ok(url)
    }

    /// Sign and send a REST request to a path under the endpoint.
    ///
    /// `path` must already be percent-encoded. The response is returned
    /// whatever its status.
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<HttpResponse, AwsError> {
        let url = Self::build_url(&self.endpoint, path, query)?;
        self.send_to(method, &url, headers, body).await
    }

    /// Sign and send a request to an absolute URL.
    pub async fn send_to(
        &self,
        method: &str,
        url: &Url,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<HttpResponse, AwsError> {
        let signed = self.signer.sign(method, url, &headers, body).await?;

        debug!(service = %self.service, method, url = %signed.url, "Sending request");

        let mut request =
            HttpRequest::new(signed.method, signed.url.as_str()).with_headers(signed.headers);
        if let Some(body) = signed.body {
            request = request.with_body(body);
        }

        let response = self.transport.send(request).await?;

        debug!(
            service = %self.service,
            status = response.status,
            request_id = response.request_id().unwrap_or("-"),
            "Received response"
        );

        Ok(response)
    }

    /// Call an AWS JSON-protocol operation and return the decoded response.
    ///
    /// Error responses become [`AwsError::Service`]. An empty success body
    /// decodes to an empty object.
    pub async fn json_call<T: Serialize + ?Sized>(
        &self,
        operation: &str,
        input: &T,
    ) -> Result<Value, AwsError> {
        let (output, _) = self.json_call_with_request_id(operation, input).await?;
        Ok(output)
    }

    /// [`ServiceClient::json_call`], also returning the AWS request ID.
    pub async fn json_call_with_request_id<T: Serialize + ?Sized>(
        &self,
        operation: &str,
        input: &T,
    ) -> Result<(Value, Option<String>), AwsError> {
        let protocol = self.service.json_protocol().ok_or_else(|| {
            AwsError::validation(format!(
                "{} does not use the AWS JSON protocol",
                self.service
            ))
        })?;

        let body = serde_json::to_vec(input)?;

        let mut headers = HashMap::new();
        headers.insert(
            "x-amz-target".to_string(),
            format!("{}.{}", protocol.target_prefix, operation),
        );
        headers.insert(
            "content-type".to_string(),
            format!("application/x-amz-json-{}", protocol.version),
        );

        debug!(service = %self.service, operation, "Calling JSON operation");

        let response = self
            .send("POST", "/", &[], headers, Some(Bytes::from(body)))
            .await?;

        if !response.is_success() {
            return Err(parse_json_error(self.service.signing_name(), &response));
        }

        let request_id = response.request_id().map(String::from);
        if response.body.is_empty() {
            return Ok((Value::Object(Default::default()), request_id));
        }
        Ok((serde_json::from_slice(&response.body)?, request_id))
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint.as_str())
            .field("path_style", &self.path_style)
            .finish_non_exhaustive()
    }
}
