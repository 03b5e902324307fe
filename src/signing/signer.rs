//! AWS Signature V4 signer.

use super::canonical::build_canonical_uri;
use super::*;
use crate::credentials::CredentialsProvider;
use crate::error::AwsError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// A signed request ready to be sent.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: String,
    /// Full URL including query string.
    pub url: Url,
    /// Headers to send, including `authorization`.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

/// Signs outgoing requests.
#[async_trait]
pub trait AwsSigner: Send + Sync {
    /// Sign a request with AWS Signature V4.
    async fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<SignedRequest, AwsError>;
}

/// Signature V4 signer bound to one region and service.
pub struct AwsSignerV4 {
    credentials_provider: Arc<dyn CredentialsProvider>,
    region: String,
    service: String,
}

impl AwsSignerV4 {
    /// Create a signer for a region and service signing name.
    pub fn new(
        credentials_provider: Arc<dyn CredentialsProvider>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials_provider,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Region the signer scopes signatures to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service signing name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn host_header(url: &Url) -> String {
        let host = url.host_str().unwrap_or_default();
        match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

#[async_trait]
impl AwsSigner for AwsSignerV4 {
    async fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<SignedRequest, AwsError> {
        if url.host_str().is_none() {
            return Err(SigningError::InvalidUrl {
                message: format!("{} has no host", url),
            }
            .into());
        }

        let credentials = self.credentials_provider.get_credentials().await?;
        let timestamp = Utc::now();
        let payload_hash = sha256_hex(body.as_deref().unwrap_or_default());

        let mut final_headers: HashMap<String, String> = headers
            .iter()
            .filter(|(name, _)| {
                let name = name.to_lowercase();
                name != "host" && name != "x-amz-date" && name != "x-amz-content-sha256"
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        final_headers.insert("host".to_string(), Self::host_header(url));
        final_headers.insert("x-amz-date".to_string(), format_datetime(&timestamp));
        final_headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());

        if let Some(token) = credentials.session_token() {
            final_headers.insert("x-amz-security-token".to_string(), token.to_string());
        }

        let signing_headers: Vec<(String, String)> = final_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let canonical_uri = build_canonical_uri(url.path(), self.service != "s3");
        let scope = SigningScope {
            region: &self.region,
            service: &self.service,
        };

        let authorization = sign_request(
            method,
            &canonical_uri,
            url.query().unwrap_or(""),
            &signing_headers,
            &payload_hash,
            &credentials,
            scope,
            &timestamp,
        )?;

        final_headers.insert("authorization".to_string(), authorization);

        Ok(SignedRequest {
            method: method.to_string(),
            url: url.clone(),
            headers: final_headers,
            body,
        })
    }
}

impl std::fmt::Debug for AwsSignerV4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSignerV4")
            .field("credentials_provider", &self.credentials_provider.name())
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}
