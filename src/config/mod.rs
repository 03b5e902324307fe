//! Configuration shared by every service facade.
//!
//! An [`AwsConfig`] is an ordinary value. Facades take a reference at
//! construction and copy what they need into a [`ConfigSnapshot`], so later
//! changes to the config never affect facades that already exist.

mod region;

pub use region::Region;

use crate::credentials::AwsCredentials;
use crate::error::AwsError;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Region, endpoint and credential settings for the facades.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    region: Option<Region>,
    endpoint_url: Option<Url>,
    access_key_id: Option<String>,
    secret_access_key: Option<SecretString>,
    session_token: Option<SecretString>,
    connect_timeout: Duration,
    read_timeout: Duration,
    verify_ssl: bool,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            verify_ssl: true,
        }
    }
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, AwsError> {
    if value.is_empty() {
        return Err(AwsError::validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

impl AwsConfig {
    /// Create an unconfigured value. A region must be set before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the standard AWS environment variables.
    ///
    /// Reads `AWS_REGION` (falling back to `AWS_DEFAULT_REGION`),
    /// `AWS_ENDPOINT_URL`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`. Invalid values are skipped with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        let region = std::env::var("AWS_REGION").or_else(|_| std::env::var("AWS_DEFAULT_REGION"));
        if let Ok(region) = region {
            if let Err(e) = config.set_region_name(&region) {
                warn!(region = %region, error = %e, "Ignoring region from environment");
            }
        }

        if let Ok(endpoint) = std::env::var("AWS_ENDPOINT_URL") {
            if let Err(e) = config.set_endpoint_url(&endpoint) {
                warn!(error = %e, "Ignoring AWS_ENDPOINT_URL");
            }
        }

        if let Ok(key) = std::env::var("AWS_ACCESS_KEY_ID") {
            if config.set_access_key_id(&key).is_err() {
                warn!("Ignoring empty AWS_ACCESS_KEY_ID");
            }
        }
        if let Ok(secret) = std::env::var("AWS_SECRET_ACCESS_KEY") {
            if config.set_secret_access_key(&secret).is_err() {
                warn!("Ignoring empty AWS_SECRET_ACCESS_KEY");
            }
        }
        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            if config.set_session_token(&token).is_err() {
                warn!("Ignoring empty AWS_SESSION_TOKEN");
            }
        }

        config
    }

    /// Set the region.
    pub fn set_region(&mut self, region: Region) -> Result<&mut Self, AwsError> {
        self.region = Some(region);
        Ok(self)
    }

    /// Set the region from its identifier, e.g. `eu-west-1`.
    pub fn set_region_name(&mut self, region: &str) -> Result<&mut Self, AwsError> {
        let region: Region = region.parse()?;
        self.set_region(region)
    }

    /// Point every service at a custom endpoint such as LocalStack.
    pub fn set_endpoint_url(&mut self, endpoint_url: &str) -> Result<&mut Self, AwsError> {
        let endpoint_url = non_empty("endpoint_url", endpoint_url)?;
        let url = Url::parse(endpoint_url).map_err(|e| {
            AwsError::validation(format!("invalid endpoint URL '{}': {}", endpoint_url, e))
        })?;
        if url.host_str().is_none() {
            return Err(AwsError::validation(format!(
                "endpoint URL '{}' has no host",
                endpoint_url
            )));
        }
        self.endpoint_url = Some(url);
        Ok(self)
    }

    /// Set a static access key ID.
    pub fn set_access_key_id(&mut self, access_key_id: &str) -> Result<&mut Self, AwsError> {
        self.access_key_id = Some(non_empty("access_key_id", access_key_id)?.to_string());
        Ok(self)
    }

    /// Set a static secret access key.
    pub fn set_secret_access_key(
        &mut self,
        secret_access_key: &str,
    ) -> Result<&mut Self, AwsError> {
        let secret = non_empty("secret_access_key", secret_access_key)?;
        self.secret_access_key = Some(SecretString::new(secret.to_string()));
        Ok(self)
    }

    /// Set a session token for temporary credentials.
    pub fn set_session_token(&mut self, session_token: &str) -> Result<&mut Self, AwsError> {
        let token = non_empty("session_token", session_token)?;
        self.session_token = Some(SecretString::new(token.to_string()));
        Ok(self)
    }

    /// Set the connection timeout.
    pub fn set_connect_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.read_timeout = timeout;
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn set_verify_ssl(&mut self, verify: bool) -> &mut Self {
        self.verify_ssl = verify;
        self
    }

    /// True once a region has been set.
    pub fn is_configured(&self) -> bool {
        self.region.is_some()
    }

    /// Configured region, if any.
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// Configured region identifier, if any.
    pub fn region_name(&self) -> Option<&'static str> {
        self.region.map(|r| r.as_str())
    }

    /// Endpoint override, if any.
    pub fn endpoint_url(&self) -> Option<&Url> {
        self.endpoint_url.as_ref()
    }

    /// Immutable copy of every setting.
    pub fn to_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            region: self.region,
            endpoint_url: self.endpoint_url.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            verify_ssl: self.verify_ssl,
        }
    }
}

/// Frozen view of an [`AwsConfig`].
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Region, if one was set.
    pub region: Option<Region>,
    /// Endpoint override.
    pub endpoint_url: Option<Url>,
    access_key_id: Option<String>,
    secret_access_key: Option<SecretString>,
    session_token: Option<SecretString>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Verify TLS certificates.
    pub verify_ssl: bool,
}

impl ConfigSnapshot {
    /// Static credentials, when both the key ID and secret were configured.
    pub fn static_credentials(&self) -> Option<AwsCredentials> {
        let access_key_id = self.access_key_id.as_ref()?;
        let secret = self.secret_access_key.as_ref()?.expose_secret();

        Some(match &self.session_token {
            Some(token) => {
                AwsCredentials::with_session_token(access_key_id, secret, token.expose_secret())
            }
            None => AwsCredentials::new(access_key_id, secret),
        })
    }
}
