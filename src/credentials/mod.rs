//! AWS credentials management.
//!
//! Static credentials from [`crate::config::AwsConfig`] win when present.
//! Otherwise the default chain tries environment variables, then the shared
//! credentials file.

mod chain;
mod env;
mod profile;

pub use chain::ChainCredentialsProvider;
pub use env::EnvCredentialsProvider;
pub use profile::ProfileCredentialsProvider;

use crate::error::AwsError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// A key pair plus an optional session token, as read from the facade
/// configuration, the environment or a credentials file.
#[derive(Clone)]
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl AwsCredentials {
    /// Credentials from a plain key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::new(secret_access_key.into()),
            session_token: None,
        }
    }

    /// Credentials from a key pair and the session token issued with it.
    pub fn with_session_token(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::new(secret_access_key.into()),
            session_token: Some(SecretString::new(session_token.into())),
        }
    }

    /// The access key ID. Safe to log.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key, exposed for signing only.
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    /// The session token, sent as `x-amz-security-token` when present.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Whether a session token accompanies the key pair.
    pub fn is_temporary(&self) -> bool {
        self.session_token.is_some()
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A source of credentials consulted by the signer on every request.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load credentials from this source.
    async fn get_credentials(&self) -> Result<AwsCredentials, AwsError>;

    /// Load credentials again, bypassing any memoized value.
    async fn refresh_credentials(&self) -> Result<AwsCredentials, AwsError> {
        self.get_credentials().await
    }

    /// Short source name used in log lines.
    fn name(&self) -> &'static str;
}

/// Credentials taken from an [`crate::config::AwsConfig`] that has both keys set.
pub struct StaticCredentialsProvider {
    credentials: AwsCredentials,
}

impl StaticCredentialsProvider {
    /// Wrap fixed credentials.
    pub fn new(credentials: AwsCredentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn get_credentials(&self) -> Result<AwsCredentials, AwsError> {
        Ok(self.credentials.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

impl fmt::Debug for StaticCredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialsProvider")
            .field("credentials", &self.credentials)
            .finish()
    }
}
