//! Fallback chain used when the configuration carries no key pair.

use super::{
    AwsCredentials, CredentialsProvider, EnvCredentialsProvider, ProfileCredentialsProvider,
};
use crate::error::{AwsError, CredentialsError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// Tries each source in order and keeps the first credentials found.
///
/// The default chain is the environment followed by the shared credentials
/// file. The first hit is memoized until [`CredentialsProvider::refresh_credentials`]
/// is called.
pub struct ChainCredentialsProvider {
    providers: Vec<Arc<dyn CredentialsProvider>>,
    resolved: RwLock<Option<Resolved>>,
}

struct Resolved {
    credentials: AwsCredentials,
    source: &'static str,
}

impl ChainCredentialsProvider {
    /// Environment, then `~/.aws/credentials`.
    pub fn new() -> Self {
        Self::with_providers(vec![
            Arc::new(EnvCredentialsProvider::new()),
            Arc::new(ProfileCredentialsProvider::new()),
        ])
    }

    /// A chain over the given sources, tried in order.
    pub fn with_providers(providers: Vec<Arc<dyn CredentialsProvider>>) -> Self {
        Self {
            providers,
            resolved: RwLock::new(None),
        }
    }

    async fn resolve(&self) -> Result<(AwsCredentials, &'static str), AwsError> {
        let mut last_error: Option<AwsError> = None;

        for provider in &self.providers {
            let name = provider.name();
            trace!(source = name, "trying credentials source");

            match provider.get_credentials().await {
                Ok(creds) => {
                    debug!(source = name, "credentials resolved");
                    return Ok((creds, name));
                }
                Err(e) => {
                    trace!(source = name, error = %e, "credentials source skipped");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(AwsError::Credentials(CredentialsError::NotFound)))
    }
}

impl Default for ChainCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsProvider for ChainCredentialsProvider {
    async fn get_credentials(&self) -> Result<AwsCredentials, AwsError> {
        {
            let resolved = self.resolved.read();
            if let Some(resolved) = resolved.as_ref() {
                trace!(source = resolved.source, "using memoized credentials");
                return Ok(resolved.credentials.clone());
            }
        }

        let (credentials, source) = self.resolve().await?;

        *self.resolved.write() = Some(Resolved {
            credentials: credentials.clone(),
            source,
        });

        Ok(credentials)
    }

    async fn refresh_credentials(&self) -> Result<AwsCredentials, AwsError> {
        *self.resolved.write() = None;
        self.get_credentials().await
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

impl std::fmt::Debug for ChainCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCredentialsProvider")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "resolved_from",
                &self.resolved.read().as_ref().map(|r| r.source),
            )
            .finish()
    }
}
