//! Environment variable credentials provider.

use super::{AwsCredentials, CredentialsProvider};
use crate::error::{AwsError, CredentialsError};
use async_trait::async_trait;
use std::env;

/// Access key ID variable.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Secret access key variable.
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Session token variable.
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Credentials provider that reads from environment variables.
///
/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
/// `AWS_SESSION_TOKEN`, unless custom variable names are supplied.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialsProvider {
    access_key_var: Option<String>,
    secret_key_var: Option<String>,
    session_token_var: Option<String>,
}

impl EnvCredentialsProvider {
    /// Create a new environment credentials provider with default variable names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with custom variable names.
    pub fn with_vars(
        access_key_var: impl Into<String>,
        secret_key_var: impl Into<String>,
        session_token_var: Option<String>,
    ) -> Self {
        Self {
            access_key_var: Some(access_key_var.into()),
            secret_key_var: Some(secret_key_var.into()),
            session_token_var,
        }
    }

    fn access_key_var(&self) -> &str {
        self.access_key_var.as_deref().unwrap_or(AWS_ACCESS_KEY_ID)
    }

    fn secret_key_var(&self) -> &str {
        self.secret_key_var
            .as_deref()
            .unwrap_or(AWS_SECRET_ACCESS_KEY)
    }

    fn session_token_var(&self) -> &str {
        self.session_token_var
            .as_deref()
            .unwrap_or(AWS_SESSION_TOKEN)
    }
}

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn get_credentials(&self) -> Result<AwsCredentials, AwsError> {
        let access_key_id = env::var(self.access_key_var())
            .map_err(|_| AwsError::Credentials(CredentialsError::NotFound))?;

        if access_key_id.is_empty() {
            return Err(AwsError::Credentials(CredentialsError::Invalid {
                message: format!("{} is empty", self.access_key_var()),
            }));
        }

        let secret_access_key = env::var(self.secret_key_var())
            .map_err(|_| AwsError::Credentials(CredentialsError::NotFound))?;

        if secret_access_key.is_empty() {
            return Err(AwsError::Credentials(CredentialsError::Invalid {
                message: format!("{} is empty", self.secret_key_var()),
            }));
        }

        let session_token = env::var(self.session_token_var())
            .ok()
            .filter(|s| !s.is_empty());

        let credentials = match session_token {
            Some(token) => {
                AwsCredentials::with_session_token(access_key_id, secret_access_key, token)
            }
            None => AwsCredentials::new(access_key_id, secret_access_key),
        };

        Ok(credentials)
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}
