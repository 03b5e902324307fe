//! Shared credentials file provider.

use super::{AwsCredentials, CredentialsProvider};
use crate::error::{AwsError, CredentialsError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fs};

/// Default profile name.
pub const DEFAULT_PROFILE: &str = "default";

/// AWS profile name environment variable.
pub const AWS_PROFILE: &str = "AWS_PROFILE";

/// AWS credentials file environment variable.
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";

type Profiles = HashMap<String, HashMap<String, String>>;

/// Credentials provider that reads `~/.aws/credentials`.
///
/// The file location can be overridden with `AWS_SHARED_CREDENTIALS_FILE` and
/// the profile with `AWS_PROFILE`.
#[derive(Debug, Clone)]
pub struct ProfileCredentialsProvider {
    profile_name: String,
    credentials_file: Option<PathBuf>,
}

impl ProfileCredentialsProvider {
    /// Create a new provider using `AWS_PROFILE` or the default profile.
    pub fn new() -> Self {
        let profile = env::var(AWS_PROFILE).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
        Self {
            profile_name: profile,
            credentials_file: None,
        }
    }

    /// Create a provider for a specific profile.
    pub fn with_profile(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            credentials_file: None,
        }
    }

    /// Read from a specific credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    fn credentials_file_path(&self) -> Result<PathBuf, AwsError> {
        if let Some(path) = &self.credentials_file {
            return Ok(path.clone());
        }

        if let Ok(path) = env::var(AWS_SHARED_CREDENTIALS_FILE) {
            return Ok(PathBuf::from(path));
        }

        dirs::home_dir()
            .map(|home| home.join(".aws").join("credentials"))
            .ok_or_else(|| {
                AwsError::Credentials(CredentialsError::ProfileError {
                    message: "cannot locate home directory".to_string(),
                })
            })
    }

    fn parse_credentials_file(content: &str) -> Profiles {
        let mut profiles: Profiles = HashMap::new();
        let mut current_profile: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let profile_name = line[1..line.len() - 1].trim();
                let profile_name = profile_name
                    .strip_prefix("profile ")
                    .unwrap_or(profile_name);
                current_profile = Some(profile_name.to_string());
                profiles.entry(profile_name.to_string()).or_default();
                continue;
            }

            if let (Some(profile), Some((key, value))) = (&current_profile, line.split_once('=')) {
                profiles
                    .entry(profile.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        profiles
    }

    fn profile_error(message: String) -> AwsError {
        AwsError::Credentials(CredentialsError::ProfileError { message })
    }
}

impl Default for ProfileCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsProvider for ProfileCredentialsProvider {
    async fn get_credentials(&self) -> Result<AwsCredentials, AwsError> {
        let path = self.credentials_file_path()?;

        let content = fs::read_to_string(&path).map_err(|e| {
            Self::profile_error(format!(
                "Failed to read credentials file at {:?}: {}",
                path, e
            ))
        })?;

        let profiles = Self::parse_credentials_file(&content);

        let profile = profiles.get(&self.profile_name).ok_or_else(|| {
            Self::profile_error(format!(
                "Profile '{}' not found in credentials file",
                self.profile_name
            ))
        })?;

        let access_key_id = profile.get("aws_access_key_id").ok_or_else(|| {
            Self::profile_error(format!(
                "aws_access_key_id not found in profile '{}'",
                self.profile_name
            ))
        })?;

        let secret_access_key = profile.get("aws_secret_access_key").ok_or_else(|| {
            Self::profile_error(format!(
                "aws_secret_access_key not found in profile '{}'",
                self.profile_name
            ))
        })?;

        let credentials = match profile.get("aws_session_token") {
            Some(token) => {
                AwsCredentials::with_session_token(access_key_id, secret_access_key, token)
            }
            None => AwsCredentials::new(access_key_id, secret_access_key),
        };

        Ok(credentials)
    }

    fn name(&self) -> &'static str {
        "profile"
    }
}
