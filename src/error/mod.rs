//! Error types for the AWS facade.
//!
//! Every remote failure surfaces as [`AwsError`]. Callers that only care about
//! the broad category of a failure use [`AwsError::kind`], which collapses the
//! service-specific error codes into a closed [`ErrorKind`].

mod mapping;

pub use mapping::{classify_error_code, classify_status, normalize_error_code};

pub(crate) use mapping::{parse_json_error, service_error};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for the facade.
#[derive(Debug, Error)]
pub enum AwsError {
    /// A facade was constructed before a region was configured.
    #[error("Missing configuration: a region must be set before constructing a service")]
    MissingConfiguration,

    /// Invalid configuration or request input.
    #[error("Validation error: {message}")]
    Validation {
        /// Details about the validation error.
        message: String,
    },

    /// Credential-related errors.
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// AWS signing errors.
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Network and transport errors.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The service answered with an error response.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// The service answered with something we could not interpret.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl AwsError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AwsError::Validation {
            message: message.into(),
        }
    }

    /// Broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AwsError::Service(e) => e.kind,
            AwsError::Network(_) => ErrorKind::Transport,
            _ => ErrorKind::Unknown,
        }
    }

    /// Returns true if the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns the HTTP status code if the service answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AwsError::Service(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns the AWS error code if the service answered with one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AwsError::Service(e) => Some(e.code.as_str()),
            _ => None,
        }
    }

    /// Returns the AWS request ID if available.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            AwsError::Service(e) => e.request_id.as_deref(),
            _ => None,
        }
    }
}

/// Closed classification of remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The bucket, key, table, queue, parameter, secret or function does not exist.
    NotFound,
    /// Authentication or authorization was refused.
    AccessDenied,
    /// The service asked us to slow down.
    Throttled,
    /// The request never got a response.
    Transport,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Stable lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Throttled => "throttled",
            ErrorKind::Transport => "transport",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error response returned by an AWS service.
#[derive(Debug, Clone, Error)]
#[error("{service} returned {code} (HTTP {status}): {message}")]
pub struct ServiceError {
    /// Signing name of the service that failed (e.g. "dynamodb").
    pub service: &'static str,
    /// AWS error code with any namespace prefix removed.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// AWS request ID.
    pub request_id: Option<String>,
    /// Broad classification.
    pub kind: ErrorKind,
}

/// Credential-related errors.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// No credentials could be found.
    #[error("Credentials not found: no credentials could be loaded from any source")]
    NotFound,

    /// Credentials are invalid.
    #[error("Invalid credentials: {message}")]
    Invalid {
        /// Details about why credentials are invalid.
        message: String,
    },

    /// Profile configuration error.
    #[error("Profile error: {message}")]
    ProfileError {
        /// Details about the profile error.
        message: String,
    },
}

/// AWS Signature V4 signing errors.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The request URL cannot be signed.
    #[error("Invalid request URL: {message}")]
    InvalidUrl {
        /// Details about the URL problem.
        message: String,
    },

    /// Signature calculation failed.
    #[error("Signature calculation failed: {message}")]
    CalculationFailed {
        /// Details about the calculation error.
        message: String,
    },
}

/// Network and transport errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Request timed out.
    #[error("Request timed out after {duration:?}")]
    Timeout {
        /// Configured timeout.
        duration: Duration,
    },

    /// Connection could not be established or was dropped.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Details about the failure.
        message: String,
    },

    /// TLS setup failed.
    #[error("TLS error: {message}")]
    TlsError {
        /// Details about the failure.
        message: String,
    },
}

/// Response interpretation errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// XML body could not be parsed.
    #[error("XML parse error: {message}")]
    XmlParseError {
        /// Parser message.
        message: String,
    },

    /// JSON body could not be parsed.
    #[error("JSON parse error: {message}")]
    JsonParseError {
        /// Parser message.
        message: String,
    },

    /// A field the operation depends on was absent.
    #[error("Missing field in response: {field}")]
    MissingField {
        /// Name of the field.
        field: String,
    },

    /// A payload was not valid UTF-8.
    #[error("Invalid UTF-8 in {context}: {message}")]
    InvalidUtf8 {
        /// What was being decoded.
        context: String,
        /// Decoder message.
        message: String,
    },

    /// Locally computed checksum disagrees with the service.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum reported by the service.
        expected: String,
        /// Checksum computed locally.
        actual: String,
    },

    /// Response was structurally wrong.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Details.
        message: String,
    },
}

impl From<serde_json::Error> for AwsError {
    fn from(e: serde_json::Error) -> Self {
        AwsError::Response(ResponseError::JsonParseError {
            message: e.to_string(),
        })
    }
}

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, AwsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_service_error() {
        let error = AwsError::Service(ServiceError {
            service: "s3",
            code: "NoSuchKey".into(),
            message: "The specified key does not exist.".into(),
            status: 404,
            request_id: Some("REQ1".into()),
            kind: ErrorKind::NotFound,
        });

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.error_code(), Some("NoSuchKey"));
        assert_eq!(error.request_id(), Some("REQ1"));
    }

    #[test]
    fn test_network_error_is_transport() {
        let error = AwsError::Network(NetworkError::ConnectionFailed {
            message: "refused".into(),
        });
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert!(error.status_code().is_none());
    }

    #[test]
    fn test_local_errors_are_unknown() {
        assert_eq!(AwsError::MissingConfiguration.kind(), ErrorKind::Unknown);
        assert_eq!(AwsError::validation("bad").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_display_includes_code_and_status() {
        let error = ServiceError {
            service: "dynamodb",
            code: "ResourceNotFoundException".into(),
            message: "Requested resource not found".into(),
            status: 400,
            request_id: None,
            kind: ErrorKind::NotFound,
        };
        let text = error.to_string();
        assert!(text.contains("dynamodb"));
        assert!(text.contains("ResourceNotFoundException"));
        assert!(text.contains("400"));
    }
}
