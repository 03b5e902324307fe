//! Mapping from AWS error codes and HTTP statuses to typed errors.

use super::*;
use crate::transport::HttpResponse;
use serde::Deserialize;

/// Strip the namespace prefix and URL suffix AWS attaches to error codes.
///
/// `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException` and
/// `ResourceNotFoundException:http://internal.amazon.com/` both become
/// `ResourceNotFoundException`.
pub fn normalize_error_code(raw: &str) -> String {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    let code = code.split(':').next().unwrap_or(code);
    code.trim().to_string()
}

/// Classify an AWS error code, if it is one we recognize.
pub fn classify_error_code(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        // Missing resources
        "NoSuchKey"
        | "NoSuchBucket"
        | "NotFound"
        | "ResourceNotFoundException"
        | "ParameterNotFound"
        | "QueueDoesNotExist"
        | "AWS.SimpleQueueService.NonExistentQueue" => ErrorKind::NotFound,

        // Authentication and authorization
        "AccessDenied"
        | "AccessDeniedException"
        | "InvalidAccessKeyId"
        | "SignatureDoesNotMatch"
        | "InvalidSignatureException"
        | "ExpiredToken"
        | "ExpiredTokenException"
        | "UnrecognizedClientException"
        | "MissingAuthenticationToken"
        | "IncompleteSignature"
        | "InvalidClientTokenId" => ErrorKind::AccessDenied,

        // Throttling
        "SlowDown"
        | "Throttling"
        | "ThrottlingException"
        | "ThrottledException"
        | "TooManyRequestsException"
        | "RequestLimitExceeded"
        | "RequestThrottled"
        | "RequestThrottledException"
        | "ProvisionedThroughputExceededException" => ErrorKind::Throttled,

        _ => return None,
    };
    Some(kind)
}

/// Classify a bare HTTP status when no error code is available.
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        401 | 403 => ErrorKind::AccessDenied,
        429 => ErrorKind::Throttled,
        _ => ErrorKind::Unknown,
    }
}

/// Build a service error, classifying by code first and status second.
pub(crate) fn service_error(
    service: &'static str,
    status: u16,
    code: &str,
    message: impl Into<String>,
    request_id: Option<String>,
) -> AwsError {
    let code = normalize_error_code(code);
    let kind = classify_error_code(&code).unwrap_or_else(|| classify_status(status));

    AwsError::Service(ServiceError {
        service,
        code,
        message: message.into(),
        status,
        request_id,
        kind,
    })
}

#[derive(Debug, Default, Deserialize)]
struct JsonErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Interpret an error response from a JSON-protocol or REST-JSON service.
///
/// The code comes from the `__type` field, falling back to the
/// `x-amzn-errortype` header that REST-JSON services set.
pub(crate) fn parse_json_error(service: &'static str, response: &HttpResponse) -> AwsError {
    let body: JsonErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();

    let code = body
        .error_type
        .or_else(|| response.get_header("x-amzn-errortype").map(String::from))
        .unwrap_or_else(|| format!("Http{}", response.status));

    let message = body.message.unwrap_or_else(|| {
        String::from_utf8_lossy(&response.body)
            .chars()
            .take(200)
            .collect()
    });

    service_error(
        service,
        response.status,
        &code,
        message,
        response.request_id().map(String::from),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashMap;
    use test_case::test_case;

    #[test_case("com.amazonaws.dynamodb.v20120810#ResourceNotFoundException", "ResourceNotFoundException")]
    #[test_case("ResourceNotFoundException:http://internal.amazon.com/coral/", "ResourceNotFoundException")]
    #[test_case("AWS.SimpleQueueService.NonExistentQueue", "AWS.SimpleQueueService.NonExistentQueue")]
    #[test_case("NoSuchKey", "NoSuchKey")]
    fn test_normalize_error_code(raw: &str, expected: &str) {
        assert_eq!(normalize_error_code(raw), expected);
    }

    #[test_case("NoSuchBucket", Some(ErrorKind::NotFound))]
    #[test_case("ParameterNotFound", Some(ErrorKind::NotFound))]
    #[test_case("AccessDeniedException", Some(ErrorKind::AccessDenied))]
    #[test_case("SignatureDoesNotMatch", Some(ErrorKind::AccessDenied))]
    #[test_case("SlowDown", Some(ErrorKind::Throttled))]
    #[test_case("ProvisionedThroughputExceededException", Some(ErrorKind::Throttled))]
    #[test_case("ConditionalCheckFailedException", None)]
    fn test_classify_error_code(code: &str, expected: Option<ErrorKind>) {
        assert_eq!(classify_error_code(code), expected);
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(404), ErrorKind::NotFound);
        assert_eq!(classify_status(403), ErrorKind::AccessDenied);
        assert_eq!(classify_status(429), ErrorKind::Throttled);
        assert_eq!(classify_status(500), ErrorKind::Unknown);
    }

    #[test]
    fn test_unknown_code_falls_back_to_status() {
        let error = service_error("s3", 404, "SomethingNew", "gone", None);
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = service_error("s3", 500, "InternalError", "boom", None);
        assert_eq!(error.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_parse_json_error_body() {
        let mut headers = HashMap::new();
        headers.insert("x-amzn-RequestId".to_string(), "REQ42".to_string());
        let response = HttpResponse {
            status: 400,
            headers,
            body: Bytes::from(
                r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
            ),
        };

        match parse_json_error("dynamodb", &response) {
            AwsError::Service(e) => {
                assert_eq!(e.code, "ResourceNotFoundException");
                assert_eq!(e.message, "Requested resource not found");
                assert_eq!(e.kind, ErrorKind::NotFound);
                assert_eq!(e.request_id.as_deref(), Some("REQ42"));
            }
            other => panic!("Expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_error_header_fallback() {
        let mut headers = HashMap::new();
        headers.insert(
            "x-amzn-ErrorType".to_string(),
            "ResourceNotFoundException:http://internal.amazon.com/".to_string(),
        );
        let response = HttpResponse {
            status: 404,
            headers,
            body: Bytes::from(r#"{"Message":"Function not found"}"#),
        };

        let error = parse_json_error("lambda", &response);
        assert_eq!(error.error_code(), Some("ResourceNotFoundException"));
        assert!(error.to_string().contains("Function not found"));
    }
}
