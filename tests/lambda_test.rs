//! Integration tests for LambdaService.

use aws_facade::mocks::{MockResponse, MockTransport, TestFixtures};
use aws_facade::{AwsConfig, AwsError, ClientFactory, ErrorKind, InvocationType, LambdaService};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

fn create_test_service_with_transport(transport: Arc<MockTransport>) -> LambdaService {
    let factory = ClientFactory::with_transport(transport);
    LambdaService::with_factory(&TestFixtures::config(), &factory).unwrap()
}

#[test]
fn test_unconfigured_is_rejected() {
    let (_, factory) = TestFixtures::mock_factory();
    let result = LambdaService::with_factory(&AwsConfig::new(), &factory);
    assert!(matches!(result, Err(AwsError::MissingConfiguration)));
}

#[tokio::test]
async fn test_invoke_request_response() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::ok_with_body(
        r#"{"ok":true}"#,
    )
    .with_header("x-amz-executed-version", "$LATEST")]));
    let service = create_test_service_with_transport(transport.clone());

    let output = service
        .invoke(
            "my-function",
            InvocationType::RequestResponse,
            Some(Bytes::from(r#"{"n":1}"#)),
        )
        .await
        .unwrap();

    assert_eq!(output.status_code, 200);
    assert_eq!(output.payload, Bytes::from(r#"{"ok":true}"#));
    assert_eq!(output.executed_version.as_deref(), Some("$LATEST"));
    assert!(output.function_error.is_none());

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.url,
        "https://lambda.eu-west-1.amazonaws.com/2015-03-31/functions/my-function/invocations"
    );
    assert_eq!(
        request.get_header("x-amz-invocation-type"),
        Some("RequestResponse")
    );
    assert_eq!(request.json_body().unwrap(), json!({ "n": 1 }));
}

#[tokio::test]
async fn test_invoke_event_is_accepted() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::new(
        202,
        Bytes::new(),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    let output = service
        .invoke("my-function", InvocationType::Event, None)
        .await
        .unwrap();
    assert_eq!(output.status_code, 202);
    assert!(output.payload.is_empty());
    assert_eq!(
        transport
            .last_request()
            .unwrap()
            .get_header("x-amz-invocation-type"),
        Some("Event")
    );
}

#[tokio::test]
async fn test_invoke_by_arn_encodes_name() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::new(
        204,
        Bytes::new(),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    service
        .invoke(
            "arn:aws:lambda:eu-west-1:123456789012:function:my-function",
            InvocationType::DryRun,
            None,
        )
        .await
        .unwrap();

    let request = transport.last_request().unwrap();
    assert!(request
        .url
        .contains("/functions/arn%3Aaws%3Alambda%3Aeu-west-1%3A123456789012%3Afunction%3Amy-function/"));
}

#[tokio::test]
async fn test_function_error_is_reported_not_raised() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::ok_with_body(
        r#"{"errorMessage":"boom","errorType":"Exception"}"#,
    )
    .with_header("x-amz-function-error", "Unhandled")]));
    let service = create_test_service_with_transport(transport);

    let output = service
        .invoke("my-function", InvocationType::RequestResponse, None)
        .await
        .unwrap();
    assert_eq!(output.function_error.as_deref(), Some("Unhandled"));
}

#[tokio::test]
async fn test_missing_function_is_not_found() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::error(
        404,
        r#"{"Type":"User","Message":"Function not found: arn:aws:lambda:eu-west-1:123456789012:function:missing"}"#,
    )
    .with_header("x-amzn-errortype", "ResourceNotFoundException")]));
    let service = create_test_service_with_transport(transport);

    let err = service
        .invoke("missing", InvocationType::RequestResponse, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.error_code(), Some("ResourceNotFoundException"));
}

#[tokio::test]
async fn test_invoke_json_returns_text() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::ok_with_body(
        r#"{"greeting":"hello"}"#,
    )]));
    let service = create_test_service_with_transport(transport.clone());

    let text = service
        .invoke_json("my-function", &json!({ "name": "world" }))
        .await
        .unwrap();
    assert_eq!(text, r#"{"greeting":"hello"}"#);

    let request = transport.last_request().unwrap();
    assert_eq!(
        request.get_header("x-amz-invocation-type"),
        Some("RequestResponse")
    );
    assert_eq!(request.json_body().unwrap(), json!({ "name": "world" }));
}

#[tokio::test]
async fn test_empty_function_name_is_rejected() {
    let transport = Arc::new(MockTransport::new());
    let service = create_test_service_with_transport(transport.clone());

    let result = service
        .invoke("", InvocationType::RequestResponse, None)
        .await;
    assert!(matches!(result, Err(AwsError::Validation { .. })));
    assert_eq!(transport.request_count(), 0);
}
