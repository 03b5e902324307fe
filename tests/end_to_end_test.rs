//! End-to-end tests through the real reqwest transport and signer.

use aws_facade::mocks::TestFixtures;
use aws_facade::{AwsConfig, DynamoDbService, ErrorKind, LambdaService, S3Service};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config(server: &MockServer) -> AwsConfig {
    let mut config = TestFixtures::config();
    config.set_endpoint_url(&server.uri()).unwrap();
    config
}

#[tokio::test]
async fn test_s3_round_trip_against_local_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/test-bucket/hello.txt"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(header_exists("x-amz-content-sha256"))
        .respond_with(ResponseTemplate::new(200).insert_header("etag", "\"abc\""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/test-bucket/hello.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello World!"))
        .expect(1)
        .mount(&server)
        .await;

    let s3 = S3Service::new(&local_config(&server)).unwrap();
    s3.put_object("Hello World!", "test-bucket", "hello.txt")
        .await
        .unwrap();
    let text = s3
        .get_str_file_content("test-bucket", "hello.txt")
        .await
        .unwrap();

    assert_eq!(text, "Hello World!");
}

#[tokio::test]
async fn test_s3_list_against_local_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test-bucket"))
        .and(query_param("list-type", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TestFixtures::list_objects_xml(&["a.txt", "b.txt"], None)),
        )
        .mount(&server)
        .await;

    let s3 = S3Service::new(&local_config(&server)).unwrap();
    let keys = s3.list_object_keys("test-bucket").await.unwrap();

    assert_eq!(keys, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_s3_error_document_against_local_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test-bucket/missing.txt"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-amz-request-id", "REQ404")
                .set_body_string(TestFixtures::s3_error_xml(
                    "NoSuchKey",
                    "The specified key does not exist.",
                )),
        )
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/test-bucket/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let s3 = S3Service::new(&local_config(&server)).unwrap();
    let err = s3
        .get_file_content("test-bucket", "missing.txt")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.request_id(), Some("REQ404"));
    assert!(!s3.object_exists("test-bucket", "missing.txt").await);
}

#[tokio::test]
async fn test_dynamodb_get_item_against_local_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(header("content-type", "application/x-amz-json-1.0"))
        .and(body_json(json!({
            "TableName": "test-table",
            "Key": { "id": { "S": "1" } },
            "ReturnConsumedCapacity": "TOTAL"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Item": { "id": { "S": "1" }, "count": { "N": "42" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dynamodb = DynamoDbService::new(&local_config(&server)).unwrap();
    let item = dynamodb
        .get_item("test-table", &TestFixtures::item(json!({ "id": "1" })))
        .await
        .unwrap();

    assert_eq!(item, Some(TestFixtures::item(json!({ "id": "1", "count": 42 }))));
}

#[tokio::test]
async fn test_lambda_invoke_against_local_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2015-03-31/functions/my-function/invocations"))
        .and(header("x-amz-invocation-type", "RequestResponse"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;

    let lambda = LambdaService::new(&local_config(&server)).unwrap();
    let text = lambda
        .invoke_json("my-function", &json!({ "n": 1 }))
        .await
        .unwrap();

    assert_eq!(text, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let mut config = TestFixtures::config();
    config.set_endpoint_url("http://127.0.0.1:1").unwrap();

    let dynamodb = DynamoDbService::new(&config).unwrap();
    let err = dynamodb
        .get_item("test-table", &TestFixtures::item(json!({ "id": "1" })))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!dynamodb
        .key_exists("test-table", &TestFixtures::item(json!({ "id": "1" })))
        .await);
}
