//! Integration tests for DynamoDbService.

use aws_facade::mocks::{MockResponse, MockTransport, TestFixtures};
use aws_facade::types::*;
use aws_facade::{AwsConfig, AwsError, ClientFactory, DynamoDbService, ErrorKind};
use serde_json::json;
use std::sync::Arc;

const TABLE: &str = "test-table";

fn create_test_service_with_transport(transport: Arc<MockTransport>) -> DynamoDbService {
    let factory = ClientFactory::with_transport(transport);
    DynamoDbService::with_factory(&TestFixtures::config(), &factory).unwrap()
}

fn key(id: &str) -> Item {
    TestFixtures::item(json!({ "id": id }))
}

#[test]
fn test_unconfigured_is_rejected() {
    let (_, factory) = TestFixtures::mock_factory();
    let result = DynamoDbService::with_factory(&AwsConfig::new(), &factory);
    assert!(matches!(result, Err(AwsError::MissingConfiguration)));
}

#[tokio::test]
async fn test_put_get_delete_lifecycle() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(json!({})),
        MockResponse::json(json!({ "Item": { "id": { "S": "1" } } })),
        MockResponse::json(json!({})),
        MockResponse::json(json!({})),
        MockResponse::json(json!({})),
    ]));
    let service = create_test_service_with_transport(transport.clone());

    assert!(service.put_item(TABLE, &key("1")).await.unwrap());
    let put = &transport.requests_for("PutItem")[0];
    assert_eq!(
        put.json_body().unwrap(),
        json!({ "TableName": TABLE, "Item": { "id": { "S": "1" } } })
    );

    let item = service.get_item(TABLE, &key("1")).await.unwrap();
    assert_eq!(item, Some(key("1")));

    assert!(service.delete_item(TABLE, &key("1")).await.unwrap());

    assert_eq!(service.get_item(TABLE, &key("1")).await.unwrap(), None);
    assert!(!service.key_exists(TABLE, &key("1")).await);

    assert_eq!(transport.requests_for("GetItem").len(), 3);
    assert_eq!(transport.requests_for("DeleteItem").len(), 1);
}

#[tokio::test]
async fn test_get_record_keeps_type_tags() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({
            "Item": { "id": { "S": "1" }, "count": { "N": "3" } },
            "ConsumedCapacity": { "TableName": TABLE, "CapacityUnits": 0.5 }
        }),
    )
    .with_header("x-amzn-requestid", "REQ123")]));
    let service = create_test_service_with_transport(transport.clone());

    let record = service.get_record(TABLE, &key("1")).await.unwrap();
    let item = record.item.clone().unwrap();
    assert_eq!(item["count"], AttributeValue::N("3".to_string()));
    assert_eq!(record.request_id.as_deref(), Some("REQ123"));
    assert!(record.consumed_capacity.is_some());

    let body = transport.last_request().unwrap().json_body().unwrap();
    assert_eq!(body["ReturnConsumedCapacity"], "TOTAL");
}

#[tokio::test]
async fn test_get_item_value() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(json!({
            "Item": { "id": { "S": "1" }, "test_value": { "S": "2" } }
        })),
        MockResponse::json(json!({ "Item": { "id": { "S": "1" } } })),
    ]));
    let service = create_test_service_with_transport(transport);

    let value = service
        .get_item_value(TABLE, &key("1"), "test_value")
        .await
        .unwrap();
    assert_eq!(value, Some(json!("2")));

    let missing = service
        .get_item_value(TABLE, &key("1"), "test_value")
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_key_exists_swallows_errors() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(json!({ "Item": { "id": { "S": "1" } } })),
        MockResponse::json_error(
            400,
            "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
            "Requested resource not found",
        ),
    ]));
    let service = create_test_service_with_transport(transport);

    assert!(service.key_exists(TABLE, &key("1")).await);
    assert!(!service.key_exists("missing-table", &key("1")).await);
}

#[tokio::test]
async fn test_missing_table_is_not_found() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json_error(
        400,
        "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
        "Requested resource not found",
    )]));
    let service = create_test_service_with_transport(transport);

    let err = service.get_item("missing-table", &key("1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_item_sends_expression_verbatim() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({}),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    let values = TestFixtures::item(json!({ ":test_value": "2" }));
    assert!(service
        .update_item(TABLE, &key("1"), "SET test_value = :test_value", &values)
        .await
        .unwrap());

    let body = transport.last_request().unwrap().json_body().unwrap();
    assert_eq!(body["UpdateExpression"], "SET test_value = :test_value");
    assert_eq!(
        body["ExpressionAttributeValues"],
        json!({ ":test_value": { "S": "2" } })
    );
    assert_eq!(body["Key"], json!({ "id": { "S": "1" } }));
}

#[tokio::test]
async fn test_update_item_without_values() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({}),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    service
        .update_item(TABLE, &key("1"), "REMOVE test_value", &Item::new())
        .await
        .unwrap();

    let body = transport.last_request().unwrap().json_body().unwrap();
    assert!(body.get("ExpressionAttributeValues").is_none());
}

#[tokio::test]
async fn test_scan_filter_elements_bool() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({
            "Items": [
                { "id": { "S": "3" }, "test_value_bool": { "BOOL": true } }
            ],
            "Count": 1,
            "ScannedCount": 5
        }),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    let items = service
        .scan_filter_elements(TABLE, "test_value_bool", &json!(true), FilterType::Bool)
        .await
        .unwrap();

    assert_eq!(
        items,
        vec![TestFixtures::item(
            json!({ "id": "3", "test_value_bool": true })
        )]
    );

    let body = transport.last_request().unwrap().json_body().unwrap();
    assert_eq!(body["FilterExpression"], "#attr = :value");
    assert_eq!(
        body["ExpressionAttributeNames"],
        json!({ "#attr": "test_value_bool" })
    );
    assert_eq!(
        body["ExpressionAttributeValues"],
        json!({ ":value": { "BOOL": true } })
    );
}

#[tokio::test]
async fn test_scan_filter_elements_follows_pages() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(json!({
            "Items": [{ "id": { "S": "1" }, "status": { "S": "open" } }],
            "Count": 1,
            "ScannedCount": 2,
            "LastEvaluatedKey": { "id": { "S": "2" } }
        })),
        MockResponse::json(json!({
            "Items": [{ "id": { "S": "4" }, "status": { "S": "open" } }],
            "Count": 1,
            "ScannedCount": 3
        })),
    ]));
    let service = create_test_service_with_transport(transport.clone());

    let items = service
        .scan_filter_elements(TABLE, "status", &json!("open"), FilterType::S)
        .await
        .unwrap();

    assert_eq!(
        items,
        vec![
            TestFixtures::item(json!({ "id": "1", "status": "open" })),
            TestFixtures::item(json!({ "id": "4", "status": "open" })),
        ]
    );

    let scans = transport.requests_for("Scan");
    assert_eq!(scans.len(), 2);

    let first = scans[0].json_body().unwrap();
    assert!(first.get("ExclusiveStartKey").is_none());

    let second = scans[1].json_body().unwrap();
    assert_eq!(second["ExclusiveStartKey"], json!({ "id": { "S": "2" } }));
    assert_eq!(second["FilterExpression"], "#attr = :value");
    assert_eq!(second["ExpressionAttributeNames"], json!({ "#attr": "status" }));
    assert_eq!(
        second["ExpressionAttributeValues"],
        json!({ ":value": { "S": "open" } })
    );
}

#[tokio::test]
async fn test_scan_filter_rejects_mismatched_type() {
    let transport = Arc::new(MockTransport::new());
    let service = create_test_service_with_transport(transport.clone());

    let result = service
        .scan_filter_elements(TABLE, "test_value_bool", &json!("yes"), FilterType::Bool)
        .await;
    assert!(matches!(result, Err(AwsError::Validation { .. })));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_scan_table_returns_one_page() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({
            "Items": [{ "id": { "S": "1" } }, { "id": { "S": "2" } }],
            "Count": 2,
            "ScannedCount": 2,
            "LastEvaluatedKey": { "id": { "S": "2" } }
        }),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    let output = service.scan_table(TABLE).await.unwrap();
    assert_eq!(output.items.len(), 2);
    assert_eq!(output.last_evaluated_key, Some(key("2")));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_scan_all_follows_last_evaluated_key() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(json!({
            "Items": [{ "id": { "S": "1" } }],
            "Count": 1,
            "ScannedCount": 1,
            "LastEvaluatedKey": { "id": { "S": "1" } }
        })),
        MockResponse::json(json!({
            "Items": [{ "id": { "S": "2" } }],
            "Count": 1,
            "ScannedCount": 1
        })),
    ]));
    let service = create_test_service_with_transport(transport.clone());

    let items = service.scan_all(TABLE).await.unwrap();
    assert_eq!(items, vec![key("1"), key("2")]);

    let second = transport.requests_for("Scan")[1].json_body().unwrap();
    assert_eq!(second["ExclusiveStartKey"], json!({ "id": { "S": "1" } }));
}

#[tokio::test]
async fn test_create_table() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({ "TableDescription": { "TableStatus": "CREATING" } }),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    assert!(service
        .create_table(
            TABLE,
            &[KeySchemaElement::hash("id")],
            &[AttributeDefinition::new("id", ScalarAttributeType::S)],
            ProvisionedThroughput::new(5, 5),
        )
        .await
        .unwrap());

    let body = transport.last_request().unwrap().json_body().unwrap();
    assert_eq!(
        body,
        json!({
            "TableName": TABLE,
            "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
            "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }],
            "ProvisionedThroughput": { "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 }
        })
    );
}

#[tokio::test]
async fn test_create_table_requires_key_schema() {
    let transport = Arc::new(MockTransport::new());
    let service = create_test_service_with_transport(transport);

    let result = service
        .create_table(TABLE, &[], &[], ProvisionedThroughput::new(1, 1))
        .await;
    assert!(matches!(result, Err(AwsError::Validation { .. })));
}

#[tokio::test]
async fn test_delete_table() {
    let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json(
        json!({ "TableDescription": { "TableStatus": "DELETING" } }),
    )]));
    let service = create_test_service_with_transport(transport.clone());

    assert!(service.delete_table(TABLE).await.unwrap());
    assert_eq!(
        transport.last_request().unwrap().get_header("x-amz-target"),
        Some("DynamoDB_20120810.DeleteTable")
    );
}
