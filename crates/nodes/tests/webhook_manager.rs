//! Webhook Manager node against a mock integrations API.

use nodes::credentials::API_KEY;
use nodes::{ExecutableNode, ExecutionContext, Item, WebhookManagerNode};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer, mut parameters: Value) -> ExecutionContext {
    parameters["environment"] = json!(server.uri());
    ExecutionContext::new(parameters).with_secret(API_KEY, "test-key")
}

#[tokio::test]
async fn register_merges_response_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/organization/integrations"))
        .and(body_json(json!({
            "name": "Door hooks",
            "description": "Webhook integration created from n8n",
            "webhookSettings": {
                "url": "https://hooks.example/in",
                "events": ["participant.checkin"],
                "isActive": true,
                "headers": { "X-Webhook-Secret": "s3cret" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "int-1", "apiKey": "k-1", "name": "Door hooks" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(
        &server,
        json!({
            "operation": "register",
            "webhookUrl": "https://hooks.example/in",
            "events": ["participant.checkin"],
            "additionalSettings": { "name": "Door hooks", "secret": "s3cret" }
        }),
    );
    let out = WebhookManagerNode
        .execute(vec![Item::new(json!({}))], &ctx)
        .await
        .unwrap();

    let json = &out[0].json;
    assert_eq!(json["success"], true);
    assert_eq!(json["operation"], "register");
    assert_eq!(json["integrationId"], "int-1");
    assert_eq!(json["apiKey"], "k-1");
    assert_eq!(json["webhookUrl"], "https://hooks.example/in");
    assert_eq!(json["name"], "Door hooks");
}

#[tokio::test]
async fn list_emits_one_item_per_integration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/organization/integrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "a" }, { "id": "b" }]
        })))
        .mount(&server)
        .await;

    let ctx = context(&server, json!({ "operation": "list" }));
    let out = WebhookManagerNode
        .execute(vec![Item::new(json!({}))], &ctx)
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[1].json["id"], "b");
    assert_eq!(out[1].json["operation"], "list");
    assert!(out[1].json.get("success").is_none());
}

#[tokio::test]
async fn failed_unregister_becomes_error_item() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/organization/integrations/int-9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let ctx = context(&server, json!({ "operation": "unregister", "integrationId": "int-9" }))
        .with_continue_on_fail(true);
    let out = WebhookManagerNode
        .execute(vec![Item::new(json!({}))], &ctx)
        .await
        .unwrap();

    assert_eq!(out[0].json["success"], false);
    assert_eq!(out[0].json["operation"], "unregister");
    assert!(out[0].json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn malformed_parameters_fail_per_item() {
    let server = MockServer::start().await;
    let ctx = context(&server, json!({ "operation": "register" })).with_continue_on_fail(true);

    let out = WebhookManagerNode
        .execute(vec![Item::new(json!({})), Item::new(json!({}))], &ctx)
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[1].paired_item, Some(1));
    assert_eq!(out[1].json["success"], false);
    assert_eq!(out[1].json["operation"], "register");
    assert!(server.received_requests().await.unwrap().is_empty());
}
