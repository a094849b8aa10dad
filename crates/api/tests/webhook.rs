//! Router tests driven through `tower::ServiceExt::oneshot`.

use api::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use nodes::OneTapTrigger;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

fn app(trigger: Value) -> (axum::Router, mpsc::Receiver<nodes::Item>) {
    let (tx, rx) = mpsc::channel(8);
    let trigger = OneTapTrigger::from_parameters(&trigger).unwrap();
    (router(AppState::new(trigger, tx)), rx)
}

fn webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook?tag=door")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accepted_webhook_is_queued() {
    let (app, mut rx) = app(json!({ "triggerOn": "checkin", "triggerMethod": "webhook" }));

    let response = app
        .oneshot(webhook(r#"{"participantId":"p1","listId":"l1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await, json!({ "message": "webhook accepted" }));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.json["participantId"], "p1");
    assert_eq!(event.json["triggerType"], "checkin");
    assert_eq!(event.json["query"], json!({ "tag": "door" }));
    assert_eq!(event.json["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn filtered_webhook_is_ignored() {
    let (app, mut rx) = app(json!({ "listId": "l1" }));

    let response = app
        .oneshot(webhook(r#"{"participantId":"p1","listId":"other"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "message": "webhook ignored" }));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn non_json_body_is_ignored() {
    let (app, _rx) = app(json!({}));
    let response = app.oneshot(webhook("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn closed_channel_is_unavailable() {
    let (app, rx) = app(json!({}));
    drop(rx);

    let response = app.oneshot(webhook(r#"{"id":"x"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _rx) = app(json!({}));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}
