//! Paginator and transport tests against a mock OneTap server.
//!
//! wiremock stands in for the API so no network access or real key is needed.

use client::endpoints::{participants, profiles};
use client::paginate::fetch_all;
use client::{ApiError, ApiRequest, ClientConfig, Environment, OneTapClient, Pagination, RecordPath};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OneTapClient {
    let env: Environment = server.uri().parse().unwrap();
    OneTapClient::new(ClientConfig::new("test-key", env)).unwrap()
}

fn records(n: usize, offset: usize) -> Vec<Value> {
    (0..n).map(|i| json!({ "id": format!("r{}", offset + i) })).collect()
}

async fn mount_profile_page(server: &MockServer, page: &str, count: usize, offset: usize) {
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .and(query_param("page", page))
        .and(query_param("pageSize", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": records(count, offset) })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn return_all_stops_after_short_page() {
    let server = MockServer::start().await;
    mount_profile_page(&server, "0", 50, 0).await;
    mount_profile_page(&server, "1", 50, 50).await;
    mount_profile_page(&server, "2", 20, 100).await;

    let client = client_for(&server);
    let all = profiles::list(&client, Default::default(), true).await.unwrap();

    assert_eq!(all.len(), 120);
    assert_eq!(all[0]["id"], "r0");
    assert_eq!(all[119]["id"], "r119");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn full_last_page_costs_one_empty_fetch() {
    let server = MockServer::start().await;
    mount_profile_page(&server, "0", 50, 0).await;
    mount_profile_page(&server, "1", 50, 50).await;
    mount_profile_page(&server, "2", 0, 100).await;

    let client = client_for(&server);
    let all = profiles::list(&client, Default::default(), true).await.unwrap();

    assert_eq!(all.len(), 100);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn offset_pagination_advances_skip_by_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/participants"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .and(query_param("listId", "L1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(records(100, 0))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/participants"))
        .and(query_param("skip", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(records(3, 100))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = client::Payload::new();
    query.insert("listId".into(), json!("L1"));
    let all = participants::list(&client, query, true).await.unwrap();

    assert_eq!(all.len(), 103);
}

#[tokio::test]
async fn enveloped_listing_without_array_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "no data" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let all = fetch_all(
        &client,
        ApiRequest::get("/api/profiles"),
        &Pagination::by_page(50, RecordPath::Data),
    )
    .await
    .unwrap();

    assert!(all.is_empty());
}

#[tokio::test]
async fn bare_listing_object_becomes_single_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/participants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "only" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let all = participants::list(&client, Default::default(), true).await.unwrap();

    assert_eq!(all, vec![json!({ "id": "only" })]);
}

#[tokio::test]
async fn single_page_uses_caller_paging_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .and(query_param("page", "3"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": records(10, 30) })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = client::Payload::new();
    query.insert("page".into(), json!(3));
    query.insert("pageSize".into(), json!(10));
    let page = profiles::list(&client, query, false).await.unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(page[0]["id"], "r30");
}

#[tokio::test]
async fn requests_carry_api_key_and_source_app() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/me"))
        .and(header("X-API-Key", "test-key"))
        .and(header("x-sourceapp", "n8n-integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "org-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let me = client::endpoints::public::me(&client).await.unwrap();
    assert_eq!(me["id"], "org-1");
}

#[tokio::test]
async fn non_success_status_surfaces_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/participants/p1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Participant not found" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = participants::delete(&client, "p1", None).await.unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "Participant not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/participants/p1/undoCheckin"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = participants::undo_check_in(&client, "p1").await.unwrap();
    assert_eq!(value, Value::Null);
}
