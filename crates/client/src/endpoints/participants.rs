//! Participant endpoints (a profile's membership of a list, with check-in state).

use serde_json::Value;

use super::{listing, segment};
use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::envelope::RecordPath;
use crate::paginate::Pagination;
use crate::ApiError;

const PATH: &str = "/api/participants";

/// `skip` / `limit`, 100 per page, bare array.
pub const PAGINATION: Pagination = Pagination::by_offset(100, RecordPath::Bare);

fn item(id: &str) -> String {
    format!("{PATH}/{}", segment(id))
}

/// `GET /api/participants`
pub async fn list(
    client: &OneTapClient,
    query: Payload,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    listing(client, ApiRequest::get(PATH).with_query(query), &PAGINATION, return_all).await
}

/// `GET /api/participants/:id`
pub async fn get(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client.send(&ApiRequest::get(item(id))).await
}

/// `POST /api/participants`
pub async fn create(client: &OneTapClient, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::post(PATH).with_body(body)).await
}

/// `PUT /api/participants/:id`
pub async fn update(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::put(item(id)).with_body(body)).await
}

/// `DELETE /api/participants/:id[?listId=..]`
pub async fn delete(
    client: &OneTapClient,
    id: &str,
    list_id: Option<&str>,
) -> Result<Value, ApiError> {
    let mut query = Payload::new();
    if let Some(list_id) = list_id.filter(|l| !l.is_empty()) {
        query.insert("listId".to_owned(), list_id.into());
    }
    client
        .send(&ApiRequest::delete(item(id)).with_query(query))
        .await
}

/// `POST /api/participants/:id/checkin`
pub async fn check_in(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{}/checkin", item(id))).with_body(body))
        .await
}

/// `POST /api/participants/:id/checkout`
pub async fn check_out(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{}/checkout", item(id))).with_body(body))
        .await
}

/// `POST /api/participants/:id/undoCheckin`
pub async fn undo_check_in(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{}/undoCheckin", item(id))))
        .await
}

/// `POST /api/participants/:id/undoCheckout`
pub async fn undo_check_out(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{}/undoCheckout", item(id))))
        .await
}
