//! List endpoints (events or sessions participants check into).

use serde_json::Value;

use super::{listing, segment};
use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::envelope::RecordPath;
use crate::paginate::Pagination;
use crate::ApiError;

const PATH: &str = "/api/lists";

/// Same paging contract as participants.
pub const PAGINATION: Pagination = Pagination::by_offset(100, RecordPath::Bare);

fn item(id: &str) -> String {
    format!("{PATH}/{}", segment(id))
}

/// `GET /api/lists`
pub async fn list(
    client: &OneTapClient,
    query: Payload,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    listing(client, ApiRequest::get(PATH).with_query(query), &PAGINATION, return_all).await
}

/// `GET /api/lists/:id`
pub async fn get(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client.send(&ApiRequest::get(item(id))).await
}

/// `POST /api/lists`
pub async fn create(client: &OneTapClient, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::post(PATH).with_body(body)).await
}

/// `PUT /api/lists/:id`
pub async fn update(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::put(item(id)).with_body(body)).await
}

/// `DELETE /api/lists/:id`
pub async fn delete(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client.send(&ApiRequest::delete(item(id))).await
}

/// `GET /api/lists/:id/survey`
pub async fn survey(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::get(format!("{}/survey", item(id))))
        .await
}
