//! Profile endpoints.

use serde_json::Value;

use super::{listing, segment};
use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::envelope::RecordPath;
use crate::paginate::Pagination;
use crate::ApiError;

const PATH: &str = "/api/profiles";

/// `page` / `pageSize`, 50 per page, records under `data`.
pub const PAGINATION: Pagination = Pagination::by_page(50, RecordPath::Data);

/// `GET /api/profiles`
pub async fn list(
    client: &OneTapClient,
    query: Payload,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    listing(client, ApiRequest::get(PATH).with_query(query), &PAGINATION, return_all).await
}

/// `GET /api/profiles/:id`
pub async fn get(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::get(format!("{PATH}/{}", segment(id))))
        .await
}

/// `POST /api/profiles`
pub async fn create(client: &OneTapClient, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::post(PATH).with_body(body)).await
}

/// `PUT /api/profiles/:id`
pub async fn update(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::put(format!("{PATH}/{}", segment(id))).with_body(body))
        .await
}

/// `DELETE /api/profiles/:id`
pub async fn delete(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::delete(format!("{PATH}/{}", segment(id))))
        .await
}

/// `GET /api/profiles/customFields`: the organization's custom field definitions.
pub async fn custom_fields(client: &OneTapClient) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::get(format!("{PATH}/customFields")))
        .await
}

/// `GET /api/profiles/checkInCode?checkInCode=..`
pub async fn by_check_in_code(client: &OneTapClient, code: &str) -> Result<Value, ApiError> {
    let mut query = Payload::new();
    query.insert("checkInCode".to_owned(), code.into());
    client
        .send(&ApiRequest::get(format!("{PATH}/checkInCode")).with_query(query))
        .await
}

/// `POST /api/profiles/avatar`
pub async fn update_avatar(client: &OneTapClient, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{PATH}/avatar")).with_body(body))
        .await
}
