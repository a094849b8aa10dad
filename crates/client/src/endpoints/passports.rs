//! Passport and punch-pass endpoints.

use serde_json::Value;

use super::{listing, segment};
use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::envelope::RecordPath;
use crate::paginate::Pagination;
use crate::ApiError;

const PATH: &str = "/api/passports";
const PUNCH_PATH: &str = "/api/passports/punch-passports";

/// Both passport listings page by `page` / `pageSize`, records under `data.passports`.
pub const PAGINATION: Pagination = Pagination::by_page(50, RecordPath::DataPassports);

/// `GET /api/passports`
pub async fn list(
    client: &OneTapClient,
    query: Payload,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    listing(client, ApiRequest::get(PATH).with_query(query), &PAGINATION, return_all).await
}

/// `GET /api/passports/punch-passports`
pub async fn punch_passes(
    client: &OneTapClient,
    query: Payload,
    return_all: bool,
) -> Result<Vec<Value>, ApiError> {
    listing(
        client,
        ApiRequest::get(PUNCH_PATH).with_query(query),
        &PAGINATION,
        return_all,
    )
    .await
}

/// `GET /api/passports/punch-passports/:id`: the query filters its check-ins.
pub async fn punch_pass(client: &OneTapClient, id: &str, query: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::get(format!("{PUNCH_PATH}/{}", segment(id))).with_query(query))
        .await
}

/// `POST /api/passports/punch-passports/:id/redeem`
pub async fn redeem_punch_pass(
    client: &OneTapClient,
    id: &str,
    body: Payload,
) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{PUNCH_PATH}/{}/redeem", segment(id))).with_body(body))
        .await
}

/// `GET /api/passports/groups`
pub async fn groups(client: &OneTapClient) -> Result<Value, ApiError> {
    client.send(&ApiRequest::get(format!("{PATH}/groups"))).await
}

/// `POST /api/passports/:id/send`
pub async fn send(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::post(format!("{PATH}/{}/send", segment(id))).with_body(body))
        .await
}
