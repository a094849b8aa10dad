//! Credential test endpoint.

use serde_json::Value;

use crate::client::{ApiRequest, OneTapClient};
use crate::ApiError;

/// `GET /api/public/me`: succeeds only for a valid API key.
pub async fn me(client: &OneTapClient) -> Result<Value, ApiError> {
    client.send(&ApiRequest::get("/api/public/me")).await
}
