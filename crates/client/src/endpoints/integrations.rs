//! Organization integrations: OneTap's webhook registrations.

use serde_json::Value;

use super::segment;
use crate::client::{ApiRequest, OneTapClient, Payload};
use crate::ApiError;

const PATH: &str = "/api/organization/integrations";

/// `POST /api/organization/integrations`
pub async fn register(client: &OneTapClient, body: Payload) -> Result<Value, ApiError> {
    client.send(&ApiRequest::post(PATH).with_body(body)).await
}

/// `GET /api/organization/integrations`
pub async fn list(client: &OneTapClient) -> Result<Value, ApiError> {
    client.send(&ApiRequest::get(PATH)).await
}

/// `PUT /api/organization/integrations/:id`
pub async fn update(client: &OneTapClient, id: &str, body: Payload) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::put(format!("{PATH}/{}", segment(id))).with_body(body))
        .await
}

/// `DELETE /api/organization/integrations/:id`
pub async fn delete(client: &OneTapClient, id: &str) -> Result<Value, ApiError> {
    client
        .send(&ApiRequest::delete(format!("{PATH}/{}", segment(id))))
        .await
}
