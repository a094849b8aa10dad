use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use nodes::{TriggerNode, WebhookOutcome, WebhookRequest};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{ApiServerError, AppState};

/// Hand an inbound call to the trigger and queue the resulting event.
///
/// Bodies that are not valid JSON are treated like any other payload the
/// trigger rejects: acknowledged, but no event.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiServerError> {
    let body = serde_json::from_slice(&body).unwrap_or_else(|err| {
        debug!(error = %err, "webhook body is not JSON");
        Value::Null
    });

    let request = WebhookRequest {
        body,
        headers: header_map(&headers),
        query: query.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
    };

    match state.trigger.webhook(request, Utc::now()) {
        WebhookOutcome::Event(item) => {
            state
                .events
                .send(item)
                .await
                .map_err(|_| ApiServerError::ChannelClosed)?;
            info!("webhook accepted");
            Ok((StatusCode::ACCEPTED, Json(json!({ "message": "webhook accepted" }))))
        }
        WebhookOutcome::Ignored => {
            Ok((StatusCode::OK, Json(json!({ "message": "webhook ignored" }))))
        }
    }
}

/// Headers as a JSON object; non-UTF-8 values are dropped.
fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_owned(), Value::String(value.to_owned())))
        })
        .collect()
}
