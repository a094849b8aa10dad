use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiServerError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Nobody is consuming trigger events any more.
    #[error("event channel closed")]
    ChannelClosed,
}

impl IntoResponse for ApiServerError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ChannelClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::Bind { .. } | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
