//! `api` crate: the HTTP listener that feeds webhook calls to the trigger.
//!
//! Exposes:
//!   POST /webhook
//!   GET  /health
//!
//! Accepted events are pushed onto an mpsc channel; the receiving side
//! decides what to do with them.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use nodes::{Item, OneTapTrigger};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiServerError;

#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<OneTapTrigger>,
    pub events: mpsc::Sender<Item>,
}

impl AppState {
    pub fn new(trigger: OneTapTrigger, events: mpsc::Sender<Item>) -> Self {
        Self {
            trigger: Arc::new(trigger),
            events,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::webhooks::receive))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ApiServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ApiServerError::Bind {
            addr: addr.to_owned(),
            source,
        })?;
    info!(addr, "webhook listener ready");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ApiServerError::Serve)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down webhook listener");
    }
}
