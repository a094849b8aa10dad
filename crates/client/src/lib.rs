//! `client` crate: pure transport layer for the OneTap REST API.
//!
//! Provides the authenticated HTTP client, environment configuration, the
//! response envelope adapter, a generic paginator, and one function per
//! OneTap endpoint.  No parameter semantics live here.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod paginate;

pub use client::{ApiRequest, ClientConfig, Environment, OneTapClient, Payload};
pub use envelope::{unwrap_data, Page, RecordPath};
pub use error::ApiError;
pub use paginate::{PageAdvance, Pagination};
