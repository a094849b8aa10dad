//! The OneTap credential: one API key, testable against `/api/public/me`.

use std::fmt;

use client::endpoints::public;
use client::{ClientConfig, Environment, OneTapClient};
use serde_json::Value;

use crate::{ExecutionContext, NodeError};

/// Secret name the API key is stored under.
pub const API_KEY: &str = "apiKey";

#[derive(Clone)]
pub struct OneTapCredentials {
    api_key: String,
}

impl fmt::Debug for OneTapCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneTapCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OneTapCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Read the API key the host injected into the context.
    pub fn from_context(ctx: &ExecutionContext) -> Result<Self, NodeError> {
        ctx.secrets
            .get(API_KEY)
            .filter(|key| !key.is_empty())
            .map(|key| Self::new(key.clone()))
            .ok_or(NodeError::MissingCredential(API_KEY))
    }

    /// Build an authenticated client for `environment`.
    pub fn client(&self, environment: Environment) -> Result<OneTapClient, NodeError> {
        Ok(OneTapClient::new(ClientConfig::new(
            self.api_key.clone(),
            environment,
        ))?)
    }

    /// Validate the key by calling `GET /api/public/me`.
    pub async fn test(&self, environment: Environment) -> Result<Value, NodeError> {
        let client = self.client(environment)?;
        Ok(public::me(&client).await?)
    }
}
