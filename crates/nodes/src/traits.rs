//! The node traits: the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::trigger::{WebhookOutcome, WebhookRequest};
use crate::{Item, NodeError};

/// Shared context passed to every node during execution.
///
/// The host resolves parameters and injects credentials; nodes only read
/// them from here.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the current execution run, used for log correlation.
    pub execution_id: Uuid,
    /// The node's resolved parameter bag.
    pub parameters: Value,
    /// Decrypted secrets scoped to this node's credential.
    pub secrets: HashMap<String, String>,
    /// Turn item failures into error items instead of aborting the run.
    pub continue_on_fail: bool,
}

impl ExecutionContext {
    pub fn new(parameters: Value) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            parameters,
            secrets: HashMap::new(),
            continue_on_fail: false,
        }
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), value.into());
        self
    }

    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }
}

/// An action node.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Process the input items in order and return the output items, each
    /// paired with the index of the input item it came from.
    async fn execute(
        &self,
        items: Vec<Item>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, NodeError>;
}

/// An event source node.
///
/// Polling never fails: an unsuccessful poll yields no events.
#[async_trait]
pub trait TriggerNode: Send + Sync {
    /// Look for events newer than one poll interval before `now`.
    async fn poll(&self, ctx: &ExecutionContext, now: DateTime<Utc>) -> Vec<Item>;

    /// Filter and decorate an inbound webhook call.
    fn webhook(&self, request: WebhookRequest, now: DateTime<Utc>) -> WebhookOutcome;
}
