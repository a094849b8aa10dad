//! The OneTap trigger: check-in, check-out, participant and profile events,
//! either polled from the API or received as webhook calls.
//!
//! ```json
//! { "triggerOn": "checkin", "triggerMethod": "polling", "pollInterval": 5,
//!   "listId": "l1", "additionalFilters": { "method": ["QR"] } }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use client::endpoints::{participants, profiles};
use client::{Environment, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::params::{epoch_seconds, insert_set, is_unset};
use crate::{ExecutionContext, Item, NodeError, OneTapCredentials, TriggerNode};

/// Records fetched per poll.
const POLL_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerOn {
    #[default]
    Checkin,
    Checkout,
    Participant,
    Profile,
}

impl TriggerOn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::Checkout => "checkout",
            Self::Participant => "participant",
            Self::Profile => "profile",
        }
    }

    /// Field holding the moment the event happened.
    fn timestamp_key(self) -> &'static str {
        match self {
            Self::Checkin => "checkInDate",
            Self::Checkout => "checkOutDate",
            Self::Participant | Self::Profile => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMethod {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalFilters {
    /// Accepted check-in/check-out methods; empty accepts all.
    pub method: Vec<String>,
    /// Substring the event's `source` must contain.
    pub source: Option<String>,
}

impl AdditionalFilters {
    fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    /// `None` when no source filter is set or the event has no source.
    fn source_match(&self, event: &Payload) -> Option<bool> {
        let wanted = self.source()?;
        let source = event
            .get("source")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())?;
        Some(source.contains(wanted))
    }

    /// Polled records must carry a matching source once a filter is set.
    fn polled_source_ok(&self, event: &Payload) -> bool {
        self.source().is_none() || self.source_match(event) == Some(true)
    }

    /// Webhook payloads without a source pass the filter.
    fn webhook_source_ok(&self, event: &Payload) -> bool {
        self.source_match(event) != Some(false)
    }
}

fn default_poll_interval() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub trigger_on: TriggerOn,
    #[serde(default)]
    pub trigger_method: TriggerMethod,
    /// Minutes between polls; also the lookback window of each poll.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub additional_filters: AdditionalFilters,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            trigger_on: TriggerOn::default(),
            trigger_method: TriggerMethod::default(),
            poll_interval: default_poll_interval(),
            list_id: None,
            profile_id: None,
            additional_filters: AdditionalFilters::default(),
        }
    }
}

impl TriggerConfig {
    fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref().filter(|s| !s.is_empty())
    }

    fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref().filter(|s| !s.is_empty())
    }
}

/// An inbound webhook call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookRequest {
    pub body: Value,
    pub headers: Payload,
    pub query: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Event(Item),
    /// Not an object, or filtered out by the trigger configuration.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct OneTapTrigger {
    config: TriggerConfig,
}

impl OneTapTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn from_parameters(parameters: &Value) -> Result<Self, NodeError> {
        Ok(Self::new(serde_json::from_value(parameters.clone())?))
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Query for the poll request, looking back to `since`.
    pub fn poll_query(&self, since: i64) -> Payload {
        let config = &self.config;
        let mut query = Payload::new();

        match config.trigger_on {
            TriggerOn::Checkin | TriggerOn::Checkout => {
                let checkin = config.trigger_on == TriggerOn::Checkin;
                query.insert("limit".to_owned(), POLL_LIMIT.into());
                query.insert("skip".to_owned(), 0.into());
                query.insert(
                    "sortField".to_owned(),
                    config.trigger_on.timestamp_key().into(),
                );
                query.insert("sortOrder".to_owned(), "desc".into());
                let (since_key, flag) = if checkin {
                    ("gtCheckInDate", "checkedIn")
                } else {
                    ("gtCheckOutDate", "checkedOut")
                };
                query.insert(since_key.to_owned(), since.into());
                query.insert(flag.to_owned(), true.into());
                if let Some(profile_id) = config.profile_id() {
                    insert_set(&mut query, "profileId", profile_id);
                }
            }
            TriggerOn::Participant => {
                query.insert("limit".to_owned(), POLL_LIMIT.into());
                query.insert("skip".to_owned(), 0.into());
                query.insert("sortField".to_owned(), "createdAt".into());
                query.insert("sortOrder".to_owned(), "desc".into());
            }
            TriggerOn::Profile => {
                query.insert("page".to_owned(), 0.into());
                query.insert("pageSize".to_owned(), POLL_LIMIT.into());
                query.insert("sortBy".to_owned(), "createdAt".into());
                query.insert("sortOrder".to_owned(), "desc".into());
                return query;
            }
        }

        if let Some(list_id) = config.list_id() {
            insert_set(&mut query, "listId", list_id);
        }
        query
    }

    async fn fetch(
        &self,
        ctx: &ExecutionContext,
        since: i64,
    ) -> Result<Vec<Value>, NodeError> {
        let client = OneTapCredentials::from_context(ctx)?.client(self.config.environment.clone())?;
        let query = self.poll_query(since);
        let records = match self.config.trigger_on {
            TriggerOn::Profile => profiles::list(&client, query, false).await?,
            _ => participants::list(&client, query, false).await?,
        };
        Ok(records)
    }

    /// Whether a polled record passes the time window and filters.
    fn accepts_polled(&self, event: &Payload, since: i64) -> bool {
        let trigger_on = self.config.trigger_on;
        let filters = &self.config.additional_filters;

        // A missing timestamp keeps the record; an unreadable one drops it.
        let recent = match event.get(trigger_on.timestamp_key()).filter(|ts| !is_unset(ts)) {
            None => true,
            Some(ts) => event_timestamp(ts).is_some_and(|ts| ts > since),
        };

        let method_ok = match trigger_on {
            TriggerOn::Checkin | TriggerOn::Checkout if !filters.method.is_empty() => {
                let key = if trigger_on == TriggerOn::Checkin {
                    "checkInMethod"
                } else {
                    "checkOutMethod"
                };
                event
                    .get(key)
                    .and_then(Value::as_str)
                    .is_some_and(|method| filters.method.iter().any(|m| m == method))
            }
            _ => true,
        };

        recent && method_ok && filters.polled_source_ok(event)
    }

    /// Whether a webhook payload passes the ID, method and source filters.
    /// Fields missing from the payload never reject it.
    fn accepts_webhook(&self, body: &Payload) -> bool {
        let config = &self.config;
        let mismatch = |wanted: Option<&str>, key: &str| match (wanted, body.get(key)) {
            (Some(wanted), Some(Value::String(got))) if !got.is_empty() => got != wanted,
            _ => false,
        };
        if mismatch(config.list_id(), "listId") || mismatch(config.profile_id(), "profileId") {
            return false;
        }

        let filters = &config.additional_filters;
        if !filters.method.is_empty() {
            let method = ["method", "checkInMethod", "checkOutMethod"]
                .into_iter()
                .filter_map(|key| body.get(key).and_then(Value::as_str))
                .find(|m| !m.is_empty());
            if let Some(method) = method {
                if !filters.method.iter().any(|m| m == method) {
                    return false;
                }
            }
        }

        filters.webhook_source_ok(body)
    }

    fn decorate(&self, mut event: Payload, now: DateTime<Utc>) -> Payload {
        event.insert("triggerType".to_owned(), self.config.trigger_on.as_str().into());
        event.insert("environment".to_owned(), self.config.environment.to_string().into());
        event.insert("triggeredAt".to_owned(), now.timestamp().into());
        event
    }
}

/// Event time in epoch seconds: numbers are taken as seconds, strings parsed
/// as dates.
fn event_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().map(|secs| secs.floor() as i64),
        Value::String(_) => epoch_seconds("timestamp", value).ok(),
        _ => None,
    }
}

#[async_trait]
impl TriggerNode for OneTapTrigger {
    #[instrument(skip_all, fields(trigger_on = self.config.trigger_on.as_str()))]
    async fn poll(&self, ctx: &ExecutionContext, now: DateTime<Utc>) -> Vec<Item> {
        let lookback = i64::try_from(self.config.poll_interval.saturating_mul(60)).unwrap_or(i64::MAX);
        let since = now.timestamp().saturating_sub(lookback);

        let records = match self.fetch(ctx, since).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "poll failed, no events emitted");
                return Vec::new();
            }
        };

        let fetched = records.len();
        let events: Vec<Item> = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(event) => Some(event),
                other => {
                    debug!(record = %other, "skipping non-object record");
                    None
                }
            })
            .filter(|event| self.accepts_polled(event, since))
            .map(|event| Item::new(Value::Object(self.decorate(event, now))))
            .collect();

        info!(fetched, emitted = events.len(), "poll finished");
        events
    }

    fn webhook(&self, request: WebhookRequest, now: DateTime<Utc>) -> WebhookOutcome {
        let Value::Object(body) = request.body else {
            debug!("webhook body is not an object, ignoring");
            return WebhookOutcome::Ignored;
        };
        if !self.accepts_webhook(&body) {
            debug!("webhook filtered out");
            return WebhookOutcome::Ignored;
        }

        let mut event = self.decorate(body, now);
        event.insert("headers".to_owned(), Value::Object(request.headers));
        event.insert("query".to_owned(), Value::Object(request.query));
        WebhookOutcome::Event(Item::new(Value::Object(event)))
    }
}
