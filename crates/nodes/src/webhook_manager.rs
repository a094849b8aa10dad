//! Webhook Manager node: registers OneTap integrations (webhook callbacks).
//!
//! ```json
//! { "operation": "register", "webhookUrl": "https://host/webhook",
//!   "events": ["participant.checkin"], "additionalSettings": { "secret": "s" } }
//! ```

use async_trait::async_trait;
use client::endpoints::integrations;
use client::{Environment, OneTapClient, Payload};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::item::handle_failure;
use crate::onetap::environment;
use crate::params::is_unset;
use crate::{ExecutableNode, ExecutionContext, Item, NodeError, OneTapCredentials, ParamError};

const DEFAULT_NAME: &str = "n8n Integration";
const DEFAULT_DESCRIPTION: &str = "Webhook integration created from n8n";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum WebhookOperation {
    Register(Registration),
    Unregister(IntegrationId),
    List,
    Update(UpdateRegistration),
}

impl WebhookOperation {
    fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Unregister(_) => "unregister",
            Self::List => "list",
            Self::Update(_) => "update",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub webhook_url: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub additional_settings: Settings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegistration {
    pub integration_id: String,
    #[serde(flatten)]
    pub registration: Registration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationId {
    pub integration_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    /// Sent back by OneTap as `X-Webhook-Secret` on every delivery.
    pub secret: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Registration {
    fn webhook_settings(&self) -> Result<Value, NodeError> {
        if self.webhook_url.trim().is_empty() {
            return Err(ParamError::Required("webhookUrl").into());
        }
        if self.events.is_empty() {
            return Err(ParamError::Required("events").into());
        }

        let mut settings = json!({
            "url": self.webhook_url,
            "events": self.events,
            "isActive": self.additional_settings.active.unwrap_or(true),
        });
        if let Some(secret) = non_empty(&self.additional_settings.secret) {
            settings["headers"] = json!({ "X-Webhook-Secret": secret });
        }
        Ok(settings)
    }

    /// Body for a new integration; name and description fall back to defaults.
    pub fn register_body(&self) -> Result<Payload, NodeError> {
        let mut body = Payload::new();
        body.insert(
            "name".to_owned(),
            non_empty(&self.additional_settings.name).unwrap_or(DEFAULT_NAME).into(),
        );
        body.insert(
            "description".to_owned(),
            non_empty(&self.additional_settings.description)
                .unwrap_or(DEFAULT_DESCRIPTION)
                .into(),
        );
        body.insert("webhookSettings".to_owned(), self.webhook_settings()?);
        Ok(body)
    }

    /// Body for an update; name and description only when given.
    pub fn update_body(&self) -> Result<Payload, NodeError> {
        let mut body = Payload::new();
        body.insert("webhookSettings".to_owned(), self.webhook_settings()?);
        if let Some(name) = non_empty(&self.additional_settings.name) {
            body.insert("name".to_owned(), name.into());
        }
        if let Some(description) = non_empty(&self.additional_settings.description) {
            body.insert("description".to_owned(), description.into());
        }
        Ok(body)
    }
}

/// Copy the fields of `source` over `target` when it is an object.
fn spread_into(target: &mut Payload, source: &Value) {
    if let Some(fields) = source.as_object() {
        target.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

fn data(response: &Value) -> &Value {
    response.get("data").unwrap_or(&Value::Null)
}

impl WebhookOperation {
    async fn run(
        &self,
        client: &OneTapClient,
        environment: &Environment,
    ) -> Result<Vec<Value>, NodeError> {
        let mut out = Payload::new();
        out.insert("success".to_owned(), true.into());
        out.insert("operation".to_owned(), self.name().into());
        out.insert("environment".to_owned(), environment.to_string().into());

        match self {
            Self::Register(registration) => {
                let response = integrations::register(client, registration.register_body()?).await?;
                let data = data(&response);
                let id = [data.get("id"), response.get("id")]
                    .into_iter()
                    .flatten()
                    .find(|id| !is_unset(id));
                if let Some(id) = id {
                    out.insert("integrationId".to_owned(), id.clone());
                }
                if let Some(key) = data.get("apiKey") {
                    out.insert("apiKey".to_owned(), key.clone());
                }
                out.insert("webhookUrl".to_owned(), registration.webhook_url.clone().into());
                out.insert("events".to_owned(), json!(registration.events));
                spread_into(&mut out, data);
            }
            Self::Unregister(target) => {
                let id = target.integration_id.trim();
                if id.is_empty() {
                    return Err(ParamError::Required("integrationId").into());
                }
                let response = integrations::delete(client, id).await?;
                out.insert("integrationId".to_owned(), id.into());
                spread_into(&mut out, &response);
            }
            Self::List => {
                out.remove("success");
                let response = integrations::list(client).await?;
                if let Some(found) = data(&response).as_array() {
                    return Ok(found
                        .iter()
                        .map(|integration| {
                            let mut item = out.clone();
                            spread_into(&mut item, integration);
                            Value::Object(item)
                        })
                        .collect());
                }
                spread_into(&mut out, &response);
            }
            Self::Update(update) => {
                let id = update.integration_id.trim();
                if id.is_empty() {
                    return Err(ParamError::Required("integrationId").into());
                }
                let response =
                    integrations::update(client, id, update.registration.update_body()?).await?;
                out.insert("integrationId".to_owned(), id.into());
                spread_into(&mut out, data(&response));
            }
        }

        Ok(vec![Value::Object(out)])
    }
}

/// Operation, client and environment for one item.
fn prepare(
    ctx: &ExecutionContext,
) -> Result<(WebhookOperation, OneTapClient, Environment), NodeError> {
    let environment = environment(&ctx.parameters)?;
    let operation: WebhookOperation = serde_json::from_value(ctx.parameters.clone())?;
    let client = OneTapCredentials::from_context(ctx)?.client(environment.clone())?;
    Ok((operation, client, environment))
}

/// Manages the OneTap integrations that deliver webhooks to the trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookManagerNode;

#[async_trait]
impl ExecutableNode for WebhookManagerNode {
    #[instrument(skip_all, fields(execution_id = %ctx.execution_id, items = items.len()))]
    async fn execute(
        &self,
        items: Vec<Item>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, NodeError> {
        let name = ctx
            .parameters
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned();
        let label = format!("webhook {name}");

        info!(operation = %name, "managing OneTap webhooks");

        let mut output = Vec::new();
        for index in 0..items.len() {
            let result = match prepare(ctx) {
                Ok((operation, client, environment)) => operation.run(&client, &environment).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(records) => {
                    output.extend(records.into_iter().map(|record| Item::paired(record, index)));
                }
                Err(err) => {
                    let error_json = json!({ "success": false, "operation": name });
                    output.push(handle_failure(ctx, index, &label, err, error_json)?);
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(v: Value) -> Registration {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn register_body_fills_defaults() {
        let body = registration(json!({
            "webhookUrl": "https://hooks.example/onetap",
            "events": ["participant.checkin"]
        }))
        .register_body()
        .unwrap();

        assert_eq!(
            Value::Object(body),
            json!({
                "name": DEFAULT_NAME,
                "description": DEFAULT_DESCRIPTION,
                "webhookSettings": {
                    "url": "https://hooks.example/onetap",
                    "events": ["participant.checkin"],
                    "isActive": true
                }
            })
        );
    }

    #[test]
    fn secret_becomes_webhook_header() {
        let body = registration(json!({
            "webhookUrl": "https://hooks.example/onetap",
            "events": ["*"],
            "additionalSettings": { "secret": "s3cret", "active": false, "name": "" }
        }))
        .update_body()
        .unwrap();

        assert_eq!(body["webhookSettings"]["headers"]["X-Webhook-Secret"], "s3cret");
        assert_eq!(body["webhookSettings"]["isActive"], false);
        assert!(!body.contains_key("name"));
    }

    #[test]
    fn missing_events_are_rejected() {
        let err = registration(json!({ "webhookUrl": "https://hooks.example" }))
            .register_body()
            .unwrap_err();
        assert!(matches!(err, NodeError::Param(ParamError::Required("events"))));
    }
}
