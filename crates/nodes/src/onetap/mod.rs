//! The OneTap resource node.
//!
//! Parameters select a `resource` and an `operation` and carry that
//! operation's fields:
//!
//! ```json
//! { "resource": "profile", "operation": "getAll", "returnAll": true,
//!   "additionalFields": { "search": "ann" } }
//! ```
//!
//! Every input item triggers the selected operation once.  Listing
//! operations emit one item per record; the rest emit a single item.

mod list;
mod participant;
mod passport;
mod profile;
mod punch_pass;

use async_trait::async_trait;
use client::{Environment, OneTapClient, Page, Payload, RecordPath};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::item::handle_failure;
use crate::{ExecutableNode, ExecutionContext, Item, NodeError, OneTapCredentials};

pub use list::ListOperation;
pub use participant::ParticipantOperation;
pub use passport::PassportOperation;
pub use profile::ProfileOperation;
pub use punch_pass::PunchPassOperation;

/// The resource/operation selector and its fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resource", rename_all = "camelCase")]
pub enum Resource {
    Profile(ProfileOperation),
    PunchPasses(PunchPassOperation),
    Participants(ParticipantOperation),
    Lists(ListOperation),
    Passports(PassportOperation),
}

impl Resource {
    async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        match self {
            Self::Profile(op) => op.run(client).await,
            Self::PunchPasses(op) => op.run(client).await,
            Self::Participants(op) => op.run(client).await,
            Self::Lists(op) => op.run(client).await,
            Self::Passports(op) => op.run(client).await,
        }
    }
}

/// Parsed node parameters.
#[derive(Debug, Clone)]
pub struct OneTapParameters {
    pub environment: Environment,
    pub resource: Resource,
}

impl OneTapParameters {
    pub fn from_value(parameters: &Value) -> Result<Self, NodeError> {
        Ok(Self {
            environment: environment(parameters)?,
            resource: serde_json::from_value(parameters.clone())?,
        })
    }
}

/// `environment` parameter, production when absent.
pub(crate) fn environment(parameters: &Value) -> Result<Environment, NodeError> {
    Ok(parameters
        .get("environment")
        .map(|env| serde_json::from_value(env.clone()))
        .transpose()?
        .unwrap_or_default())
}

/// `"<resource> <operation>"` for error messages and logs.
fn operation_label(parameters: &Value) -> String {
    let field = |key: &str| {
        parameters
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned()
    };
    format!("{} {}", field("resource"), field("operation"))
}

// ---------------------------------------------------------------------------
// Shared operation plumbing
// ---------------------------------------------------------------------------

/// Paging fields shared by every listing operation.
///
/// Index-paged endpoints read `page`/`pageSize`, offset-paged ones read
/// `limit`/`skip`; both are ignored when `returnAll` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub return_all: bool,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    #[serde(default)]
    pub additional_fields: Payload,
}

impl Listing {
    /// Query for an index-paged listing; paging keys only on single-page runs.
    pub(crate) fn page_query(&self, default_size: u64) -> Payload {
        let mut query = Payload::new();
        if !self.return_all {
            query.insert("page".to_owned(), self.page.unwrap_or(0).into());
            query.insert("pageSize".to_owned(), self.page_size.unwrap_or(default_size).into());
        }
        query
    }

    /// Query for an offset-paged listing; paging keys only on single-page runs.
    pub(crate) fn offset_query(&self, default_limit: u64) -> Payload {
        let mut query = Payload::new();
        if !self.return_all {
            query.insert("limit".to_owned(), self.limit.unwrap_or(default_limit).into());
            query.insert("skip".to_owned(), self.skip.unwrap_or(0).into());
        }
        query
    }
}

/// One record per array element under `path`, or the whole response.
pub(crate) fn spread(response: Value, path: RecordPath) -> Vec<Value> {
    match path.records(response) {
        Page::Records(records) => records,
        Page::Raw(raw) => vec![raw],
    }
}

/// Fail with `ParamError::Required` when an ID parameter is blank.
pub(crate) fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, NodeError> {
    if value.trim().is_empty() {
        Err(crate::ParamError::Required(name).into())
    } else {
        Ok(value)
    }
}

/// Merge `extra` into `base` (later keys win).
pub(crate) fn merged(mut base: Payload, extra: Payload) -> Payload {
    base.extend(extra);
    base
}

// ---------------------------------------------------------------------------
// OneTapNode
// ---------------------------------------------------------------------------

/// Parameters and client for one item; a bad parameter bag fails that item.
fn prepare(ctx: &ExecutionContext) -> Result<(OneTapParameters, OneTapClient), NodeError> {
    let params = OneTapParameters::from_value(&ctx.parameters)?;
    let client = OneTapCredentials::from_context(ctx)?.client(params.environment.clone())?;
    Ok((params, client))
}

/// Exposes the profile, punch pass, participant, list and passport APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneTapNode;

#[async_trait]
impl ExecutableNode for OneTapNode {
    #[instrument(skip_all, fields(execution_id = %ctx.execution_id, items = items.len()))]
    async fn execute(
        &self,
        items: Vec<Item>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, NodeError> {
        let operation = operation_label(&ctx.parameters);
        info!(%operation, "running OneTap operation");

        let mut output = Vec::new();
        for index in 0..items.len() {
            let result = match prepare(ctx) {
                Ok((params, client)) => params.resource.run(&client).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(records) => {
                    output.extend(records.into_iter().map(|record| Item::paired(record, index)));
                }
                Err(err) => {
                    output.push(handle_failure(ctx, index, &operation, err, json!({}))?);
                }
            }
        }

        info!(%operation, emitted = output.len(), "OneTap operation finished");
        Ok(output)
    }
}
