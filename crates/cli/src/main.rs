//! `onetap-nodes` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`: execute the OneTap or Webhook Manager node once.
//! - `poll`: poll for trigger events.
//! - `serve`: listen for OneTap webhook calls.
//! - `test-credentials`: check an API key against `/api/public/me`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use client::Environment;
use nodes::credentials::API_KEY;
use nodes::{
    ExecutableNode, ExecutionContext, Item, OneTapCredentials, OneTapNode, OneTapTrigger,
    TriggerNode, WebhookManagerNode,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "onetap-nodes",
    about = "OneTap check-in nodes: profiles, participants, lists, passports and webhooks",
    version
)]
struct Cli {
    /// OneTap API key.
    #[arg(long, env = "ONETAP_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a node with the parameters in a JSON file.
    Run {
        /// Node parameters. `"node": "webhookManager"` selects the Webhook Manager.
        #[arg(long)]
        params: PathBuf,
        /// JSON array of input items; defaults to one empty item.
        #[arg(long)]
        items: Option<PathBuf>,
        /// Turn item failures into error items.
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Poll for trigger events, once or every poll interval.
    Poll {
        #[arg(long)]
        trigger: PathBuf,
        #[arg(long)]
        once: bool,
    },
    /// Receive webhook calls and print accepted events.
    Serve {
        #[arg(long)]
        trigger: PathBuf,
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Validate the API key.
    TestCredentials {
        #[arg(long, default_value = "production")]
        environment: Environment,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            params,
            items,
            continue_on_fail,
        } => {
            let parameters = read_json(&params)?;
            let items = match items {
                Some(path) => read_items(&path)?,
                None => vec![Item::new(Value::Object(Default::default()))],
            };
            let ctx = context(parameters.clone(), cli.api_key)?
                .with_continue_on_fail(continue_on_fail);

            let node: Box<dyn ExecutableNode> =
                match parameters.get("node").and_then(Value::as_str) {
                    Some("webhookManager") => Box::new(WebhookManagerNode),
                    Some("onetap") | None => Box::new(OneTapNode),
                    Some(other) => bail!("unknown node '{other}'"),
                };
            let output = node.execute(items, &ctx).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Poll { trigger, once } => {
            let trigger = OneTapTrigger::from_parameters(&read_json(&trigger)?)?;
            let ctx = context(Value::Object(Default::default()), cli.api_key)?;
            let interval = Duration::from_secs(trigger.config().poll_interval.max(1) * 60);

            loop {
                for event in trigger.poll(&ctx, chrono::Utc::now()).await {
                    println!("{}", serde_json::to_string(&event.json)?);
                }
                if once {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Serve { trigger, bind } => {
            let trigger = OneTapTrigger::from_parameters(&read_json(&trigger)?)?;
            let (tx, mut rx) = mpsc::channel::<Item>(64);

            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match serde_json::to_string(&event.json) {
                        Ok(line) => println!("{line}"),
                        Err(err) => tracing::warn!(error = %err, "cannot print event"),
                    }
                }
            });

            api::serve(&bind, api::AppState::new(trigger, tx)).await?;
            printer.await?;
        }
        Command::TestCredentials { environment } => {
            let api_key = cli.api_key.context("an API key is required (--api-key or ONETAP_API_KEY)")?;
            info!(%environment, "testing OneTap credentials");
            let me = OneTapCredentials::new(api_key).test(environment).await?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_items(path: &Path) -> anyhow::Result<Vec<Item>> {
    match read_json(path)? {
        Value::Array(values) => Ok(values.into_iter().map(Item::new).collect()),
        _ => bail!("{} must contain a JSON array of items", path.display()),
    }
}

fn context(parameters: Value, api_key: Option<String>) -> anyhow::Result<ExecutionContext> {
    let api_key = api_key.context("an API key is required (--api-key or ONETAP_API_KEY)")?;
    Ok(ExecutionContext::new(parameters).with_secret(API_KEY, api_key))
}
