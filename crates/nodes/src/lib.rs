//! `nodes` crate: the node traits and the OneTap node implementations.
//!
//! Every executable node implements [`ExecutableNode`]; the trigger also
//! implements [`TriggerNode`].  The host drives execution through these
//! trait objects and supplies parameters and secrets via
//! [`ExecutionContext`].

pub mod credentials;
pub mod error;
pub mod item;
pub mod onetap;
pub mod params;
pub mod traits;
pub mod trigger;
pub mod webhook_manager;

pub use credentials::OneTapCredentials;
pub use error::{NodeError, ParamError};
pub use item::Item;
pub use onetap::OneTapNode;
pub use traits::{ExecutableNode, ExecutionContext, TriggerNode};
pub use trigger::{OneTapTrigger, TriggerConfig, WebhookOutcome, WebhookRequest};
pub use webhook_manager::WebhookManagerNode;
