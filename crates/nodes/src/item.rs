//! Items: the unit of data flowing between nodes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::{ExecutionContext, NodeError};

/// One record plus a back-reference to the input item it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl Item {
    /// An item with no origin, e.g. a trigger event or an initial input.
    pub fn new(json: Value) -> Self {
        Self {
            json,
            paired_item: None,
        }
    }

    pub fn paired(json: Value, index: usize) -> Self {
        Self {
            json,
            paired_item: Some(index),
        }
    }
}

/// Apply the failure policy to one item's error.
///
/// With `continue_on_fail` the error becomes an output item built from
/// `error_json` (which receives the message under `error`); otherwise the
/// error is returned tagged with the item index and operation.
pub(crate) fn handle_failure(
    ctx: &ExecutionContext,
    index: usize,
    operation: &str,
    err: NodeError,
    mut error_json: Value,
) -> Result<Item, NodeError> {
    if !ctx.continue_on_fail {
        return Err(NodeError::Item {
            index,
            operation: operation.to_owned(),
            source: Box::new(err),
        });
    }

    warn!(index, operation, error = %err, "item failed, continuing");
    if let Some(obj) = error_json.as_object_mut() {
        obj.insert("error".to_owned(), json!(err.to_string()));
    }
    Ok(Item::paired(error_json, index))
}
