//! Node-level error types.

use client::ApiError;
use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// Every failure is treated the same way: nothing is retried.  The host
/// either turns it into an error item (failure tolerance) or aborts.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The parameter bag could not be deserialized.
    #[error("invalid node parameters: {0}")]
    InvalidParameters(#[from] serde_json::Error),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("missing credential '{0}'")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A failure while processing one input item, tagged with its index.
    #[error("item {index}: {operation} failed: {source}")]
    Item {
        index: usize,
        operation: String,
        #[source]
        source: Box<NodeError>,
    },
}

impl NodeError {
    /// The index of the failing input item, if known.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Self::Item { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A single parameter value that cannot be turned into a request payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("'{key}' is not a valid date: {value}")]
    InvalidDate { key: String, value: String },

    #[error("'{0}' is required")]
    Required(&'static str),
}
