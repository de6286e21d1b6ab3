//! Store data types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

/// A key with its arbitrary JSON value.
///
/// Doubles as the request body for inserts and as an entry in lookup
/// payloads. Missing fields decode to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub key: String,
    pub value: Value,
}

impl Term {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Store errors.
///
/// A lookup with no matches is not an error; it yields an empty list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("term key must not be empty")]
    EmptyKey,

    #[error("store actor is not running")]
    Unavailable,

    #[error("store did not reply within {0:?}")]
    Timeout(Duration),
}

/// Insert submitted to the actor.
#[derive(Debug)]
pub(crate) struct InsertRequest {
    pub term: Term,
    pub reply: oneshot::Sender<Result<(), StoreError>>,
}

/// Prefix lookup submitted to the actor.
#[derive(Debug)]
pub(crate) struct LookupRequest {
    pub prefix: String,
    pub reply: oneshot::Sender<Result<Vec<Term>, StoreError>>,
}
