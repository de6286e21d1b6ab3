//! Caller-facing handle to the store actor.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::StoreConfig;
use crate::store::actor::StoreActor;
use crate::store::types::{InsertRequest, LookupRequest, StoreError, Term};

/// Cloneable entry point to the prefix store.
///
/// Every call is a request/response exchange with the actor: it waits for
/// queue space, then for the reply. Both waits are bounded by the configured
/// request timeout when one is set.
#[derive(Debug, Clone)]
pub struct PrefixStore {
    inserts: mpsc::Sender<InsertRequest>,
    lookups: mpsc::Sender<LookupRequest>,
    timeout: Option<Duration>,
}

impl PrefixStore {
    pub(crate) fn new(
        inserts: mpsc::Sender<InsertRequest>,
        lookups: mpsc::Sender<LookupRequest>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inserts,
            lookups,
            timeout,
        }
    }

    /// Start a store actor on the current runtime and return its handle.
    pub fn spawn(
        config: &StoreConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<()>) {
        let (actor, store) = StoreActor::new(config, shutdown);
        let task = tokio::spawn(actor.run());
        (store, task)
    }

    /// Insert a term, overwriting any existing value for `key`.
    pub async fn insert(&self, key: impl Into<String>, value: Value) -> Result<(), StoreError> {
        let (reply, response) = oneshot::channel();
        let request = InsertRequest {
            term: Term::new(key, value),
            reply,
        };

        self.bounded(async {
            self.inserts
                .send(request)
                .await
                .map_err(|_| StoreError::Unavailable)?;
            response.await.map_err(|_| StoreError::Unavailable)?
        })
        .await
    }

    /// All terms whose key starts with `prefix`, in key order.
    pub async fn lookup_by_prefix(&self, prefix: &str) -> Result<Vec<Term>, StoreError> {
        let (reply, response) = oneshot::channel();
        let request = LookupRequest {
            prefix: prefix.to_string(),
            reply,
        };

        self.bounded(async {
            self.lookups
                .send(request)
                .await
                .map_err(|_| StoreError::Unavailable)?;
            response.await.map_err(|_| StoreError::Unavailable)?
        })
        .await
    }

    /// Run `exchange` under the request timeout, if any.
    ///
    /// A timeout only stops the wait. A request that already reached the
    /// queue is still applied, so an insert reported as `Timeout` may land.
    async fn bounded<T, F>(&self, exchange: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(StoreError::Timeout(limit))),
            None => exchange.await,
        }
    }

    #[cfg(test)]
    pub(crate) fn inserts(&self) -> &mpsc::Sender<InsertRequest> {
        &self.inserts
    }

    #[cfg(test)]
    pub(crate) fn lookups(&self) -> &mpsc::Sender<LookupRequest> {
        &self.lookups
    }
}
