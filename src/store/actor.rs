//! The store worker.
//!
//! # Responsibilities
//! - Own the prefix tree for the lifetime of the store
//! - Pull requests off the insert and lookup queues one at a time
//! - Reply on each request's private channel
//!
//! # Design Decisions
//! - When both queues are ready the worker alternates between them
//! - Stopping does not drain the queues; dropping them drops every pending
//!   reply sender, so waiting callers see `StoreError::Unavailable`

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::store::handle::PrefixStore;
use crate::store::tree::PrefixTree;
use crate::store::types::{InsertRequest, LookupRequest, StoreError, Term};

enum Message {
    Insert(InsertRequest),
    Lookup(LookupRequest),
}

/// Single worker that serializes every operation against the tree.
pub struct StoreActor {
    tree: PrefixTree<Value>,
    inserts: mpsc::Receiver<InsertRequest>,
    lookups: mpsc::Receiver<LookupRequest>,
    shutdown: broadcast::Receiver<()>,
    prefer_lookups: bool,
}

impl StoreActor {
    /// Create the actor and the handle callers submit requests through.
    ///
    /// The actor does nothing until [`StoreActor::run`] is polled.
    pub fn new(config: &StoreConfig, shutdown: broadcast::Receiver<()>) -> (Self, PrefixStore) {
        // mpsc channels cannot have zero capacity.
        let (insert_tx, insert_rx) = mpsc::channel(config.insert_queue_depth.max(1));
        let (lookup_tx, lookup_rx) = mpsc::channel(config.lookup_queue_depth.max(1));

        let actor = Self {
            tree: PrefixTree::new(),
            inserts: insert_rx,
            lookups: lookup_rx,
            shutdown,
            prefer_lookups: true,
        };
        let handle = PrefixStore::new(insert_tx, lookup_tx, config.request_timeout());
        (actor, handle)
    }

    /// Run the worker loop until shutdown is signalled.
    pub async fn run(mut self) {
        tracing::info!(
            insert_capacity = self.inserts.max_capacity(),
            lookup_capacity = self.lookups.max_capacity(),
            "Store actor starting"
        );

        while let Some(message) = self.next_message().await {
            match message {
                Message::Insert(request) => self.handle_insert(request),
                Message::Lookup(request) => self.handle_lookup(request),
            }
        }

        tracing::info!(terms = self.tree.len(), "Store actor stopped");
    }

    async fn next_message(&mut self) -> Option<Message> {
        let lookups_first = self.prefer_lookups;
        self.prefer_lookups = !self.prefer_lookups;

        if lookups_first {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => None,
                Some(request) = self.lookups.recv() => Some(Message::Lookup(request)),
                Some(request) = self.inserts.recv() => Some(Message::Insert(request)),
                else => None,
            }
        } else {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => None,
                Some(request) = self.inserts.recv() => Some(Message::Insert(request)),
                Some(request) = self.lookups.recv() => Some(Message::Lookup(request)),
                else => None,
            }
        }
    }

    fn handle_insert(&mut self, request: InsertRequest) {
        let InsertRequest { term, reply } = request;

        let outcome = if term.key.is_empty() {
            Err(StoreError::EmptyKey)
        } else {
            self.tree.insert(&term.key, term.value);
            Ok(())
        };

        metrics::record_store_operation("insert", outcome.is_ok());
        metrics::record_store_terms(self.tree.len());
        tracing::debug!(key = %term.key, ok = outcome.is_ok(), "Insert applied");

        if reply.send(outcome).is_err() {
            tracing::debug!(key = %term.key, "Insert caller gone before reply");
        }
    }

    fn handle_lookup(&mut self, request: LookupRequest) {
        let LookupRequest { prefix, reply } = request;

        let mut terms = Vec::new();
        self.tree
            .walk_prefix(&prefix, |key, value| terms.push(Term::new(key, value.clone())));

        metrics::record_store_operation("lookup", true);
        tracing::debug!(prefix = %prefix, matches = terms.len(), "Lookup served");

        if reply.send(Ok(terms)).is_err() {
            tracing::debug!(prefix = %prefix, "Lookup caller gone before reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_alternates_when_both_queues_ready() {
        let shutdown = Shutdown::new();
        let (mut actor, store) = StoreActor::new(&StoreConfig::default(), shutdown.subscribe());

        let (insert_reply, _insert_rx) = oneshot::channel();
        let (lookup_reply, _lookup_rx) = oneshot::channel();
        store
            .inserts()
            .try_send(InsertRequest { term: Term::new("a", json!(1)), reply: insert_reply })
            .unwrap();
        store
            .lookups()
            .try_send(LookupRequest { prefix: String::new(), reply: lookup_reply })
            .unwrap();

        let first = actor.next_message().await.unwrap();
        let second = actor.next_message().await.unwrap();
        assert!(matches!(first, Message::Lookup(_)));
        assert!(matches!(second, Message::Insert(_)));
    }

    #[tokio::test]
    async fn test_insert_queue_is_not_starved() {
        let shutdown = Shutdown::new();
        let config = StoreConfig {
            insert_queue_depth: 4,
            lookup_queue_depth: 4,
            ..StoreConfig::default()
        };
        let (mut actor, store) = StoreActor::new(&config, shutdown.subscribe());

        let mut replies = Vec::new();
        for _ in 0..4 {
            let (reply, rx) = oneshot::channel();
            replies.push(rx);
            store
                .lookups()
                .try_send(LookupRequest { prefix: String::new(), reply })
                .unwrap();
        }
        let (reply, _rx) = oneshot::channel();
        store
            .inserts()
            .try_send(InsertRequest { term: Term::new("k", json!(null)), reply })
            .unwrap();

        let mut picked = Vec::new();
        for _ in 0..3 {
            picked.push(matches!(actor.next_message().await, Some(Message::Insert(_))));
        }
        assert!(picked.contains(&true), "insert should be picked within two turns");
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let shutdown = Shutdown::new();
        let (actor, store) = StoreActor::new(&StoreConfig::default(), shutdown.subscribe());
        let task = tokio::spawn(actor.run());

        assert_eq!(store.insert("", json!(1)).await, Err(StoreError::EmptyKey));
        assert!(store.lookup_by_prefix("").await.unwrap().is_empty());

        shutdown.trigger();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_full_queue_blocks_caller() {
        let shutdown = Shutdown::new();
        let config = StoreConfig {
            lookup_queue_depth: 1,
            ..StoreConfig::default()
        };
        let (mut actor, store) = StoreActor::new(&config, shutdown.subscribe());

        let (reply, _first) = oneshot::channel();
        store
            .lookups()
            .try_send(LookupRequest { prefix: "a".to_string(), reply })
            .unwrap();

        let (reply, _second) = oneshot::channel();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            store.lookups().send(LookupRequest { prefix: "b".to_string(), reply }),
        )
        .await;
        assert!(blocked.is_err(), "send should wait while the queue is full");

        // Taking one request off the queue frees the slot.
        assert!(matches!(actor.next_message().await, Some(Message::Lookup(_))));
        let (reply, _third) = oneshot::channel();
        store
            .lookups()
            .send(LookupRequest { prefix: "c".to_string(), reply })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_queued_request_sees_unavailable_after_stop() {
        let shutdown = Shutdown::new();
        let config = StoreConfig {
            request_timeout_ms: 0,
            ..StoreConfig::default()
        };
        let (actor, store) = StoreActor::new(&config, shutdown.subscribe());

        let caller = tokio::spawn({
            let store = store.clone();
            async move { store.insert("queued", json!(1)).await }
        });
        while store.inserts().capacity() == store.inserts().max_capacity() {
            tokio::task::yield_now().await;
        }

        shutdown.trigger();
        actor.run().await;

        assert_eq!(caller.await.unwrap(), Err(StoreError::Unavailable));
    }
}
