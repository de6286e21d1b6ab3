//! Prefix-based term suggestion service.
//!
//! Clients insert `{key, value}` terms and ask for every term whose key
//! starts with a prefix. A single actor owns the prefix tree; an axum
//! pipeline wraps every request with logging, response encoding and panic
//! recovery.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::SuggestConfig;
pub use http::SuggestServer;
pub use lifecycle::Shutdown;
pub use store::{PrefixStore, StoreError, Term};
