//! Prefix store subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → handle.rs (PrefixStore: build request + one-shot reply channel)
//!     → bounded insert / lookup queue
//!     → actor.rs (single worker, one operation at a time)
//!     → tree.rs (radix tree, owned by the worker)
//!     → reply channel → handler
//! ```
//!
//! # Design Decisions
//! - The tree is owned by exactly one task; nothing else can reach it
//! - Queue depth is a backpressure knob: a full queue blocks the caller
//! - Every exchange is bounded by the request timeout when configured
//! - Lookups return terms in lexicographic key order

pub mod actor;
pub mod handle;
pub mod tree;
pub mod types;

pub use actor::StoreActor;
pub use handle::PrefixStore;
pub use tree::PrefixTree;
pub use types::{StoreError, Term};
