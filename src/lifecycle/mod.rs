//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Spawn store actor → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast stop → Server drains → Store actor exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The store actor does not drain its queues on stop

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
