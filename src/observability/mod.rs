//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline logging stage and store actor produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, when enabled)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
