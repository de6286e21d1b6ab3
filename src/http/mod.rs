//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS, request ID, body limit)
//!     → pipeline.rs (logging → response → recovery)
//!     → handlers.rs (lookup / insert against the store)
//!     → response.rs (staged envelope, JSON or XML encoding)
//!     → Send to client
//! ```

pub mod handlers;
pub mod pipeline;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use response::{Envelope, Representation, Staged};
pub use server::SuggestServer;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";
