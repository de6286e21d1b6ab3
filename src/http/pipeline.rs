//! Request pipeline stages.
//!
//! # Composition (outermost → innermost)
//! ```text
//! logging_stage → response_stage → recovery (CatchPanicLayer) → handler
//! ```
//!
//! - Logging sees the final encoded response, including 415s and panics
//! - Response short-circuits unsupported `Accept` values before anything
//!   else runs, and encodes whatever the inner chain staged
//! - Recovery sits closest to the handler so its replacement result still
//!   goes through the response stage's encoder
//! - A staged result that cannot be encoded is replaced by the fixed failure
//!   envelope in the same representation

use std::any::Any;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::response::{Representation, Staged};
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

/// Wrap every matched route of `router` in the fixed stage order.
///
/// Unmatched paths and methods keep the router's own 404 and 405.
pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(logging_stage))
            .layer(middleware::from_fn(response_stage))
            .layer(CatchPanicLayer::custom(recover_from_panic)),
    )
}

/// Log method, URI, remote address, status and elapsed time once the inner
/// chain has produced its response.
pub async fn logging_stage(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        remote_addr = %remote_addr,
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed = ?start.elapsed(),
        "Request served"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}

/// Negotiate the body format, run the inner chain, then encode its staged
/// result.
pub async fn response_stage(request: Request, next: Next) -> Response {
    let Some(representation) = Representation::negotiate(request.headers()) else {
        tracing::debug!(
            accept = ?request.headers().get(header::ACCEPT),
            "Unsupported representation requested"
        );
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    };

    let response = next.run(request).await;
    let (mut parts, _) = response.into_parts();

    let staged = parts.extensions.remove::<Staged>().unwrap_or_else(|| {
        tracing::warn!(status = %parts.status, "Inner chain staged no result");
        Staged::unhandled()
    });

    let (staged, body) = match representation.encode(&staged.envelope) {
        Ok(body) => (staged, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response, sending failure envelope");
            let fallback = Staged::unhandled();
            match representation.encode(&fallback.envelope) {
                Ok(body) => (fallback, body),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode failure envelope");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
    };
    tracing::debug!(status = %staged.status, envelope = ?staged.envelope, "Response staged");

    parts.status = staged.status;
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(representation.content_type()),
    );
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}

/// Replace a panicking handler's response with the fixed failure result.
pub fn recover_from_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Application panic");

    Staged::unhandled().into_response()
}
