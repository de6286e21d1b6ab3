//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with both handlers
//! - Wrap routes in the request pipeline
//! - Wire up ambient layers (request ID, body limit, CORS)
//! - Serve with connect info and graceful shutdown

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::config::{CorsConfig, SuggestConfig};
use crate::http::handlers::{get_suggestions, insert_term, AppState};
use crate::http::pipeline;
use crate::store::PrefixStore;

/// HTTP server for the suggestion service.
pub struct SuggestServer {
    router: Router,
}

impl SuggestServer {
    /// Create a new HTTP server backed by `store`.
    pub fn new(config: &SuggestConfig, store: PrefixStore) -> Self {
        let state = AppState {
            store,
            strict_validation: config.security.strict_validation,
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &SuggestConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route("/", get(get_suggestions).post(insert_term))
            .with_state(state);

        let router = pipeline::apply(routes)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        match cors_layer(&config.cors) {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    /// The fully layered router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Translate the CORS policy into a layer; `None` when CORS is disabled.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.is_enabled() {
        return None;
    }

    let origins = if config.allow_origin.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allow_origin
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };
    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(config.allow_credentials)
        .expose_headers(header_names(&config.expose_headers))
        .allow_headers(header_names(&config.allow_headers));
    if config.max_age_secs > 0 {
        layer = layer.max_age(Duration::from_secs(config.max_age_secs));
    }

    tracing::info!(
        allow_origin = ?config.allow_origin,
        allow_credentials = config.allow_credentials,
        expose_headers = ?config.expose_headers,
        allow_headers = ?config.allow_headers,
        max_age_secs = config.max_age_secs,
        "CORS policy configured"
    );
    Some(layer)
}

fn header_names(names: &[String]) -> Vec<HeaderName> {
    names.iter().filter_map(|n| n.parse().ok()).collect()
}
