//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Router};
use suggest::http::Staged;
use suggest::{PrefixStore, Shutdown, SuggestConfig, SuggestServer};
use tokio::net::TcpListener;

/// A running service bound to an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the full service with the given configuration.
#[allow(dead_code)]
pub async fn start_server(config: SuggestConfig) -> TestServer {
    let shutdown = Shutdown::new();
    let (store, _task) = PrefixStore::spawn(&config.store, shutdown.subscribe());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = SuggestServer::new(&config, store);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Serve an arbitrary router wrapped in the request pipeline.
#[allow(dead_code)]
pub async fn start_pipeline(routes: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = suggest::http::pipeline::apply(routes)
        .into_make_service_with_connect_info::<SocketAddr>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn explode() -> Staged {
    panic!("injected fault");
}

async fn healthy() -> Staged {
    Staged::new(StatusCode::OK, "still serving")
}

/// `/panic` always panics, `/ok` always succeeds.
#[allow(dead_code)]
pub fn faulty_routes() -> Router {
    Router::new()
        .route("/panic", get(explode))
        .route("/ok", get(healthy))
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
