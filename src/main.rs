//! Term suggestion service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ CORS / request ID
//!                         │
//!                         ▼
//!                  logging stage ──▶ response stage ──▶ recovery ──▶ handler
//!                                                                      │
//!                                                                      ▼
//!                                                   PrefixStore ──▶ insert / lookup queues
//!                                                                      │
//!                                                                      ▼
//!                                                           StoreActor (owns the tree)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use suggest::config::load_config;
use suggest::lifecycle::{signals, Shutdown};
use suggest::observability::{logging, metrics};
use suggest::{PrefixStore, SuggestServer};

#[derive(Parser)]
#[command(name = "suggest")]
#[command(about = "Prefix-based term suggestion service", long_about = None)]
struct Args {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding both the file and ADDR.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Any configuration problem is fatal.
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("suggest v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        insert_queue_depth = config.store.insert_queue_depth,
        lookup_queue_depth = config.store.lookup_queue_depth,
        request_timeout_ms = config.store.request_timeout_ms,
        strict_validation = config.security.strict_validation,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let (store, store_task) = PrefixStore::spawn(&config.store, shutdown.subscribe());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = SuggestServer::new(&config, store);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown().await;
    shutdown.trigger();
    tracing::info!(subscribers = shutdown.receiver_count(), "Waiting for subsystems to stop");

    server_task.await??;
    store_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
