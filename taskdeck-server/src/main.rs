//! `TaskDeck` API server -- in-memory task document store behind an HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:8080
//! cargo run --bin taskdeck-server
//!
//! # Run on custom address
//! cargo run --bin taskdeck-server -- --bind 127.0.0.1:3000
//!
//! # Or via environment variable
//! TASKDECK_SERVER_ADDR=127.0.0.1:3000 cargo run --bin taskdeck-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskdeck_server::api;
use taskdeck_server::config::{ServerCliArgs, ServerConfig};
use taskdeck_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskdeck api server");

    let store = Arc::new(TaskStore::new());

    match api::serve(&config.bind_addr, store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task api server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task api server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task api server");
            std::process::exit(1);
        }
    }
}
