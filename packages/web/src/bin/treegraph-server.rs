//! TreeGraph Server Binary
//!
//! Starts the HTML front end on top of the configured graph store.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (127.0.0.1:8080, embedded database in ~/.treegraph)
//! cargo run --bin treegraph-server
//!
//! # Custom port and remote database
//! TREEGRAPH_PORT=9000 TREEGRAPH_DB=http://localhost:8000 cargo run --bin treegraph-server
//! ```
//!
//! # Environment Variables
//!
//! - `TREEGRAPH_HOST`, `TREEGRAPH_PORT`: bind address (default 127.0.0.1:8080)
//! - `TREEGRAPH_DB`: database endpoint (`mem://`, `rocksdb://<path>`, `http://<host>:<port>`)
//! - `TREEGRAPH_DB_NAMESPACE`, `TREEGRAPH_DB_DATABASE`, `TREEGRAPH_DB_USER`, `TREEGRAPH_DB_PASS`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use anyhow::Context;
use treegraph_web::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🌳 TreeGraph Server");
    tracing::info!("==================================");

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!("📡 Address: {}", config.bind_address());
    tracing::info!("📦 Database: {}", config.database.endpoint);

    // Ensure database directory exists
    if let Some(dir) = config.database_directory() {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    treegraph_web::start_server(config).await
}
