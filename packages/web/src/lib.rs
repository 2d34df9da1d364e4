//! TreeGraph HTML front end
//!
//! Serves the tree pages over HTTP on top of [`TreeService`].
//!
//! # Architecture
//!
//! - `node_endpoints`: page and health routes
//! - `views`: HTML rendering
//! - `config`: environment-based server configuration
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin treegraph-server
//!
//! # Impermanent database on another port
//! TREEGRAPH_DB=mem:// TREEGRAPH_PORT=3000 cargo run --bin treegraph-server
//! ```

use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use treegraph_core::db::SurrealStore;
use treegraph_core::TreeService;

pub mod config;
mod http_error;
mod node_endpoints;
pub mod views;

pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// The `write_lock` mutex serializes all tree mutations (create, rename, add,
/// remove). Read operations do not acquire it.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TreeService>,
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(service: TreeService) -> Self {
        Self {
            service: Arc::new(service),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(node_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Connect to the configured database and serve until Ctrl-C
///
/// # Errors
///
/// Returns error if the database connection fails or the server fails to
/// bind or start.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    use anyhow::Context;

    let store = SurrealStore::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.endpoint))?;
    let state = AppState::new(TreeService::new(Arc::new(store)));
    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("🚀 TreeGraph server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 TreeGraph server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
