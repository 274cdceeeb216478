use std::sync::Arc;

use stacker_core::Stacker;
use stacker_model::ModelRegistry;
use tokio::net::TcpListener;

use crate::config::StackerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Stacker HTTP server.
pub struct StackerServer {
    config: StackerConfig,
    stacker: Arc<Stacker>,
}

impl StackerServer {
    /// Open the configured store and build the service over it.
    pub fn new(config: StackerConfig) -> ServerResult<Self> {
        let store = config.store.open()?;
        let stacker = Stacker::new(store, Arc::new(ModelRegistry::standard()));
        Ok(Self::with_stacker(config, Arc::new(stacker)))
    }

    pub fn with_stacker(config: StackerConfig, stacker: Arc<Stacker>) -> Self {
        Self { config, stacker }
    }

    pub fn config(&self) -> &StackerConfig {
        &self.config
    }

    pub fn stacker(&self) -> &Arc<Stacker> {
        &self.stacker
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.stacker),
            self.config.server.request_timeout(),
        ))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let addr = self.config.server.bind_addr;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, store = ?self.config.store, "stacker server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
