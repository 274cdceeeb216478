use std::sync::Arc;
use std::time::Duration;

use stacker_core::{CoreResult, Stacker};

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    stacker: Arc<Stacker>,
    timeout: Duration,
}

impl AppState {
    pub fn new(stacker: Arc<Stacker>, timeout: Duration) -> Self {
        Self { stacker, timeout }
    }

    pub fn stacker(&self) -> &Stacker {
        &self.stacker
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a core operation on the blocking pool, bounded by the request
    /// timeout. An expired call keeps running to completion in the background.
    pub async fn call<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&Stacker) -> CoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let stacker = Arc::clone(&self.stacker);
        let task = tokio::task::spawn_blocking(move || f(&stacker));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map_err(ServerError::from),
            Ok(Err(join)) => Err(ServerError::Internal(format!("core call aborted: {join}"))),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "core call timed out");
                Err(ServerError::Timeout(self.timeout))
            }
        }
    }
}
