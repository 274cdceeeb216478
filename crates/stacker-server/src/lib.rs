//! HTTP server for Stacker.
//!
//! Serves the user and task resources as JSend envelopes over axum. Core
//! calls run on the blocking pool under the configured request timeout.

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod validate;

pub use config::{ServerConfig, StackerConfig, StoreConfig};
pub use envelope::{JSendError, JSendResponse, JSendStatus};
pub use error::{ServerError, ServerResult};
pub use server::StackerServer;
pub use state::AppState;
