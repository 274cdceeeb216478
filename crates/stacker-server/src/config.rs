use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stacker_store::{FsObjectStore, InMemoryObjectStore, ObjectStore};

use crate::error::{ServerError, ServerResult};

/// Top-level configuration, as read from a TOML file.
///
/// Every section and key is optional; missing values take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackerConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

impl StackerConfig {
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on a single core call (store round-trips included).
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_ms: 5_000,
        }
    }
}

/// Which object store backs the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local; lost on exit.
    #[default]
    Memory,
    /// One JSON file per entity under `path`.
    Directory { path: PathBuf },
}

impl StoreConfig {
    pub fn open(&self) -> ServerResult<Arc<dyn ObjectStore>> {
        Ok(match self {
            Self::Memory => Arc::new(InMemoryObjectStore::new()),
            Self::Directory { path } => Arc::new(
                FsObjectStore::open(path)
                    .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StackerConfig::default();
        assert_eq!(c.server.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.server.request_timeout(), Duration::from_secs(5));
        assert_eq!(c.store, StoreConfig::Memory);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(StackerConfig::from_toml("").unwrap(), StackerConfig::default());
    }

    #[test]
    fn parses_directory_store() {
        let c = StackerConfig::from_toml(
            r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [store]
            backend = "directory"
            path = "/var/lib/stacker"
            "#,
        )
        .unwrap();
        assert_eq!(c.server.bind_addr.port(), 9000);
        assert_eq!(c.server.request_timeout_ms, 5_000);
        assert_eq!(
            c.store,
            StoreConfig::Directory {
                path: PathBuf::from("/var/lib/stacker")
            }
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = StackerConfig::from_toml("[store]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let c = StackerConfig {
            server: ServerConfig::default(),
            store: StoreConfig::Directory {
                path: PathBuf::from("data"),
            },
        };
        assert_eq!(StackerConfig::from_toml(&c.to_toml().unwrap()).unwrap(), c);
    }

    #[test]
    fn opens_directory_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreConfig::Directory {
            path: dir.path().join("data"),
        }
        .open()
        .unwrap();
        assert!(store.list(stacker_types::EntityKind::User).unwrap().is_empty());
        assert!(dir.path().join("data").join("users").is_dir());
    }
}
