//! Process configuration loaded from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{DocumentStore, FileStore, MemoryStore};

pub const DEFAULT_PORT: u16 = 6574;
pub const DEFAULT_DATA_FILE: &str = "data/state.json";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    File(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    /// Directory served as the front-end fallback
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            store: StoreBackend::File(PathBuf::from(DEFAULT_DATA_FILE)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables, falling back to defaults on
    /// missing or unparsable values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| {
                v.trim()
                    .parse::<u16>()
                    .map_err(|e| tracing::warn!("Invalid PORT {:?}: {}", v, e))
                    .ok()
            })
            .unwrap_or(DEFAULT_PORT);

        let ip = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|v| {
                v.trim()
                    .parse::<IpAddr>()
                    .map_err(|e| tracing::warn!("Invalid BIND_ADDR {:?}: {}", v, e))
                    .ok()
            })
            .unwrap_or(defaults.bind_addr.ip());

        let store = match std::env::var("STORE_BACKEND")
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            Ok("memory") => StoreBackend::Memory,
            Ok("file") | Err(_) => StoreBackend::File(
                std::env::var("DATA_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE)),
            ),
            Ok(other) => {
                tracing::warn!("Unknown STORE_BACKEND {:?}, using file", other);
                defaults.store
            }
        };

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let config = Self {
            bind_addr: SocketAddr::new(ip, port),
            store,
            static_dir,
        };

        tracing::info!(
            bind_addr = %config.bind_addr,
            store = ?config.store,
            static_dir = %config.static_dir.display(),
            "Config loaded"
        );

        config
    }

    pub fn build_store(&self) -> Arc<dyn DocumentStore> {
        match &self.store {
            StoreBackend::File(path) => Arc::new(FileStore::new(path.clone())),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store - the list is lost on restart");
                Arc::new(MemoryStore::new())
            }
        }
    }
}
