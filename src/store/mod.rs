mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::ServerState;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur talking to the backing store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Black-box holder of the single shared document.
///
/// Stores do no validation and no concurrency control: `write` replaces the
/// whole document and the last writer wins. Normalization happens in
/// [`crate::state::AppState`] on both sides of every call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Raw stored document, or None if nothing has been written yet
    async fn read(&self) -> StoreResult<Option<Value>>;

    /// Replace the stored document
    async fn write(&self, doc: &ServerState) -> StoreResult<()>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}
