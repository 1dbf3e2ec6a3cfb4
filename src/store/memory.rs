use super::*;
use tokio::sync::RwLock;

/// In-process store for tests and throwaway deployments
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<Option<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw JSON, bypassing normalization
    pub fn with_raw(raw: Value) -> Self {
        Self {
            doc: RwLock::new(Some(raw)),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self) -> StoreResult<Option<Value>> {
        Ok(self.doc.read().await.clone())
    }

    async fn write(&self, doc: &ServerState) -> StoreResult<()> {
        let value = serde_json::to_value(doc)?;
        *self.doc.write().await = Some(value);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
