use super::*;
use std::path::{Path, PathBuf};

/// Flat-file store: one pretty-printed JSON object in one file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn read(&self) -> StoreResult<Option<Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn write(&self, doc: &ServerState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&self.path, payload).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Restaurant;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "  \n").unwrap();

        assert!(FileStore::new(path).read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/deeper/state.json"));

        let doc = ServerState {
            restaurants: vec![Restaurant {
                id: "a".to_string(),
                name: "Alpha".to_string(),
                blacklisted: true,
                last_selected_date: Some(99),
            }],
            cooldown_weeks: 3.0,
            activated_by: Some("session-1".to_string()),
        };
        store.write(&doc).await.unwrap();

        let raw = store.read().await.unwrap().unwrap();
        assert_eq!(raw["restaurants"][0]["name"], "Alpha");
        assert_eq!(raw["restaurants"][0]["lastSelectedDate"], 99);
        assert_eq!(raw["cooldownWeeks"], 3.0);
        assert_eq!(raw["activatedBy"], "session-1");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = FileStore::new(path).read().await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_write_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        let first = ServerState {
            activated_by: Some("session-1".to_string()),
            ..Default::default()
        };
        store.write(&first).await.unwrap();
        store.write(&ServerState::default()).await.unwrap();

        let raw = store.read().await.unwrap().unwrap();
        assert!(raw.get("activatedBy").is_none());
    }
}
