use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot};
use piplan_core::PlanningResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSON file-based persistence store
/// Implements the PersistenceStore trait for JSON file operations
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
}

/// Wrapper structure for the JSON file format
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    version: u32,
    metadata: PersistenceMetadata,
    data: serde_json::Value,
}

impl JsonEnvelope {
    /// Envelope holding an empty plan state, used to seed a fresh file.
    pub fn empty() -> Self {
        Self {
            version: 1,
            metadata: PersistenceMetadata::new(Uuid::new_v4()),
            data: serde_json::json!({}),
        }
    }

    pub fn to_json_string(&self) -> PlanningResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| piplan_core::PlanningError::Serialization(e.to_string()))
    }
}

impl JsonFileStore {
    /// Create a new JSON file store
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Create a new JSON file store with a specific instance ID
    /// (useful for testing or coordinating across instances)
    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
        }
    }

    /// Get the instance ID for this store
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> PlanningResult<PersistenceMetadata> {
        // Update metadata with current instance and time
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();

        let data_value: serde_json::Value = serde_json::from_slice(&snapshot.data)
            .map_err(|e| piplan_core::PlanningError::Serialization(e.to_string()))?;
        let envelope = JsonEnvelope {
            version: 1,
            metadata: snapshot.metadata.clone(),
            data: data_value,
        };

        let json_bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| piplan_core::PlanningError::Serialization(e.to_string()))?;

        // Write atomically to disk
        AtomicWriter::write_atomic(&self.path, &json_bytes).await?;

        tracing::info!(
            "Saved {} bytes to {}",
            json_bytes.len(),
            self.path.display()
        );

        Ok(snapshot.metadata)
    }

    async fn load(&self) -> PlanningResult<(StoreSnapshot, PersistenceMetadata)> {
        let file_bytes = AtomicWriter::read_all(&self.path).await?;

        let envelope: JsonEnvelope = serde_json::from_slice(&file_bytes)
            .map_err(|e| piplan_core::PlanningError::Serialization(e.to_string()))?;

        if envelope.version != 1 {
            return Err(piplan_core::PlanningError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }

        let data = serde_json::to_vec(&envelope.data)
            .map_err(|e| piplan_core::PlanningError::Serialization(e.to_string()))?;
        let snapshot = StoreSnapshot {
            data,
            metadata: envelope.metadata.clone(),
        };

        tracing::info!(
            "Loaded {} bytes from {}",
            file_bytes.len(),
            self.path.display()
        );

        Ok((snapshot, envelope.metadata))
    }

    async fn exists(&self) -> bool {
        self.path.exists()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");
        let store = JsonFileStore::new(&file_path);

        let data = json!({ "boards": [], "sprints": [] });
        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&data).unwrap(),
            metadata: PersistenceMetadata::new(store.instance_id()),
        };

        let saved = store.save(snapshot).await.unwrap();
        assert_eq!(saved.instance_id, store.instance_id());

        let (loaded, metadata) = store.load().await.unwrap();
        let loaded_value: serde_json::Value = serde_json::from_slice(&loaded.data).unwrap();
        assert_eq!(loaded_value, data);
        assert_eq!(metadata.format_version, 1);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");

        let envelope = json!({
            "version": 99,
            "metadata": PersistenceMetadata::new(Uuid::new_v4()),
            "data": {}
        });
        std::fs::write(&file_path, serde_json::to_vec(&envelope).unwrap()).unwrap();

        let store = JsonFileStore::new(&file_path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.json");
        let store = JsonFileStore::new(&file_path);
        assert!(!store.exists().await);
    }
}
