use async_trait::async_trait;
use chrono::{DateTime, Utc};
use piplan_core::PlanningResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: 1,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Point-in-time snapshot of all data that needs to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Raw JSON bytes of the full `PlanState`
    pub data: Vec<u8>,
    /// Metadata about this snapshot
    pub metadata: PersistenceMetadata,
}

/// Trait for abstract storage operations
/// Implementations handle different backend storage (file, database, etc.)
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Save a snapshot to the store
    async fn save(&self, snapshot: StoreSnapshot) -> PlanningResult<PersistenceMetadata>;

    /// Load the current snapshot from the store
    async fn load(&self) -> PlanningResult<(StoreSnapshot, PersistenceMetadata)>;

    /// Check if the store exists
    async fn exists(&self) -> bool;

    /// Get the path to the store
    fn path(&self) -> &Path;
}
