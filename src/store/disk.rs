use crate::core::document::merge_fields;
use crate::core::{Document, DocumentStore, SyncError};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const PROFILES_PARTITION: &str = "profiles";

/// Document store persisted in a fjall partition, one JSON document per user.
pub struct DiskDocumentStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    // Serialises read-modify-write of merged documents
    write_lock: Mutex<()>,
}

impl DiskDocumentStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = Config::new(path).open()?;
        let partition =
            keyspace.open_partition(PROFILES_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened profile store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
            write_lock: Mutex::new(()),
        })
    }

    fn read(&self, user_id: &str) -> Result<Option<Document>, SyncError> {
        let Some(bytes) = self
            .partition
            .get(user_id)
            .map_err(|e| SyncError::Read(e.to_string()))?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SyncError::Read(format!("corrupt document for {user_id}: {e}")))
    }
}

#[async_trait]
impl DocumentStore for DiskDocumentStore {
    async fn get_document(&self, user_id: &str) -> Result<Option<Document>, SyncError> {
        let doc = self.read(user_id)?;
        debug!("Document GET for {}: {}", user_id, if doc.is_some() { "HIT" } else { "MISS" });
        Ok(doc)
    }

    async fn set_document(
        &self,
        user_id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), SyncError> {
        let _guard = self.write_lock.lock().await;
        let existing = if merge { self.read(user_id)? } else { None };
        let merged = merge_fields(existing, fields, merge);
        let bytes = serde_json::to_vec(&merged).map_err(|e| SyncError::Write(e.to_string()))?;
        self.partition
            .insert(user_id, bytes)
            .map_err(|e| SyncError::Write(e.to_string()))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| SyncError::Write(e.to_string()))?;
        debug!("Document SET for {} (merge: {})", user_id, merge);
        Ok(())
    }
}
