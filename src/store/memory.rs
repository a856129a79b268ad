use crate::core::document::merge_fields;
use crate::core::{Document, DocumentStore, SyncError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory document store with the same merge semantics as the remote one.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<HashMap<String, Document>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_read_failure(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of `get_document` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, user_id: &str) -> Result<Option<Document>, SyncError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Read("store unavailable".to_string()));
        }
        let docs = self.inner.lock().await;
        let doc = docs.get(user_id).cloned();
        debug!("Document GET for {}: {}", user_id, if doc.is_some() { "HIT" } else { "MISS" });
        Ok(doc)
    }

    async fn set_document(
        &self,
        user_id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), SyncError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Write("store unavailable".to_string()));
        }
        let mut docs = self.inner.lock().await;
        let merged = merge_fields(docs.remove(user_id), fields, merge);
        docs.insert(user_id.to_string(), merged);
        debug!("Document SET for {} (merge: {})", user_id, merge);
        Ok(())
    }
}
