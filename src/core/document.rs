use super::error::SyncError;
use async_trait::async_trait;

/// A per-user document: a JSON object with top-level fields.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Remote key-document store keyed by user id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, user_id: &str) -> Result<Option<Document>, SyncError>;

    /// Writes `fields` for `user_id`. With `merge` the given top-level fields
    /// overwrite existing ones and all other fields are kept; without it the
    /// document is replaced.
    async fn set_document(
        &self,
        user_id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), SyncError>;
}

/// Applies `fields` onto `existing` using the store's merge semantics.
pub fn merge_fields(existing: Option<Document>, fields: Document, merge: bool) -> Document {
    match existing {
        Some(mut doc) if merge => {
            doc.extend(fields);
            doc
        }
        _ => fields,
    }
}
