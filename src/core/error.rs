use thiserror::Error;

/// Failures of a single catalog or detail fetch. Never retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error while requesting {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Failure reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Carries the provider's message verbatim.
    #[error("{0}")]
    Rejected(String),
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            AuthError::Rejected(message) => message,
        }
    }
}

/// Failures talking to the per-user document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Failed to read profile document: {0}")]
    Read(String),

    #[error("Failed to write profile document: {0}")]
    Write(String),
}
