//! Core domain types and collaborator abstractions

pub mod auth;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod fund;
pub mod log;

// Re-export main types for cleaner imports
pub use auth::{AuthProvider, Credentials, Identity};
pub use catalog::FundCatalog;
pub use document::{Document, DocumentStore};
pub use error::{AuthError, CatalogError, SyncError};
pub use fund::{Fund, FundDetail, NavSample, SchemeCode};
