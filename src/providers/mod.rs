pub mod memory_auth;
pub mod mfapi;

pub use memory_auth::MemoryAuthProvider;
pub use mfapi::MfApiCatalog;
