pub mod disk;
pub mod memory;

pub use disk::DiskDocumentStore;
pub use memory::MemoryDocumentStore;
