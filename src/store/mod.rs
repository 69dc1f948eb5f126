pub mod base;
pub mod file_store;
pub mod memory_store;

// Re-export from base.rs so we can do "use crate::store::*;"
pub use base::{create_store, keys, KeyValueStore};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
