pub mod base;
pub mod memory_store;
pub mod mongodb_store;
pub mod no_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{SessionStore, create_store};"
pub use base::{create_store, SessionStore, StoreError};
pub use memory_store::MemoryStore;
