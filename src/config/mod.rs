// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod logging;
pub mod session;
pub mod store;
pub mod types;

pub use logging::*;
pub use session::*;
pub use store::*;
pub use types::*;

pub use crate::store::memory_store::MemoryStoreConfig;
pub use crate::store::mongodb_store::MongoDBConfig;
