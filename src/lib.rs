// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod storage;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use backend::Backend;
pub use client::ApiClient;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
