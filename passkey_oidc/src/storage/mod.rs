//! Key-value storage adapter shared by the session store and the user repository.

mod config;
mod errors;
mod memory;
mod redis;
mod types;

pub use config::{StoreConfig, StoreType, build_store};
pub use errors::StorageError;
pub use types::{InMemoryKvStore, KvStore, RedisKvStore};
