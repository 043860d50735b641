//! Reentrant distributed lock backed by Redis, with a background lease renewer

pub mod client;
pub mod error;
pub mod lease;
pub mod lock;
pub mod memory;
pub mod scripts;
pub mod store;

pub use client::LockRedisClient;
pub use error::{DistributedLockError, Result};
pub use lease::{LeaseOptions, LeaseRenewer};
pub use lock::ReentrantLock;
pub use memory::MemoryStore;
pub use store::LockStore;
pub use store_client::StoreError;
pub use tokio_util::sync::CancellationToken;
