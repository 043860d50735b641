//! Async Redis client shared by the lock crates

pub mod client;
pub mod error;
pub mod operations;

pub use client::RedisClient;
pub use error::StoreError;
