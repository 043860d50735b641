use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis connect error: {0}")]
    ConnectionError(#[from] redis::RedisError),

    #[error("Redis operation error: {0}")]
    OperationError(String),

    #[error("Store operation cancelled")]
    Cancelled,
}
