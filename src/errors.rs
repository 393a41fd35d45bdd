use thiserror::Error;

// Core RPC error types
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Deadline exceeded before dispatch")]
    DeadlineExceeded,

    #[error("Call cancelled")]
    Cancelled,

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the remote side in the response envelope.
    #[error("Remote error: {0}")]
    RemoteError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
