use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The request never produced a response (DNS, connect, TLS, broken body).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// True when the failure happened below HTTP, before any status code was seen.
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::Transport(_) | BridgeError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
