use thiserror::Error;

/// Why a token exchange did not yield a session credential.
///
/// Messages carry status codes and parse/transport causes, never token
/// values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// The backend answered with a non-2xx status.
    #[error("Token exchange rejected by backend with status {0}")]
    ServerRejected(u16),

    /// The backend answered 2xx but the body had no usable `token`.
    #[error("Malformed token exchange response: {reason}")]
    MalformedResponse { reason: String },

    /// No response was obtained (connect, DNS, TLS, timeout, body read).
    #[error("Token exchange transport failure: {0}")]
    TransportFailure(String),
}

impl ExchangeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ExchangeError::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable classification.
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeError::ServerRejected(_) => "server_rejected",
            ExchangeError::MalformedResponse { .. } => "malformed_response",
            ExchangeError::TransportFailure(_) => "transport_failure",
        }
    }

    /// Whether signing in again may succeed without a code or backend change.
    ///
    /// Transport failures, timeouts, throttling and server errors are
    /// transient. Other rejections (401/403 on a bad identity token) and
    /// malformed bodies are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExchangeError::ServerRejected(status) => {
                *status >= 500 || *status == 429 || *status == 408
            }
            ExchangeError::MalformedResponse { .. } => false,
            ExchangeError::TransportFailure(_) => true,
        }
    }
}

/// The durable store refused a credential write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to persist session credential: {reason}")]
pub struct StoreWriteError {
    pub reason: String,
}

impl StoreWriteError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    StoreWrite(#[from] StoreWriteError),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Config(#[from] core_runtime::Error),
}

impl AuthError {
    /// Stable machine-readable classification.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Exchange(e) => e.kind(),
            AuthError::StoreWrite(_) => "store_write",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Config(_) => "config",
        }
    }

    /// Whether retrying the sign-in with a fresh identity token may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AuthError::Exchange(e) => e.is_recoverable(),
            AuthError::StoreWrite(_) => true,
            AuthError::StoreUnavailable(_) | AuthError::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
