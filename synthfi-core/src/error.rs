use thiserror::Error;

use crate::jsonrpc::JsonRpcError;

/// Errors produced while decoding wire primitives: keys, account payloads, the JSON-RPC
/// envelope itself. Every component-specific error enum in the other crates wraps one
/// of these via `#[from]` rather than re-deriving the same decode failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("invalid length, expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid 'data' field type: expected a base58 string or a [data, \"base64\"] pair")]
    InvalidAccountData,

    #[error("invalid commitment level: {0}")]
    InvalidCommitment(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("rpc error {0}")]
    Rpc(JsonRpcError),
}

/// Mirrors ethers' `RpcError`/`MiddlewareError` pattern: every component error type that
/// can originate from a JSON-RPC response implements this so callers can introspect the
/// failure without downcasting through `dyn Error`.
pub trait RpcError: std::error::Error + Send + Sync + 'static {
    /// The server-side JSON-RPC error, if this error originated from one.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// The underlying serde error, if this error is a deserialization failure.
    fn as_serde_error(&self) -> Option<&serde_json::Error>;
}

impl RpcError for CoreError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            CoreError::Rpc(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            CoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}
