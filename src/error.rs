//! A crate-wide aggregate error, the facade's counterpart to `synthfi_providers::ProviderError`:
//! application code that spans venues and the Solana transport wants one `Result` type to
//! thread through `main`, not four.

use synthfi_core::{CoreError, JsonRpcError, RpcError};
use synthfi_exchange::OrderError;
use synthfi_providers::ProviderError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SynthfiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl RpcError for SynthfiError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            SynthfiError::Core(e) => e.as_error_response(),
            SynthfiError::Provider(e) => e.as_error_response(),
            SynthfiError::Order(OrderError::Provider(e)) => e.as_error_response(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            SynthfiError::Core(e) => e.as_serde_error(),
            SynthfiError::Provider(e) => e.as_serde_error(),
            SynthfiError::Order(OrderError::Provider(e)) => e.as_serde_error(),
            _ => None,
        }
    }
}
