use synthfi_core::{CoreError, JsonRpcError, RpcError};
use thiserror::Error;

/// Errors surfaced by the websocket transport, the request correlator, and the
/// subscription mux. Mirrors ethers' `WsClientError` shape: one enum per failure class,
/// plus the shared `RpcError` introspection trait rather than a single opaque error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("server returned an error: {0}")]
    JsonRpc(JsonRpcError),

    #[error("websocket connection closed unexpectedly")]
    UnexpectedClose,

    #[error("exceeded the configured reconnect attempt budget")]
    TooManyReconnects,

    #[error("the backend actor channel is no longer listening")]
    DeadChannel,

    #[error("a request for an unknown id {0} was received")]
    UnknownRequestId(u64),

    #[error("a notification for an unknown subscription {0} was received")]
    UnknownSubscription(u64),

    #[error("the rendezvous wait for a coalesced subscribe was cancelled without a result")]
    RendezvousAborted,

    #[error("timed out waiting for a response")]
    Timeout,

    #[error("timed out waiting for a subscribe call to resolve")]
    SubscribeTimeout,

    #[error("timed out waiting for a signature confirmation")]
    ConfirmationTimeout,

    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            ProviderError::JsonRpc(e) => Some(e),
            ProviderError::Core(e) => e.as_error_response(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::Core(e) => e.as_serde_error(),
            _ => None,
        }
    }
}
