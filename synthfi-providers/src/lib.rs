//! Subscription-multiplexing JSON-RPC client for a Solana validator: one websocket
//! connection, one request correlator, one mux shared by every typed subscriber, and a
//! plain HTTP client for the request/response RPC methods that don't need a subscription.

mod backend;
mod correlator;
mod engine;
mod error;
mod http;
mod mux;
mod subscription;

pub mod subscribers;

pub use engine::ReconnectPolicy;
pub use error::ProviderError;
pub use http::HttpRpcClient;
pub use mux::SubscriptionHandle;
pub use subscription::{ResourceKey, SignatureNotification, SlotNotification};

use engine::{Engine, EngineHandle};

/// Entry point: connects the websocket, spawns the engine task, and hands back a
/// cloneable front plus the typed subscriber constructors in `subscribers`.
#[derive(Clone)]
pub struct SolanaPubSubClient {
    handle: EngineHandle,
}

impl SolanaPubSubClient {
    pub async fn connect(url: url::Url) -> Result<Self, ProviderError> {
        Self::connect_with_policy(url, ReconnectPolicy::default()).await
    }

    pub async fn connect_with_policy(
        url: url::Url,
        policy: ReconnectPolicy,
    ) -> Result<Self, ProviderError> {
        let (engine, handle) = Engine::connect(url, policy).await?;
        engine.spawn();
        Ok(Self { handle })
    }

    pub(crate) fn handle(&self) -> &EngineHandle {
        &self.handle
    }
}
