use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::EngineHandle;
use crate::error::ProviderError;
use crate::http::HttpRpcClient;
use crate::mux::SubscriptionHandle;
use crate::subscription::{ResourceKey, SlotNotification};
use crate::SolanaPubSubClient;

/// Mirrors the original `SlotSubscriberService`. There is exactly one slot resource, so
/// every caller coalesces onto the same upstream `slotSubscribe`.
#[derive(Clone)]
pub struct SlotSubscriber {
    handle: EngineHandle,
}

impl SlotSubscriber {
    pub(crate) fn new(handle: EngineHandle) -> Self {
        Self { handle }
    }

    pub async fn subscribe(&self) -> Result<(SubscriptionHandle, SlotNotifications), ProviderError> {
        let (handle, rx) = self.handle.subscribe(ResourceKey::Slot).await?;
        Ok((handle, SlotNotifications { rx }))
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.handle.unsubscribe(handle);
    }

    /// Not a server push: on `interval`, fetches a fresh blockhash over `http` and
    /// republishes it, presented with the same subscription shape as a real
    /// `slotSubscribe` so callers don't need a separate polling code path.
    pub fn subscribe_recent_blockhash(
        &self,
        http: HttpRpcClient,
        interval: Duration,
    ) -> mpsc::Receiver<synthfi_core::Hash> {
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match http.get_recent_blockhash().await {
                    Ok(hash) => {
                        if tx.send(hash).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to refresh recent blockhash");
                    }
                }
            }
        });

        rx
    }
}

pub struct SlotNotifications {
    rx: crate::mux::NotificationReceiver,
}

impl SlotNotifications {
    pub async fn next(&mut self) -> Option<Result<SlotNotification, ProviderError>> {
        let value = self.rx.recv().await?;
        Some(serde_json::from_value(value).map_err(|e| ProviderError::Core(e.into())))
    }
}

impl SolanaPubSubClient {
    pub fn slot_subscriber(&self) -> SlotSubscriber {
        SlotSubscriber::new(self.handle().clone())
    }
}
