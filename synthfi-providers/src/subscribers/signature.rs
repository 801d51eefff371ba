use std::time::Duration;

use synthfi_core::{Commitment, Signature};

use crate::engine::EngineHandle;
use crate::error::ProviderError;
use crate::subscription::{ResourceKey, SignatureNotification};
use crate::SolanaPubSubClient;

/// How long `confirm` waits for the server's notification before giving up. Mirrors the
/// `30s` `expiryTimer` the original `SignatureSubscriberImpl::do_signature_subscribe`
/// installs on every subscription.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Mirrors the original `SignatureSubscriberService`: a signature subscription is
/// self-terminating, so `confirm` resolves after exactly one notification and there is
/// nothing left for the caller to unsubscribe from.
#[derive(Clone)]
pub struct SignatureSubscriber {
    handle: EngineHandle,
}

impl SignatureSubscriber {
    pub(crate) fn new(handle: EngineHandle) -> Self {
        Self { handle }
    }

    /// Subscribes and awaits the single notification the server will send before it
    /// clears the subscription on its own. Times out after `CONFIRMATION_TIMEOUT`, the
    /// way the original's `expiryTimer` throws `"Timed out"` if it fires before the
    /// notification does.
    pub async fn confirm(
        &self,
        signature: Signature,
        commitment: Commitment,
    ) -> Result<SignatureNotification, ProviderError> {
        let key = ResourceKey::Signature(signature, commitment);
        let (_handle, mut rx) = self.handle.subscribe(key).await?;
        let value = tokio::time::timeout(CONFIRMATION_TIMEOUT, rx.recv())
            .await
            .map_err(|_| ProviderError::ConfirmationTimeout)?
            .ok_or(ProviderError::RendezvousAborted)?;
        serde_json::from_value(value).map_err(|e| ProviderError::Core(e.into()))
    }
}

impl SolanaPubSubClient {
    pub fn signature_subscriber(&self) -> SignatureSubscriber {
        SignatureSubscriber::new(self.handle().clone())
    }
}
