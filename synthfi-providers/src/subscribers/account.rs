use synthfi_core::{AccountInfo, Commitment, PublicKey};

use crate::engine::EngineHandle;
use crate::error::ProviderError;
use crate::mux::SubscriptionHandle;
use crate::subscription::ResourceKey;
use crate::SolanaPubSubClient;

/// Mirrors the original `AccountSubscriberService`: subscribing to the same
/// `(PublicKey, Commitment)` pair from two callers coalesces onto one upstream
/// `accountSubscribe`, fanned out by the shared mux.
#[derive(Clone)]
pub struct AccountSubscriber {
    handle: EngineHandle,
}

impl AccountSubscriber {
    pub(crate) fn new(handle: EngineHandle) -> Self {
        Self { handle }
    }

    pub async fn subscribe(
        &self,
        account: PublicKey,
        commitment: Commitment,
    ) -> Result<(SubscriptionHandle, AccountNotifications), ProviderError> {
        let key = ResourceKey::Account(account, commitment);
        let (handle, rx) = self.handle.subscribe(key).await?;
        Ok((handle, AccountNotifications { rx }))
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.handle.unsubscribe(handle);
    }
}

/// Decoded `accountNotification` stream for one subscribe call.
pub struct AccountNotifications {
    rx: crate::mux::NotificationReceiver,
}

/// The notification's `result` is `{context: {...}, value: <AccountInfo>}`, the same
/// envelope `getAccountInfo` returns; only the `value` node carries the account.
#[derive(serde::Deserialize)]
struct RawAccountNotification {
    value: AccountInfo,
}

impl AccountNotifications {
    pub async fn next(&mut self) -> Option<Result<AccountInfo, ProviderError>> {
        let value = self.rx.recv().await?;
        Some(
            serde_json::from_value::<RawAccountNotification>(value)
                .map(|raw| raw.value)
                .map_err(|e| ProviderError::Core(e.into())),
        )
    }
}

impl SolanaPubSubClient {
    pub fn account_subscriber(&self) -> AccountSubscriber {
        AccountSubscriber::new(self.handle().clone())
    }
}
