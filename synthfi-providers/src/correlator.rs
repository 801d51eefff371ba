//! Ties outgoing JSON-RPC request ids to what should happen when the matching reply
//! arrives: either a plain call waiting on a oneshot, or a subscribe call whose result
//! needs to be handed to the `SubscriptionMux` instead of straight back to the caller.
//! Grounded on ethers' `RequestManager::reqs` / `InFlight` bookkeeping, generalized to
//! two request flavors since Solana's pubsub methods need the extra indirection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

use crate::error::ProviderError;
use crate::subscription::ResourceKey;

pub(crate) enum PendingRequest {
    Call(oneshot::Sender<Result<serde_json::Value, ProviderError>>),
    Subscribe(ResourceKey),
    Unsubscribe,
}

#[derive(Default)]
pub(crate) struct RpcCorrelator {
    next_id: AtomicU64,
    reqs: BTreeMap<u64, PendingRequest>,
}

impl RpcCorrelator {
    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn register_call(
        &mut self,
        id: u64,
        sender: oneshot::Sender<Result<serde_json::Value, ProviderError>>,
    ) {
        self.reqs.insert(id, PendingRequest::Call(sender));
    }

    pub(crate) fn register_subscribe(&mut self, id: u64, key: ResourceKey) {
        self.reqs.insert(id, PendingRequest::Subscribe(key));
    }

    pub(crate) fn register_unsubscribe(&mut self, id: u64) {
        self.reqs.insert(id, PendingRequest::Unsubscribe);
    }

    pub(crate) fn take(&mut self, id: u64) -> Option<PendingRequest> {
        self.reqs.remove(&id)
    }

    /// Pending calls whose reply will never arrive because the backend dropped; used on
    /// a fatal disconnect where reconnection is not possible.
    pub(crate) fn drain(&mut self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.reqs).into_values().collect()
    }
}
