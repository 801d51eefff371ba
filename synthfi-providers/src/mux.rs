//! Subscription multiplexing: at most one upstream `*Subscribe` call per `ResourceKey`,
//! fanned out to every local caller that asked for it. Grounded directly on the original
//! `AccountSubscriberImpl`/`SignatureSubscriberImpl` rendezvous algorithm (a pending-entry
//! map keyed by the resource, with followers parked behind an expiry timer until the
//! leader's subscribe call resolves) crossed with ethers' `SubscriptionManager` alias
//! bookkeeping (server-assigned subscription ids are never exposed to callers directly).
//!
//! Unlike ethers' manager, which replays `to_reissue` transparently on reconnect, a lost
//! transport here invalidates every active subscription instead: the server-side
//! subscription ids are gone, so continuing to fan out under the old alias would be
//! silently wrong. Owners observe the invalidation as their notification channel closing
//! and decide for themselves whether to re-subscribe.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use crate::error::ProviderError;
use crate::subscription::ResourceKey;

/// A caller-visible handle, stable across reconnects since it never encodes the
/// server-side subscription id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

pub(crate) type NotificationSender = mpsc::UnboundedSender<serde_json::Value>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<serde_json::Value>;

type SubscribeReply = oneshot::Sender<Result<(SubscriptionHandle, NotificationReceiver), ProviderError>>;

/// A subscribe call in flight: the leader has already sent the upstream request, and any
/// follower that asks for the same `ResourceKey` before the reply arrives parks here
/// instead of issuing a second one, exactly like the C++ client's `PendingAccountSubscription`.
/// The engine schedules a matching expiry timer (see `engine.rs`'s `SUBSCRIBE_TIMEOUT`)
/// when `request_id` is dispatched; `request_id` is how `on_subscribe_timeout` confirms the
/// firing timer still belongs to this entry rather than a later subscribe for the same key.
struct PendingSubscribe {
    request_id: u64,
    followers: Vec<SubscribeReply>,
}

struct ActiveSubscription {
    server_id: u64,
    callbacks: HashMap<u64, NotificationSender>,
}

#[derive(Default)]
pub(crate) struct SubscriptionMux {
    pending: HashMap<ResourceKey, PendingSubscribe>,
    active: HashMap<ResourceKey, ActiveSubscription>,
    by_server_id: HashMap<u64, ResourceKey>,
    by_request_id: HashMap<u64, ResourceKey>,
    handles: HashMap<u64, ResourceKey>,
    next_handle: u64,
}

/// What the mux wants the engine to dispatch to the wire after handling a call.
pub(crate) enum Dispatch {
    None,
    Send { id: u64, method: &'static str, params: serde_json::Value },
}

impl SubscriptionMux {
    fn alloc_handle(&mut self, key: ResourceKey) -> SubscriptionHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, key);
        SubscriptionHandle(handle)
    }

    /// Join (or start) the subscription for `key`. Returns the wire request the engine
    /// must send, if any — `None` when this call coalesced onto an in-flight or already
    /// active subscription.
    pub(crate) fn subscribe(
        &mut self,
        key: ResourceKey,
        reply: SubscribeReply,
        next_request_id: impl FnOnce() -> u64,
    ) -> Dispatch {
        if let Some(active) = self.active.get_mut(&key) {
            let handle = self.alloc_handle(key.clone());
            let (tx, rx) = mpsc::unbounded_channel();
            active.callbacks.insert(handle.0, tx);
            let _ = reply.send(Ok((handle, rx)));
            return Dispatch::None;
        }

        if let Some(pending) = self.pending.get_mut(&key) {
            pending.followers.push(reply);
            return Dispatch::None;
        }

        let request_id = next_request_id();
        self.by_request_id.insert(request_id, key.clone());
        self.pending.insert(key.clone(), PendingSubscribe { request_id, followers: vec![reply] });

        Dispatch::Send {
            id: request_id,
            method: key.subscribe_method(),
            params: key.subscribe_params(),
        }
    }

    /// The leader's subscribe call succeeded: promote the pending entry to active and
    /// wake every follower (the rendezvous in the original C++ client cancelling the
    /// expiry timer so the others stop waiting).
    pub(crate) fn on_subscribe_success(&mut self, request_id: u64, server_id: u64) {
        let Some(key) = self.by_request_id.remove(&request_id) else { return };
        let Some(pending) = self.pending.remove(&key) else { return };

        let mut callbacks = HashMap::new();
        for reply in pending.followers {
            let handle = self.alloc_handle(key.clone());
            let (tx, rx) = mpsc::unbounded_channel();
            callbacks.insert(handle.0, tx);
            let _ = reply.send(Ok((handle, rx)));
        }

        self.by_server_id.insert(server_id, key.clone());
        self.active.insert(key, ActiveSubscription { server_id, callbacks });
    }

    /// The leader's subscribe call failed: every follower (including the leader) gets the
    /// error, the original client's "any other outcome raises an error" branch.
    pub(crate) fn on_subscribe_error(&mut self, request_id: u64, error: ProviderError) {
        let Some(key) = self.by_request_id.remove(&request_id) else { return };
        let Some(pending) = self.pending.remove(&key) else { return };
        for reply in pending.followers {
            let _ = reply.send(Err(clone_provider_error(&error)));
        }
    }

    /// The engine's expiry timer for `request_id` fired before either a success or an
    /// error frame arrived. A no-op if the subscribe already resolved, or if a newer
    /// subscribe for the same key has since taken over `request_id`'s slot.
    pub(crate) fn on_subscribe_timeout(&mut self, request_id: u64) {
        let Some(key) = self.by_request_id.get(&request_id).cloned() else { return };
        match self.pending.get(&key) {
            Some(pending) if pending.request_id == request_id => {}
            _ => return,
        }
        let pending = self.pending.remove(&key).expect("checked above");
        self.by_request_id.remove(&request_id);
        for reply in pending.followers {
            let _ = reply.send(Err(ProviderError::SubscribeTimeout));
        }
    }

    /// Fails every subscribe call still in flight, e.g. because the transport gave up
    /// reconnecting. Every follower (the leader included) observes `error` instead of
    /// hanging on a reply that will never come.
    pub(crate) fn fail_all_pending(&mut self, error: &ProviderError) {
        for (_, pending) in self.pending.drain() {
            self.by_request_id.remove(&pending.request_id);
            for reply in pending.followers {
                let _ = reply.send(Err(clone_provider_error(error)));
            }
        }
    }

    /// Invalidates every active subscription after a transport reset: the server-side
    /// subscription ids it was keyed on no longer mean anything to the new connection.
    /// Dropping each callback closes that owner's notification channel, the signal they
    /// use to notice the subscription is gone and re-subscribe if they still want it.
    /// There is no automatic re-subscribe here; that decision belongs to the caller.
    pub(crate) fn invalidate_all(&mut self) {
        for (_, active) in self.active.drain() {
            self.by_server_id.remove(&active.server_id);
            for handle_id in active.callbacks.keys() {
                self.handles.remove(handle_id);
            }
        }
    }

    pub(crate) fn on_notification(&mut self, server_id: u64, result: serde_json::Value) {
        let Some(key) = self.by_server_id.get(&server_id).cloned() else { return };
        let Some(active) = self.active.get_mut(&key) else { return };
        active.callbacks.retain(|_, tx| tx.send(result.clone()).is_ok());

        if key.self_terminating() {
            self.active.remove(&key);
            self.by_server_id.remove(&server_id);
        }
    }

    /// Drops `handle`'s local callback; returns the unsubscribe request to send upstream
    /// once the last local caller for `handle`'s key has gone.
    pub(crate) fn unsubscribe(&mut self, handle: SubscriptionHandle, next_request_id: impl FnOnce() -> u64) -> Dispatch {
        let Some(key) = self.handles.remove(&handle.0) else { return Dispatch::None };
        let Some(active) = self.active.get_mut(&key) else { return Dispatch::None };
        active.callbacks.remove(&handle.0);

        if !active.callbacks.is_empty() {
            return Dispatch::None;
        }

        let server_id = active.server_id;
        self.active.remove(&key);
        self.by_server_id.remove(&server_id);

        if key.self_terminating() {
            // Already cleared server-side after its one notification; nothing to send.
            return Dispatch::None;
        }

        Dispatch::Send {
            id: next_request_id(),
            method: key.unsubscribe_method(),
            params: key.unsubscribe_params(server_id),
        }
    }
}

pub(crate) fn clone_provider_error(error: &ProviderError) -> ProviderError {
    ProviderError::JsonRpc(synthfi_core::JsonRpcError {
        code: 0,
        message: error.to_string(),
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthfi_core::{Commitment, PublicKey};

    fn key() -> ResourceKey {
        ResourceKey::Account(PublicKey::from_bytes([1u8; 32]), Commitment::Confirmed)
    }

    #[tokio::test]
    async fn second_caller_coalesces_onto_pending_subscribe() {
        let mut mux = SubscriptionMux::default();
        let (tx1, _rx1) = oneshot::channel();
        let (tx2, _rx2) = oneshot::channel();

        let mut ids = 0u64..;
        let dispatch1 = mux.subscribe(key(), tx1, || { ids.next().unwrap() });
        assert!(matches!(dispatch1, Dispatch::Send { .. }));

        let dispatch2 = mux.subscribe(key(), tx2, || { ids.next().unwrap() });
        assert!(matches!(dispatch2, Dispatch::None));

        assert_eq!(mux.pending.len(), 1);
        assert_eq!(mux.pending.get(&key()).unwrap().followers.len(), 2);
    }

    #[tokio::test]
    async fn promotion_wakes_every_follower_with_distinct_handles() {
        let mut mux = SubscriptionMux::default();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();

        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx1, || ids.next().unwrap());
        let _ = mux.subscribe(key(), tx2, || ids.next().unwrap());

        mux.on_subscribe_success(0, 555);

        let (handle1, _) = rx1.await.unwrap().unwrap();
        let (handle2, _) = rx2.await.unwrap().unwrap();
        assert_ne!(handle1, handle2);
        assert_eq!(mux.active.get(&key()).unwrap().callbacks.len(), 2);
    }

    #[tokio::test]
    async fn notification_fans_out_to_every_callback() {
        let mut mux = SubscriptionMux::default();
        let (tx1, rx1) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx1, || ids.next().unwrap());
        mux.on_subscribe_success(0, 42);
        let (_, mut notifications) = rx1.await.unwrap().unwrap();

        mux.on_notification(42, serde_json::json!({"lamports": 1}));
        let got = notifications.recv().await.unwrap();
        assert_eq!(got, serde_json::json!({"lamports": 1}));
    }

    #[tokio::test]
    async fn self_terminating_subscription_clears_after_one_notification() {
        let mut mux = SubscriptionMux::default();
        let sig_key = ResourceKey::Signature(synthfi_core::Signature::from_bytes([2u8; 64]), Commitment::Confirmed);
        let (tx, rx) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(sig_key.clone(), tx, || ids.next().unwrap());
        mux.on_subscribe_success(0, 7);
        let _ = rx.await.unwrap().unwrap();

        mux.on_notification(7, serde_json::json!({"err": null}));
        assert!(!mux.active.contains_key(&sig_key));
        assert!(!mux.by_server_id.contains_key(&7));
    }

    #[tokio::test]
    async fn expiry_timeout_fails_every_parked_follower() {
        let mut mux = SubscriptionMux::default();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx1, || ids.next().unwrap());
        let _ = mux.subscribe(key(), tx2, || ids.next().unwrap());

        mux.on_subscribe_timeout(0);

        assert!(matches!(rx1.await.unwrap(), Err(ProviderError::SubscribeTimeout)));
        assert!(matches!(rx2.await.unwrap(), Err(ProviderError::SubscribeTimeout)));
        assert!(mux.pending.is_empty());
    }

    #[tokio::test]
    async fn timeout_is_ignored_once_the_subscribe_already_resolved() {
        let mut mux = SubscriptionMux::default();
        let (tx1, rx1) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx1, || ids.next().unwrap());
        mux.on_subscribe_success(0, 42);

        mux.on_subscribe_timeout(0);

        let (_, _) = rx1.await.unwrap().unwrap();
        assert!(mux.active.contains_key(&key()));
    }

    #[tokio::test]
    async fn fail_all_pending_drains_every_parked_subscribe() {
        let mut mux = SubscriptionMux::default();
        let (tx, rx) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx, || ids.next().unwrap());

        mux.fail_all_pending(&ProviderError::TooManyReconnects);

        assert!(matches!(rx.await.unwrap(), Err(ProviderError::JsonRpc(_))));
        assert!(mux.pending.is_empty());
        assert!(mux.by_request_id.is_empty());
    }

    #[tokio::test]
    async fn invalidate_all_closes_every_active_subscriptions_channel() {
        let mut mux = SubscriptionMux::default();
        let (tx, rx) = oneshot::channel();
        let mut ids = 0u64..;
        let _ = mux.subscribe(key(), tx, || ids.next().unwrap());
        mux.on_subscribe_success(0, 42);
        let (handle, mut notifications) = rx.await.unwrap().unwrap();

        mux.invalidate_all();

        assert!(notifications.recv().await.is_none());
        assert!(mux.active.is_empty());
        assert!(!mux.handles.contains_key(&handle.0));
    }
}
