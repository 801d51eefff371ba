//! The single-threaded strand that owns the correlator, the mux, and the current
//! websocket backend. Everything that touches either piece of state runs on this one
//! task, so neither needs a lock — the same cooperative-executor discipline the original
//! client got from a boost::asio strand, here expressed as one tokio task reading off an
//! instruction queue, the same shape as ethers' `RequestManager::spawn`.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::sync::{mpsc, oneshot};

use synthfi_core::{JsonRpcError, Request, Response};

use crate::backend::{self, BackendDriver};
use crate::correlator::{PendingRequest, RpcCorrelator};
use crate::error::ProviderError;
use crate::mux::{clone_provider_error, Dispatch, NotificationReceiver, SubscriptionHandle, SubscriptionMux};
use crate::subscription::ResourceKey;

/// How long a plain RPC call waits for a reply before the caller gets `Timeout` back.
/// Client-side only: the correlator entry is left for the engine to reap once (if ever)
/// the late response arrives, matching `SignatureSubscriber::confirm`'s timeout shape.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a subscribe call is allowed to sit pending before every parked follower gets
/// `SubscribeTimeout`, mirroring the original's 30s `expiryTimer`.
const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) enum Instruction {
    Call {
        method: &'static str,
        params: serde_json::Value,
        reply: oneshot::Sender<Result<serde_json::Value, ProviderError>>,
    },
    Subscribe {
        key: ResourceKey,
        reply: oneshot::Sender<Result<(SubscriptionHandle, NotificationReceiver), ProviderError>>,
    },
    Unsubscribe {
        handle: SubscriptionHandle,
    },
    /// Self-dispatched by the timer `service` spawns for every new pending subscribe.
    SubscribeTimeout {
        request_id: u64,
    },
}

/// A cloneable front for a running `Engine`; every client crate's typed wrappers hold one
/// of these and translate their calls into `Instruction`s.
#[derive(Clone)]
pub struct EngineHandle {
    pub(crate) instructions: mpsc::UnboundedSender<Instruction>,
}

impl EngineHandle {
    pub(crate) async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let (reply, rx) = oneshot::channel();
        self.instructions
            .send(Instruction::Call { method, params, reply })
            .map_err(|_| ProviderError::DeadChannel)?;
        tokio::time::timeout(CALL_TIMEOUT, rx)
            .await
            .map_err(|_| ProviderError::Timeout)?
            .map_err(|_| ProviderError::DeadChannel)?
    }

    pub(crate) async fn subscribe(
        &self,
        key: ResourceKey,
    ) -> Result<(SubscriptionHandle, NotificationReceiver), ProviderError> {
        let (reply, rx) = oneshot::channel();
        self.instructions
            .send(Instruction::Subscribe { key, reply })
            .map_err(|_| ProviderError::DeadChannel)?;
        rx.await.map_err(|_| ProviderError::DeadChannel)?
    }

    pub(crate) fn unsubscribe(&self, handle: SubscriptionHandle) {
        let _ = self.instructions.send(Instruction::Unsubscribe { handle });
    }
}

/// How many times (and with what backoff) the engine will try to re-establish the
/// websocket connection before surfacing `TooManyReconnects` to every outstanding caller.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    pub max_attempts: usize,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

pub(crate) struct Engine {
    url: url::Url,
    backend: BackendDriver,
    correlator: RpcCorrelator,
    mux: SubscriptionMux,
    reconnects_left: usize,
    policy: ReconnectPolicy,
    instructions: mpsc::UnboundedReceiver<Instruction>,
    /// A clone of the handle's own sender, used to self-dispatch `SubscribeTimeout`
    /// from the spawned expiry timer.
    self_sender: mpsc::UnboundedSender<Instruction>,
}

impl Engine {
    pub(crate) async fn connect(
        url: url::Url,
        policy: ReconnectPolicy,
    ) -> Result<(Self, EngineHandle), ProviderError> {
        let backend = backend::connect(&url).await?;
        let (instructions_tx, instructions_rx) = mpsc::unbounded_channel();
        let reconnects_left = policy.max_attempts;
        Ok((
            Self {
                url,
                backend,
                correlator: RpcCorrelator::default(),
                mux: SubscriptionMux::default(),
                reconnects_left,
                policy,
                instructions: instructions_rx,
                self_sender: instructions_tx.clone(),
            },
            EngineHandle { instructions: instructions_tx },
        ))
    }

    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                frame = self.backend.inbound.recv() => {
                    match frame {
                        Some(text) => self.handle_frame(&text),
                        None => {
                            if let Err(err) = self.reconnect().await {
                                tracing::error!(%err, "giving up after exhausting reconnect budget");
                                break;
                            }
                        }
                    }
                }
                instruction = self.instructions.recv() => {
                    match instruction {
                        Some(instruction) => self.service(instruction),
                        None => break, // every EngineHandle dropped
                    }
                }
            }
        }
        self.backend.shutdown();
    }

    fn handle_frame(&mut self, text: &str) {
        let parsed: Result<Response<serde_json::Value>, _> = serde_json::from_str(text);
        let response = match parsed {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed json-rpc frame");
                return;
            }
        };

        match response {
            Response::Success { id, result } => self.handle_success(id, result),
            Response::Error { id, error } => self.handle_error(id, error),
            Response::Notification { params, .. } => {
                self.mux.on_notification(params.subscription, params.result)
            }
        }
    }

    fn handle_success(&mut self, id: u64, result: serde_json::Value) {
        match self.correlator.take(id) {
            Some(PendingRequest::Call(reply)) => {
                let _ = reply.send(Ok(result));
            }
            Some(PendingRequest::Subscribe(_)) => {
                let server_id = result.as_u64().unwrap_or_default();
                self.mux.on_subscribe_success(id, server_id);
            }
            Some(PendingRequest::Unsubscribe) | None => {}
        }
    }

    fn handle_error(&mut self, id: u64, error: JsonRpcError) {
        match self.correlator.take(id) {
            Some(PendingRequest::Call(reply)) => {
                let _ = reply.send(Err(ProviderError::JsonRpc(error)));
            }
            Some(PendingRequest::Subscribe(_)) => {
                self.mux.on_subscribe_error(id, ProviderError::JsonRpc(error));
            }
            Some(PendingRequest::Unsubscribe) | None => {}
        }
    }

    fn service(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::Call { method, params, reply } => {
                let id = self.correlator.next_id();
                self.correlator.register_call(id, reply);
                self.send(id, method, params);
            }
            Instruction::Subscribe { key, reply } => {
                let correlator = &self.correlator;
                let dispatch = self.mux.subscribe(key.clone(), reply, || correlator.next_id());
                if let Dispatch::Send { id, method, params } = dispatch {
                    self.correlator.register_subscribe(id, key);
                    self.send(id, method, params);
                    self.spawn_subscribe_timeout(id);
                }
            }
            Instruction::Unsubscribe { handle } => {
                let correlator = &self.correlator;
                let dispatch = self.mux.unsubscribe(handle, || correlator.next_id());
                if let Dispatch::Send { id, method, params } = dispatch {
                    self.correlator.register_unsubscribe(id);
                    self.send(id, method, params);
                }
            }
            Instruction::SubscribeTimeout { request_id } => {
                self.correlator.take(request_id);
                self.mux.on_subscribe_timeout(request_id);
            }
        }
    }

    /// Schedules `request_id`'s expiry: if neither a success nor an error frame arrives
    /// within `SUBSCRIBE_TIMEOUT`, the mux fails every follower parked on it.
    fn spawn_subscribe_timeout(&self, request_id: u64) {
        let sender = self.self_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SUBSCRIBE_TIMEOUT).await;
            let _ = sender.send(Instruction::SubscribeTimeout { request_id });
        });
    }

    fn send(&mut self, id: u64, method: &str, params: serde_json::Value) {
        let request = Request::new(id, method, params);
        match serde_json::to_string(&request) {
            Ok(text) => {
                if self.backend.outbound.send(text).is_err() {
                    tracing::debug!("backend gone while dispatching request, will retry after reconnect");
                }
            }
            Err(err) => tracing::error!(%err, "failed to serialize outgoing request"),
        }
    }

    async fn reconnect(&mut self) -> Result<(), ProviderError> {
        let mut backoff = self.policy.backoff();

        loop {
            if self.reconnects_left == 0 {
                self.fail_all_pending(ProviderError::TooManyReconnects);
                return Err(ProviderError::TooManyReconnects);
            }
            self.reconnects_left -= 1;

            match backend::connect(&self.url).await {
                Ok(backend) => {
                    self.backend.shutdown();
                    self.backend = backend;
                    self.invalidate_active_subscriptions();
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(%err, remaining = self.reconnects_left, "reconnect attempt failed");
                    match backoff.next_backoff() {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => {
                            self.fail_all_pending(ProviderError::TooManyReconnects);
                            return Err(ProviderError::TooManyReconnects);
                        }
                    }
                }
            }
        }
    }

    /// Fails every outstanding call and subscribe, the terminal path taken once the
    /// reconnect budget is exhausted. Correlator-tracked calls get `error` directly;
    /// mux-tracked subscribes (whose followers the correlator never sees individually)
    /// are drained through the mux so no coalesced caller is left waiting on a reply
    /// that will never arrive.
    fn fail_all_pending(&mut self, error: ProviderError) {
        for pending in self.correlator.drain() {
            if let PendingRequest::Call(reply) = pending {
                let _ = reply.send(Err(clone_provider_error(&error)));
            }
        }
        self.mux.fail_all_pending(&error);
    }

    /// Invalidates every active subscription after a successful reconnect: the old
    /// server-side subscription ids are meaningless to the new connection, so owners are
    /// notified (their notification channel closes) rather than silently resubscribed.
    /// Re-subscribing, if wanted, is left to the caller.
    fn invalidate_active_subscriptions(&mut self) {
        self.mux.invalidate_all();
    }
}
