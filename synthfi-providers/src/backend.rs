//! The raw websocket actor: owns the split stream, forwards inbound text frames to the
//! engine and outbound frames from it, and keeps the connection alive with a periodic
//! ping. Structurally this is ethers' `WsBackend`/`BackendDriver` split — a dedicated task
//! plus a small set of channels used to drive it from the owning actor.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::ProviderError;

const PING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Handle the engine holds to talk to a running `WsBackend`.
pub(crate) struct BackendDriver {
    pub(crate) outbound: mpsc::UnboundedSender<String>,
    pub(crate) inbound: mpsc::UnboundedReceiver<String>,
    pub(crate) closed: oneshot::Receiver<()>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl BackendDriver {
    pub(crate) fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub(crate) async fn connect(url: &url::Url) -> Result<BackendDriver, ProviderError> {
    let (stream, _) = connect_async(url.as_str()).await?;
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let backend = WsBackend { stream, outbound: outbound_rx, inbound: inbound_tx, closed: closed_tx, shutdown: shutdown_rx };
    backend.spawn();

    Ok(BackendDriver { outbound: outbound_tx, inbound: inbound_rx, closed: closed_rx, shutdown: Some(shutdown_tx) })
}

struct WsBackend {
    stream: WsStream,
    outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<String>,
    closed: oneshot::Sender<()>,
    shutdown: oneshot::Receiver<()>,
}

impl WsBackend {
    fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown => {
                    let _ = self.stream.close(None).await;
                    break;
                }
                _ = ping.tick() => {
                    if self.stream.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
                frame = self.outbound.recv() => {
                    match frame {
                        Some(text) => {
                            if self.stream.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                msg = self.stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if self.inbound.send(text).is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("dropping unexpected binary websocket frame");
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(err)) => {
                            tracing::warn!(%err, "websocket read error");
                            break;
                        }
                    }
                }
            }
        }

        let _ = self.closed.send(());
    }
}
