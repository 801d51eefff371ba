//! FTX's own websocket protocol: `{"op": "subscribe", "channel": ...}` rather than
//! JSON-RPC, so this does not reuse `synthfi-providers`'s Solana-specific engine — it's a
//! much smaller actor that just authenticates, subscribes to the `orders`/`fills`
//! channels, and republishes each message on a broadcast channel so multiple local
//! callers (an order client correlating fills, a wallet client watching positions) can
//! each see every message.

use futures_util::{SinkExt, StreamExt};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

use crate::ftx::rest::FtxAuthenticationConfig;
use crate::order::OrderError;

const FTX_WS_URL: &str = "wss://ftx.com/ws/";
const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct FtxWsClient {
    sender: broadcast::Sender<serde_json::Value>,
}

impl FtxWsClient {
    pub async fn connect(config: FtxAuthenticationConfig) -> Result<Self, OrderError> {
        let (stream, _) = tokio_tungstenite::connect_async(FTX_WS_URL)
            .await
            .map_err(|e| OrderError::Venue { code: 0, message: e.to_string() })?;
        let (mut write, mut read) = stream.split();

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the epoch")
            .as_millis() as i64;
        let mut mac = Hmac::<Sha256>::new_from_slice(config.api_secret.as_bytes())
            .expect("hmac accepts a key of any length");
        mac.update(format!("{timestamp}websocket_login").as_bytes());
        let sign = hex::encode(mac.finalize().into_bytes());

        let login = serde_json::json!({
            "op": "login",
            "args": {
                "key": config.api_key,
                "sign": sign,
                "time": timestamp,
                "subaccount": config.subaccount,
            }
        });
        write
            .send(Message::Text(login.to_string()))
            .await
            .map_err(|e| OrderError::Venue { code: 0, message: e.to_string() })?;

        for channel in ["orders", "fills"] {
            let subscribe = serde_json::json!({ "op": "subscribe", "channel": channel });
            write
                .send(Message::Text(subscribe.to_string()))
                .await
                .map_err(|e| OrderError::Venue { code: 0, message: e.to_string() })?;
        }

        let (sender, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        let task_sender = sender.clone();

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let Ok(Message::Text(text)) = msg else { continue };
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                    let _ = task_sender.send(value);
                }
            }
        });

        Ok(Self { sender })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<serde_json::Value> {
        self.sender.subscribe()
    }
}
