use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::ftx::rest::FtxRestClient;
use crate::order::OrderError;
use crate::wallet::Wallet;

#[derive(Clone, Debug, Deserialize)]
pub struct Balance {
    pub coin: String,
    pub free: f64,
    pub total: f64,
}

/// Balance and deposit-address queries against FTX, the counterpart of
/// `FtxWalletClient`.
pub struct FtxWalletClient {
    rest: FtxRestClient,
}

impl FtxWalletClient {
    pub fn new(rest: FtxRestClient) -> Self {
        Self { rest }
    }

    pub async fn balances(&self) -> Result<Vec<Balance>, OrderError> {
        self.rest.request::<(), _>(Method::GET, "/wallet/balances", None).await
    }

    /// Polls `/wallet/balances` on `interval` and republishes each as a `Wallet`
    /// snapshot. A true push feed would ride `FtxWsClient`'s position updates instead;
    /// this adapter presents the same subscription shape in the meantime.
    pub fn subscribe_wallet(self: std::sync::Arc<Self>, interval: Duration) -> mpsc::Receiver<Wallet> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Ok(balances) = self.balances().await else { continue };
                for balance in balances {
                    let wallet = Wallet {
                        venue: "ftx",
                        currency: balance.coin,
                        total: balance.total,
                        available: balance.free,
                        extra: HashMap::new(),
                    };
                    if tx.send(wallet).await.is_err() {
                        return;
                    }
                }
            }
        });

        rx
    }
}
