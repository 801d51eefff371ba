use std::collections::HashMap;

use synthfi_core::{Commitment, PublicKey, TokenMintAccount};
use synthfi_providers::{HttpRpcClient, SolanaPubSubClient};
use tokio::sync::mpsc;

use crate::order::OrderError;
use crate::wallet::Wallet;

/// Reads SPL token mint metadata used to interpret Mango account balances, the
/// counterpart of the wallet-side queries `MangoOrderClientImpl` made through its
/// `SolanaHttpClientService` handle.
pub struct MangoWalletClient {
    http: HttpRpcClient,
    pubsub: SolanaPubSubClient,
    margin_account: PublicKey,
}

impl MangoWalletClient {
    pub fn new(http: HttpRpcClient, pubsub: SolanaPubSubClient, margin_account: PublicKey) -> Self {
        Self { http, pubsub, margin_account }
    }

    /// A live feed of margin-account snapshots, fed by the shared account-subscription
    /// mux rather than a bespoke poller — every local caller of this account coalesces
    /// onto the same upstream `accountSubscribe`.
    pub async fn subscribe_wallet(&self) -> Result<mpsc::Receiver<Wallet>, OrderError> {
        let (_handle, mut notifications) = self
            .pubsub
            .account_subscriber()
            .subscribe(self.margin_account, Commitment::Confirmed)
            .await?;

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            while let Some(Ok(info)) = notifications.next().await {
                let wallet = Wallet {
                    venue: "mango",
                    currency: "margin_account".to_string(),
                    total: info.lamports as f64,
                    available: info.lamports as f64,
                    extra: HashMap::new(),
                };
                if tx.send(wallet).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }

    pub async fn load_mint(&self, mint: PublicKey) -> Result<TokenMintAccount, OrderError> {
        let account = self
            .http
            .get_account_info(mint)
            .await?
            .ok_or_else(|| OrderError::Rejected("mint account does not exist".to_string()))?;
        account.decode_as::<TokenMintAccount>().map_err(|e| OrderError::Provider(e.into()))
    }

    pub async fn load_mints(&self, mints: &[PublicKey]) -> Result<Vec<Option<TokenMintAccount>>, OrderError> {
        let accounts = self.http.get_multiple_accounts(mints).await?;
        accounts
            .into_iter()
            .map(|maybe| {
                maybe
                    .map(|info| info.decode_as::<TokenMintAccount>().map_err(|e| OrderError::Provider(e.into())))
                    .transpose()
            })
            .collect()
    }
}
