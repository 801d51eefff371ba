//! Plain request/response JSON-RPC over HTTP, for the Solana methods that don't need a
//! subscription: `getAccountInfo`, `getMultipleAccounts`, `getRecentBlockhash` and
//! `sendTransaction`. Grounded on ethers' `rpc::transports::http::Provider`, generalized
//! with the same bounded-backoff retry the websocket engine uses for reconnects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::Client;

use synthfi_core::{AccountInfo, Hash, PublicKey, Request, Response};

use crate::error::ProviderError;

/// The node silently caps `getMultipleAccounts` at 100 pubkeys per call; callers ask for
/// more and this client transparently batches.
pub const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Applied to every call unless overridden via [`HttpRpcClient::with_timeout`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpRpcClient {
    id: std::sync::Arc<AtomicU64>,
    client: Client,
    url: url::Url,
    retries: usize,
}

impl HttpRpcClient {
    pub fn new(url: url::Url) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Builds a client whose underlying `reqwest::Client` enforces `timeout` on every
    /// call, so a node that stops answering mid-request fails instead of blocking the
    /// caller's strand forever.
    pub fn with_timeout(url: url::Url, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is always valid");
        Self { id: Default::default(), client, url, retries: 3 }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    fn next_id(&self) -> u64 {
        self.id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, ProviderError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;
        loop {
            let id = self.next_id();
            let request = Request::new(id, method, &params);
            let send_result = self.client.post(self.url.clone()).json(&request).send().await;

            match send_result {
                Ok(resp) => match resp.json::<Response<R>>().await {
                    Ok(Response::Success { result, .. }) => return Ok(result),
                    Ok(Response::Error { error, .. }) => return Err(ProviderError::JsonRpc(error)),
                    Ok(Response::Notification { .. }) => {
                        return Err(ProviderError::UnknownRequestId(id))
                    }
                    Err(err) => {
                        if attempt >= self.retries {
                            return Err(ProviderError::Http(err));
                        }
                    }
                },
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(ProviderError::Http(err));
                    }
                }
            }

            attempt += 1;
            match backoff.next_backoff() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(ProviderError::TooManyReconnects),
            }
        }
    }

    pub async fn get_account_info(
        &self,
        account: PublicKey,
    ) -> Result<Option<AccountInfo>, ProviderError> {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            value: Option<AccountInfo>,
        }
        let params = serde_json::json!([account.to_string(), { "encoding": "base64" }]);
        let wrapper: Wrapper = self.call("getAccountInfo", params).await?;
        Ok(wrapper.value)
    }

    /// Splits `accounts` into `MAX_MULTIPLE_ACCOUNTS`-sized batches and issues one call
    /// per batch, preserving input order in the result.
    pub async fn get_multiple_accounts(
        &self,
        accounts: &[PublicKey],
    ) -> Result<Vec<Option<AccountInfo>>, ProviderError> {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            value: Vec<Option<AccountInfo>>,
        }

        let mut out = Vec::with_capacity(accounts.len());
        for chunk in accounts.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let keys: Vec<String> = chunk.iter().map(PublicKey::to_string).collect();
            let params = serde_json::json!([keys, { "encoding": "base64" }]);
            let wrapper: Wrapper = self.call("getMultipleAccounts", params).await?;
            out.extend(wrapper.value);
        }
        Ok(out)
    }

    pub async fn get_recent_blockhash(&self) -> Result<Hash, ProviderError> {
        #[derive(serde::Deserialize)]
        struct BlockhashValue {
            blockhash: Hash,
        }
        #[derive(serde::Deserialize)]
        struct Wrapper {
            value: BlockhashValue,
        }
        let wrapper: Wrapper = self.call("getRecentBlockhash", serde_json::json!([])).await?;
        Ok(wrapper.value.blockhash)
    }

    /// `transaction` is the base64-encoded, already-signed wire transaction.
    pub async fn send_transaction(&self, transaction: &str) -> Result<synthfi_core::Signature, ProviderError> {
        let params = serde_json::json!([transaction, { "encoding": "base64" }]);
        self.call("sendTransaction", params).await
    }
}
