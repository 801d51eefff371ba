use std::sync::Arc;

use synthfi_core::statistics::{NoopStatisticsSink, StatisticSample, StatisticsSink};
use synthfi_core::{AccountInfo, Commitment, PublicKey, Signature};
use synthfi_providers::HttpRpcClient;
use synthfi_providers::SolanaPubSubClient;
use synthfi_signers::LocalWallet;

use crate::order::{order_status_metric_value, Order, OrderError, OrderStatus};

/// Places orders against an on-chain Mango market. Collapses `MangoOrderClientImpl`'s
/// constructor (one client per sub-service: http, account/signature/slot subscribers,
/// keystore) down to the two client handles those sub-services now share: an
/// `HttpRpcClient` for plain RPC calls and a `SolanaPubSubClient` for the
/// subscribe/confirm flow.
///
/// Building and signing the actual Mango program instruction is out of scope here; this
/// client takes an already-signed, base64-encoded transaction and owns the
/// submit-then-await-confirmation half of placing and cancelling an order, the part that
/// actually depends on the subscription multiplexer.
pub struct MangoOrderClient {
    http: HttpRpcClient,
    pubsub: SolanaPubSubClient,
    wallet: Arc<LocalWallet>,
    mango_account: PublicKey,
    confirm_commitment: Commitment,
    statistics: Arc<dyn StatisticsSink>,
}

impl MangoOrderClient {
    pub fn new(
        http: HttpRpcClient,
        pubsub: SolanaPubSubClient,
        wallet: Arc<LocalWallet>,
        mango_account: PublicKey,
    ) -> Self {
        Self {
            http,
            pubsub,
            wallet,
            mango_account,
            confirm_commitment: Commitment::Confirmed,
            statistics: Arc::new(NoopStatisticsSink),
        }
    }

    pub fn with_statistics_sink(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.statistics = sink;
        self
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }

    fn publish_status(&self, order: &Order) {
        self.statistics.publish(
            StatisticSample::new("mango_order_status", order_status_metric_value(order.status))
                .with_tag("client_id", order.client_id.to_string())
                .with_tag("status", format!("{:?}", order.status)),
        );
    }

    pub async fn load_mango_account(&self) -> Result<AccountInfo, OrderError> {
        self.http
            .get_account_info(self.mango_account)
            .await?
            .ok_or_else(|| OrderError::Rejected("mango account does not exist".to_string()))
    }

    /// Submits `signed_transaction` (base64) and waits for the server's own
    /// `signatureSubscribe` notification before reporting the order as confirmed,
    /// mirroring the rendezvous the original `send_order`/`cancel_order` both used.
    pub async fn submit_and_confirm(
        &self,
        mut order: Order,
        signature: Signature,
        signed_transaction: &str,
    ) -> Result<Order, OrderError> {
        self.http.send_transaction(signed_transaction).await?;
        order.status = OrderStatus::Submitted;
        self.publish_status(&order);

        let subscriber = self.pubsub.signature_subscriber();
        let notification = match subscriber.confirm(signature, self.confirm_commitment).await {
            Ok(notification) => notification,
            Err(synthfi_providers::ProviderError::ConfirmationTimeout) => {
                order.status = OrderStatus::TimedOut;
                self.publish_status(&order);
                return Err(OrderError::TimedOut);
            }
            Err(err) => return Err(err.into()),
        };

        order.status = match notification.err {
            None => OrderStatus::Confirmed,
            Some(err) => {
                tracing::warn!(client_id = order.client_id, %err, "mango order rejected on-chain");
                OrderStatus::Rejected
            }
        };
        self.publish_status(&order);
        Ok(order)
    }

    pub async fn send_order(
        &self,
        order: Order,
        signature: Signature,
        signed_transaction: &str,
    ) -> Result<Order, OrderError> {
        self.submit_and_confirm(order, signature, signed_transaction).await
    }

    pub async fn cancel_order(
        &self,
        order: Order,
        signature: Signature,
        signed_transaction: &str,
    ) -> Result<Order, OrderError> {
        self.submit_and_confirm(order, signature, signed_transaction).await
    }
}
