use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use synthfi_core::statistics::{NoopStatisticsSink, StatisticSample, StatisticsSink};

use crate::ftx::rest::FtxRestClient;
use crate::ftx::ws::FtxWsClient;
use crate::order::{order_status_metric_value, Order, OrderError, OrderSide, OrderStatus, OrderType};

#[derive(Serialize)]
struct PlaceOrderRequest<'a> {
    market: &'a str,
    side: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    price: Option<f64>,
    size: f64,
    #[serde(rename = "clientId")]
    client_id: String,
}

#[derive(Deserialize)]
struct PlaceOrderResponse {
    id: u64,
    status: String,
}

#[derive(Deserialize)]
struct OrderStatusResponse {
    status: String,
}

/// Places and cancels orders against FTX, the direct counterpart of `FtxOrderClient`.
/// `send_order` posts via REST and then, when a websocket execution-report stream is
/// attached, waits for the matching `clientId` to show up on the `orders` channel before
/// returning, the way the original client folded the REST ack and the WS fill report into
/// one result `Order`.
pub struct FtxOrderClient {
    rest: FtxRestClient,
    ws: Option<FtxWsClient>,
    fill_wait: Duration,
    statistics: Arc<dyn StatisticsSink>,
}

impl FtxOrderClient {
    pub fn new(rest: FtxRestClient) -> Self {
        Self { rest, ws: None, fill_wait: Duration::from_secs(5), statistics: Arc::new(NoopStatisticsSink) }
    }

    pub fn with_execution_reports(mut self, ws: FtxWsClient) -> Self {
        self.ws = Some(ws);
        self
    }

    pub fn with_statistics_sink(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.statistics = sink;
        self
    }

    fn publish_status(&self, order: &Order) {
        self.statistics.publish(
            StatisticSample::new("ftx_order_status", order_status_metric_value(order.status))
                .with_tag("client_id", order.client_id.to_string())
                .with_tag("status", format!("{:?}", order.status)),
        );
    }

    /// Confirms the configured credentials can reach the account endpoint before the
    /// client is used to place orders.
    pub async fn login(&self) -> Result<(), OrderError> {
        let _: serde_json::Value = self.rest.request::<(), _>(Method::GET, "/account", None).await?;
        Ok(())
    }

    pub async fn send_order(&self, mut order: Order) -> Result<Order, OrderError> {
        let body = PlaceOrderRequest {
            market: &order.market,
            side: match order.side {
                OrderSide::Buy => "buy",
                OrderSide::Sell => "sell",
            },
            order_type: match order.order_type {
                OrderType::Limit => "limit",
                OrderType::Market => "market",
            },
            price: matches!(order.order_type, OrderType::Limit).then_some(order.price),
            size: order.size,
            client_id: order.client_id.to_string(),
        };

        let response: PlaceOrderResponse =
            self.rest.request(Method::POST, "/orders", Some(&body)).await?;
        order.status = OrderStatus::Submitted;

        order.status = match response.status.as_str() {
            "new" | "open" => OrderStatus::Submitted,
            "closed" => OrderStatus::Confirmed,
            _ => {
                order.status = OrderStatus::Rejected;
                self.publish_status(&order);
                return Err(OrderError::Rejected(response.status));
            }
        };
        tracing::debug!(order_id = response.id, status = %response.status, "order submitted to ftx");
        self.publish_status(&order);

        if let Some(ws) = &self.ws {
            if let Ok(status) = self.await_execution_report(ws, order.client_id).await {
                order.status = status;
                self.publish_status(&order);
            }
        }

        Ok(order)
    }

    async fn await_execution_report(&self, ws: &FtxWsClient, client_id: u64) -> Result<OrderStatus, OrderError> {
        let mut rx = ws.subscribe();
        let deadline = tokio::time::Instant::now() + self.fill_wait;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(OrderError::TimedOut);
            }

            let message = tokio::time::timeout(remaining, rx.recv())
                .await
                .map_err(|_| OrderError::TimedOut)?
                .map_err(|_| OrderError::TimedOut)?;

            let Some(data) = message.get("data") else { continue };
            let Some(reported_client_id) = data.get("clientId").and_then(|v| v.as_str()) else { continue };
            if reported_client_id != client_id.to_string() {
                continue;
            }

            return Ok(match data.get("status").and_then(|v| v.as_str()) {
                Some("closed") => OrderStatus::Confirmed,
                Some("new") | Some("open") => OrderStatus::Submitted,
                _ => OrderStatus::Rejected,
            });
        }
    }

    pub async fn cancel_order(&self, order: &Order) -> Result<(), OrderError> {
        let path = format!("/orders/by_client_id/{}", order.client_id);
        let _: serde_json::Value = self.rest.request::<(), _>(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub async fn order_status(&self, client_id: u64) -> Result<OrderStatus, OrderError> {
        let path = format!("/orders/by_client_id/{client_id}");
        let response: OrderStatusResponse = self.rest.request::<(), _>(Method::GET, &path, None).await?;
        Ok(match response.status.as_str() {
            "new" | "open" => OrderStatus::Submitted,
            "closed" => OrderStatus::Confirmed,
            _ => OrderStatus::Rejected,
        })
    }
}
