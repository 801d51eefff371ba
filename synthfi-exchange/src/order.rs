//! The order state machine shared by both venues: `New` the moment a caller asks to
//! place it, `Submitted` once the venue has accepted the wire request, and finally one of
//! `Confirmed`/`Rejected`/`TimedOut` once the venue (or, for Mango, a signature
//! confirmation) reports the outcome.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Submitted,
    Confirmed,
    Rejected,
    TimedOut,
}

#[derive(Clone, Debug)]
pub struct Order {
    pub client_id: u64,
    pub market: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: f64,
    pub size: f64,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(client_id: u64, market: impl Into<String>, side: OrderSide, order_type: OrderType, price: f64, size: f64) -> Self {
        Self { client_id, market: market.into(), side, order_type, price, size, status: OrderStatus::New }
    }
}

/// Maps a status to the numeric value published alongside it, so every venue's order
/// client reports the same metric shape to the statistics sink.
pub(crate) fn order_status_metric_value(status: OrderStatus) -> f64 {
    match status {
        OrderStatus::New => 0.0,
        OrderStatus::Submitted => 1.0,
        OrderStatus::Confirmed => 2.0,
        OrderStatus::Rejected => 3.0,
        OrderStatus::TimedOut => 4.0,
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order was rejected: {0}")]
    Rejected(String),

    #[error("timed out waiting for order confirmation")]
    TimedOut,

    #[error(transparent)]
    Provider(#[from] synthfi_providers::ProviderError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("venue returned an error ({code}): {message}")]
    Venue { code: i64, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_value_is_monotonic_through_the_happy_path() {
        let happy_path = [OrderStatus::New, OrderStatus::Submitted, OrderStatus::Confirmed];
        let values: Vec<f64> = happy_path.iter().copied().map(order_status_metric_value).collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn rejected_and_timed_out_have_distinct_values() {
        assert_ne!(
            order_status_metric_value(OrderStatus::Rejected),
            order_status_metric_value(OrderStatus::TimedOut)
        );
    }
}
