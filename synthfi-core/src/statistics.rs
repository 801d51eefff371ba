//! A fire-and-forget telemetry sink for order-state transitions and subscription
//! lifecycle events. Lives in `synthfi-core` (rather than the facade crate) so both
//! `synthfi-providers` and `synthfi-exchange` can publish to it without a dependency
//! cycle back up to the facade.

use std::collections::HashMap;

/// A single point-in-time metric sample. `value` is deliberately `f64` rather than a
/// richer type — the sink is a dumb forwarder, not an aggregator.
#[derive(Clone, Debug)]
pub struct StatisticSample {
    pub name: &'static str,
    pub value: f64,
    pub tags: HashMap<&'static str, String>,
}

impl StatisticSample {
    pub fn new(name: &'static str, value: f64) -> Self {
        Self { name, value, tags: HashMap::new() }
    }

    pub fn with_tag(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.tags.insert(key, value.into());
        self
    }
}

/// Implementations must never block the caller and must never let a delivery failure
/// propagate as an error — statistics are observational, not load-bearing.
pub trait StatisticsSink: Send + Sync {
    fn publish(&self, sample: StatisticSample);
}

/// Discards every sample. The default for tests and for deployments that haven't wired
/// up a real publisher yet.
#[derive(Clone, Copy, Default)]
pub struct NoopStatisticsSink;

impl StatisticsSink for NoopStatisticsSink {
    fn publish(&self, _sample: StatisticSample) {}
}

/// Emits each sample as a `tracing` event at `TRACE` level, useful for local development
/// where a real metrics backend isn't worth standing up.
#[derive(Clone, Copy, Default)]
pub struct TracingStatisticsSink;

impl StatisticsSink for TracingStatisticsSink {
    fn publish(&self, sample: StatisticSample) {
        tracing::trace!(name = sample.name, value = sample.value, tags = ?sample.tags, "statistic");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_any_sample_without_panicking() {
        let sink = NoopStatisticsSink;
        sink.publish(StatisticSample::new("active_subscriptions", 3.0).with_tag("resource", "account"));
    }
}
