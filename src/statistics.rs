//! Re-exports the telemetry sink from `synthfi_core`, where it lives so that
//! `synthfi-providers` and `synthfi-exchange` can publish to it directly without a
//! dependency cycle back up through this facade crate.

pub use synthfi_core::statistics::{NoopStatisticsSink, StatisticSample, StatisticsSink, TracingStatisticsSink};
