//! Telemetry sinks: one trait, two destinations.

mod broker;
mod timeseries;

pub use broker::BrokerSink;
pub use timeseries::TimeSeriesSink;

use async_trait::async_trait;

use crate::types::{AggregatedReading, PublishOutcome};

/// A telemetry destination.
///
/// One publish attempt per run. All failure (configuration, connect, parse,
/// write) is folded into the returned [`PublishOutcome`], so one sink can
/// never abort another's attempt or the pipeline itself.
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn publish(&self, reading: &AggregatedReading) -> PublishOutcome;

    /// Sink name, used in outcomes and logs.
    fn name(&self) -> &str;
}
