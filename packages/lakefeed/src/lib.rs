//! Lake telemetry pipeline: scrape one page, fan out to many sinks.
//!
//! One run extracts the water level and water temperature from the source
//! page and forwards the temperature to every registered sink: an MQTT
//! topic and an InfluxDB database in the shipped configuration. Sink
//! attempts are isolated: one unreachable destination never blocks the
//! other.
//!
//! # Module structure
//!
//! ```text
//! lakefeed
//! ├── types     - Measurement, CollectedReadings, AggregatedReading, outcomes
//! ├── config    - selector set + per-sink settings (env-shaped, lazily validated)
//! ├── error     - FetchError (fatal) / PublishError (contained per sink)
//! ├── fetch     - PageFetcher seam + reqwest implementation
//! ├── extract   - per-kind selector watchers feeding the measurement channel
//! ├── collect   - kind-keyed, deadline-bounded collector
//! ├── sinks     - ReadingSink trait, BrokerSink (MQTT), TimeSeriesSink (InfluxDB)
//! ├── pipeline  - single-shot orchestration, state machine, run report
//! └── testing   - MockPageFetcher, RecordingSink, page fixtures
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lakefeed::{
//!     BrokerSettings, BrokerSink, HttpPageFetcher, InfluxSettings, PageExtractor,
//!     Pipeline, ReadingCollector, TimeSeriesSink,
//! };
//!
//! let mut pipeline = Pipeline::new(
//!     PageExtractor::new(HttpPageFetcher::new()),
//!     ReadingCollector::new(),
//! )
//! .with_sink(Arc::new(BrokerSink::new(BrokerSettings::from_env())))
//! .with_sink(Arc::new(TimeSeriesSink::new(InfluxSettings::from_env())));
//!
//! let report = pipeline.run("https://example.com/lake").await?;
//! println!("{}", report.summary());
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod sinks;
pub mod testing;
pub mod types;

// Re-export the working surface at the crate root.
pub use collect::{ReadingCollector, DEFAULT_COLLECT_DEADLINE};
pub use config::{
    BrokerSettings, InfluxSettings, PipelineSettings, SelectorSet, DEFAULT_SOURCE_URL,
};
pub use error::{FetchError, FetchResult, PublishError, PublishResult};
pub use extract::{PageExtractor, MEASUREMENT_CHANNEL_CAPACITY};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use pipeline::{Pipeline, PipelineState};
pub use sinks::{BrokerSink, ReadingSink, TimeSeriesSink};
pub use types::{
    AggregatedReading, CollectedReadings, Measurement, MeasurementKind, PublishOutcome, RunReport,
};
