//! Pipeline orchestration: extract → collect → fan-out publish.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::collect::ReadingCollector;
use crate::error::FetchResult;
use crate::extract::{PageExtractor, MEASUREMENT_CHANNEL_CAPACITY};
use crate::fetch::PageFetcher;
use crate::sinks::ReadingSink;
use crate::types::{PublishOutcome, RunReport};

/// Pipeline phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Extracting,
    Collecting,
    Publishing,
    Done,
}

/// Single-shot pipeline runner.
///
/// One invocation fetches the page, waits (bounded) for the readings, then
/// attempts every registered sink concurrently. Sink outcomes are isolated:
/// a failed attempt is reported and the rest proceed untouched.
pub struct Pipeline<F: PageFetcher> {
    extractor: PageExtractor<F>,
    collector: ReadingCollector,
    sinks: Vec<Arc<dyn ReadingSink>>,
    state: PipelineState,
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(extractor: PageExtractor<F>, collector: ReadingCollector) -> Self {
        Self {
            extractor,
            collector,
            sinks: Vec::new(),
            state: PipelineState::Idle,
        }
    }

    /// Register a sink. Outcomes are reported in registration order.
    pub fn with_sink(mut self, sink: Arc<dyn ReadingSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Current phase, for observability.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the pipeline once.
    ///
    /// A fetch-level failure aborts with an error (zero measurements
    /// guaranteed); everything downstream resolves to a [`RunReport`].
    pub async fn run(&mut self, url: &str) -> FetchResult<RunReport> {
        self.state = PipelineState::Extracting;
        let (tx, rx) = mpsc::channel(MEASUREMENT_CHANNEL_CAPACITY);
        self.extractor.extract(url, tx).await?;

        self.state = PipelineState::Collecting;
        let readings = self.collector.collect(rx).await;
        info!(
            level = readings.level.as_deref().unwrap_or(""),
            temperature = readings.temperature.as_deref().unwrap_or(""),
            "readings collected"
        );
        if !readings.is_complete() {
            warn!("reading set incomplete");
        }

        let Some(reading) = readings.into_reading() else {
            info!("no temperature data, nothing to publish");
            self.state = PipelineState::Done;
            return Ok(RunReport::NoData);
        };

        self.state = PipelineState::Publishing;
        let attempts = self.sinks.iter().map(|sink| {
            let sink = Arc::clone(sink);
            let reading = reading.clone();
            async move { sink.publish(&reading).await }
        });
        let outcomes: Vec<PublishOutcome> = join_all(attempts).await;

        for outcome in &outcomes {
            match &outcome.error {
                None => info!(sink = %outcome.sink, "publish succeeded"),
                Some(error) => warn!(sink = %outcome.sink, error = %error, "publish failed"),
            }
        }

        self.state = PipelineState::Done;
        Ok(RunReport::Published { reading, outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lake_page, MockPageFetcher, RecordingSink};

    const URL: &str = "https://example.com/lake";

    #[tokio::test]
    async fn test_state_progression() {
        let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
        let mut pipeline = Pipeline::new(PageExtractor::new(fetcher), ReadingCollector::new());
        assert_eq!(pipeline.state(), PipelineState::Idle);

        pipeline.run(URL).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let fetcher = MockPageFetcher::new().with_failure(500);
        let sink = Arc::new(RecordingSink::succeeding("a"));
        let mut pipeline = Pipeline::new(PageExtractor::new(fetcher), ReadingCollector::new())
            .with_sink(sink.clone());

        assert!(pipeline.run(URL).await.is_err());
        assert_eq!(sink.publish_count(), 0);
    }
}
