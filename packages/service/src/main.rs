//! Lakefeed service: one scrape-and-publish run per invocation.
//!
//! Scheduling is left to the environment (cron, systemd timer). Exit code 0
//! covers both a published run and the "no data today" case; sink failures
//! are logged, not fatal. Only a failure to fetch the source page aborts
//! with an error.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lakefeed::{
    BrokerSettings, BrokerSink, HttpPageFetcher, InfluxSettings, PageExtractor, Pipeline,
    PipelineSettings, ReadingCollector, TimeSeriesSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    // Load .env file if present (development)
    dotenvy::dotenv().ok();

    let settings = PipelineSettings::from_env();
    tracing::info!(source = %settings.source_url, "starting lakefeed run");

    let extractor =
        PageExtractor::new(HttpPageFetcher::new()).with_selectors(settings.selectors.clone());
    let collector = ReadingCollector::with_deadline(settings.collect_deadline);

    let mut pipeline = Pipeline::new(extractor, collector)
        .with_sink(Arc::new(BrokerSink::new(BrokerSettings::from_env())))
        .with_sink(Arc::new(TimeSeriesSink::new(InfluxSettings::from_env())));

    let report = pipeline.run(&settings.source_url).await?;
    println!("{}", report.summary());

    Ok(())
}
