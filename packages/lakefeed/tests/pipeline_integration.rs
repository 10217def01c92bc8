//! End-to-end pipeline tests over mocked collaborators.
//!
//! The full flow (fetch, watcher firing, collection, fan-out) runs against
//! canned documents and scripted sinks; only the network is fake.

use std::sync::Arc;
use std::time::Duration;

use lakefeed::testing::{lake_page, MockPageFetcher, RecordingSink};
use lakefeed::{
    BrokerSettings, BrokerSink, InfluxSettings, PageExtractor, Pipeline, ReadingCollector,
    RunReport, TimeSeriesSink,
};

const URL: &str = "https://example.com/lake";

fn pipeline_over(
    fetcher: MockPageFetcher,
    sinks: Vec<Arc<RecordingSink>>,
) -> Pipeline<MockPageFetcher> {
    let mut pipeline = Pipeline::new(
        PageExtractor::new(fetcher),
        ReadingCollector::with_deadline(Duration::from_secs(2)),
    );
    for sink in sinks {
        pipeline = pipeline.with_sink(sink);
    }
    pipeline
}

#[tokio::test]
async fn aggregates_and_strips_unit_suffixes() {
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
    let sink = Arc::new(RecordingSink::succeeding("ts"));
    let mut pipeline = pipeline_over(fetcher, vec![sink.clone()]);

    let report = pipeline.run(URL).await.unwrap();

    let RunReport::Published { reading, outcomes } = report else {
        panic!("expected a published report");
    };
    assert_eq!(reading.level, "915.2");
    assert_eq!(reading.temperature, "71");
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].success);

    // The sink saw exactly the aggregated reading.
    assert_eq!(sink.published(), vec![reading]);
}

#[tokio::test]
async fn summary_combines_both_readings() {
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
    let mut pipeline = pipeline_over(fetcher, vec![]);

    let report = pipeline.run(URL).await.unwrap();
    assert_eq!(report.summary(), "Level: 915.2 ft\nTemp: 71 ºF");
}

#[tokio::test]
async fn missing_temperature_is_no_data_with_zero_publishes() {
    // Level present, temperature element absent: that watcher never fires.
    let html = r#"<html><body><span id="wrsn-temp-weather-1">915.2′</span></body></html>"#;
    let fetcher = MockPageFetcher::new().with_document(URL, html);
    let sinks = vec![
        Arc::new(RecordingSink::succeeding("mqtt")),
        Arc::new(RecordingSink::succeeding("influxdb")),
    ];
    let mut pipeline = pipeline_over(fetcher, sinks.clone());

    let report = pipeline.run(URL).await.unwrap();

    assert!(matches!(report, RunReport::NoData));
    for sink in &sinks {
        assert_eq!(sink.publish_count(), 0, "no publish may happen without a temperature");
    }
}

#[tokio::test]
async fn empty_temperature_text_is_no_data() {
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", ""));
    let mut pipeline = pipeline_over(fetcher, vec![Arc::new(RecordingSink::succeeding("ts"))]);

    let report = pipeline.run(URL).await.unwrap();
    assert!(matches!(report, RunReport::NoData));
}

#[tokio::test]
async fn missing_level_still_publishes_temperature() {
    let html = r#"<html><body><span id="wrsn-temp-1">71°F</span></body></html>"#;
    let fetcher = MockPageFetcher::new().with_document(URL, html);
    let sink = Arc::new(RecordingSink::succeeding("ts"));
    let mut pipeline = pipeline_over(fetcher, vec![sink.clone()]);

    let report = pipeline.run(URL).await.unwrap();

    let RunReport::Published { reading, .. } = report else {
        panic!("expected a published report");
    };
    assert_eq!(reading.temperature, "71");
    assert_eq!(reading.level, "");
    assert_eq!(sink.publish_count(), 1);
}

#[tokio::test]
async fn sink_failure_is_isolated_from_the_other_sink() {
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
    let failing = Arc::new(RecordingSink::failing("mqtt", "connect failed: unreachable"));
    let succeeding = Arc::new(RecordingSink::succeeding("influxdb"));
    let mut pipeline = pipeline_over(fetcher, vec![failing.clone(), succeeding.clone()]);

    let report = pipeline.run(URL).await.unwrap();

    let RunReport::Published { outcomes, .. } = report else {
        panic!("expected a published report");
    };
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].sink, "mqtt");
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[1].sink, "influxdb");
    assert!(outcomes[1].success);

    // Both sinks were attempted with the same reading.
    assert_eq!(failing.publish_count(), 1);
    assert_eq!(succeeding.publish_count(), 1);
    assert_eq!(failing.published(), succeeding.published());
}

#[tokio::test]
async fn real_broker_sink_config_error_among_recording_sinks() {
    // A misconfigured broker sink (no prefix) reports a configuration error
    // without any network attempt; the neighboring sink still succeeds.
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
    let broker = Arc::new(BrokerSink::new(
        BrokerSettings::default().with_server("127.0.0.1"),
    ));
    let recording = Arc::new(RecordingSink::succeeding("influxdb"));

    let mut pipeline = Pipeline::new(
        PageExtractor::new(fetcher),
        ReadingCollector::with_deadline(Duration::from_secs(2)),
    )
    .with_sink(broker)
    .with_sink(recording.clone());

    let report = pipeline.run(URL).await.unwrap();

    let RunReport::Published { outcomes, .. } = report else {
        panic!("expected a published report");
    };
    assert!(!outcomes[0].success);
    assert!(outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("MQTT_PREFIX"));
    assert!(outcomes[1].success);
    assert_eq!(recording.publish_count(), 1);
}

#[tokio::test]
async fn parse_failure_does_not_abort_the_broker_attempt() {
    // A temperature that isn't numeric fails the time-series sink at the
    // parse step; the broker-side attempt still runs and succeeds.
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "seventy°F"));
    let broker = Arc::new(RecordingSink::succeeding("mqtt"));
    let timeseries = Arc::new(TimeSeriesSink::new(
        InfluxSettings::default()
            .with_server("127.0.0.1")
            .with_prefix("lake"),
    ));

    let mut pipeline = Pipeline::new(
        PageExtractor::new(fetcher),
        ReadingCollector::with_deadline(Duration::from_secs(2)),
    )
    .with_sink(broker.clone())
    .with_sink(timeseries);

    let report = pipeline.run(URL).await.unwrap();

    let RunReport::Published { outcomes, .. } = report else {
        panic!("expected a published report");
    };
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.as_deref().unwrap().contains("seventy"));
    assert_eq!(broker.publish_count(), 1);
}

#[tokio::test]
async fn fetch_is_performed_exactly_once() {
    let fetcher = MockPageFetcher::new().with_document(URL, lake_page("915.2′", "71°F"));
    let mut pipeline = pipeline_over(fetcher.clone(), vec![]);

    pipeline.run(URL).await.unwrap();
    assert_eq!(fetcher.fetch_calls(), vec![URL.to_string()]);
}
