//! Test doubles for the pipeline seams.
//!
//! Useful for exercising the pipeline without a network: canned documents in
//! place of the real page, scripted sinks in place of the real brokers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::fetch::PageFetcher;
use crate::sinks::ReadingSink;
use crate::types::{AggregatedReading, PublishOutcome};

/// Build a source-page document carrying the default level/temperature
/// elements, unit suffixes included by the caller.
pub fn lake_page(level: &str, temperature: &str) -> String {
    format!(
        r#"<html><body>
        <span id="wrsn-temp-1">{temperature}</span>
        <span id="wrsn-temp-weather-1">{level}</span>
        </body></html>"#
    )
}

/// Canned-document page fetcher with call tracking.
#[derive(Default)]
pub struct MockPageFetcher {
    documents: Arc<RwLock<HashMap<String, String>>>,
    failure_status: Arc<RwLock<Option<u16>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_document(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(url.into(), html.into());
        self
    }

    /// Fail every fetch with the given HTTP status.
    pub fn with_failure(self, status: u16) -> Self {
        *self.failure_status.write().unwrap() = Some(status);
        self
    }

    /// URLs fetched so far.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

impl Clone for MockPageFetcher {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
            failure_status: Arc::clone(&self.failure_status),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(status) = *self.failure_status.read().unwrap() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        self.documents
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Scripted sink recording every reading it is handed.
pub struct RecordingSink {
    name: String,
    error: Option<String>,
    published: Arc<RwLock<Vec<AggregatedReading>>>,
}

impl RecordingSink {
    /// A sink whose every attempt succeeds.
    pub fn succeeding(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: None,
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A sink whose every attempt fails with `error`.
    pub fn failing(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: Some(error.into()),
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Readings handed to this sink, in order.
    pub fn published(&self) -> Vec<AggregatedReading> {
        self.published.read().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.read().unwrap().len()
    }
}

impl Clone for RecordingSink {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            error: self.error.clone(),
            published: Arc::clone(&self.published),
        }
    }
}

#[async_trait]
impl ReadingSink for RecordingSink {
    async fn publish(&self, reading: &AggregatedReading) -> PublishOutcome {
        self.published.write().unwrap().push(reading.clone());

        match &self.error {
            None => PublishOutcome::success(self.name()),
            Some(error) => PublishOutcome::failure(self.name(), error),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
