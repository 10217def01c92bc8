//! Page extraction: one watcher per measurement kind, firing into the
//! measurement channel.
//!
//! The extractor performs exactly one fetch, then spawns a watcher task per
//! kind. Each watcher owns its CSS selector and sends at most one
//! [`Measurement`]; the two fire in whatever order the scheduler picks.
//! Every sender handle lives in a watcher task, so the channel closes once
//! both watchers finish. A consumer can tell "element absent" (channel
//! exhausted early) apart from "fetch failed" (error return, zero events).

use scraper::{Html, Selector};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SelectorSet;
use crate::error::FetchResult;
use crate::fetch::PageFetcher;
use crate::types::{Measurement, MeasurementKind};

/// Measurement channel capacity: one slot per expected kind.
pub const MEASUREMENT_CHANNEL_CAPACITY: usize = MeasurementKind::ALL.len();

/// Drives the page-fetch collaborator and emits measurements as they are
/// found. Not restartable within one `extract` call.
pub struct PageExtractor<F: PageFetcher> {
    fetcher: F,
    selectors: SelectorSet,
}

impl<F: PageFetcher> PageExtractor<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            selectors: SelectorSet::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    /// Fetch the page once and spawn the watchers.
    ///
    /// Returns as soon as the fetch completes; measurements arrive through
    /// `tx` on the watchers' own schedule. On fetch failure nothing is ever
    /// sent.
    pub async fn extract(&self, url: &str, tx: mpsc::Sender<Measurement>) -> FetchResult<()> {
        info!(url = %url, fetcher = self.fetcher.name(), "visiting source page");
        let document = self.fetcher.fetch(url).await?;

        for kind in MeasurementKind::ALL {
            let selector = self.selectors.for_kind(kind).to_string();
            let document = document.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                match watch(kind, &selector, &document) {
                    Some(measurement) => {
                        debug!(kind = %kind, raw = %measurement.raw, "element matched");
                        if tx.send(measurement).await.is_err() {
                            debug!(kind = %kind, "collector gone, measurement dropped");
                        }
                    }
                    // Absent element: silent non-event, not an error.
                    None => debug!(kind = %kind, selector = %selector, "element not found"),
                }
            });
        }

        Ok(())
    }
}

/// One watcher: select this kind's element and lift its text.
///
/// `Html` is parsed inside the watcher and never held across an await; it is
/// not `Send`.
fn watch(kind: MeasurementKind, selector: &str, document: &str) -> Option<Measurement> {
    let selector = match Selector::parse(selector) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(kind = %kind, error = ?e, "invalid selector");
            return None;
        }
    };

    let parsed = Html::parse_document(document);
    let element = parsed.select(&selector).next()?;
    let text: String = element.text().collect();

    Some(Measurement::new(kind, strip_unit_suffix(kind, &text)))
}

/// Drop the page's unit suffix (`°F` / `′`) and surrounding whitespace.
fn strip_unit_suffix(kind: MeasurementKind, text: &str) -> String {
    text.trim()
        .trim_end_matches(kind.unit_suffix())
        .trim_end()
        .to_string()
}
