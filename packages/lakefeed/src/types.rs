//! Core data types flowing through the pipeline.

use std::fmt;

/// The two readings the source page exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Level,
    Temperature,
}

impl MeasurementKind {
    /// Every kind a run is expected to gather.
    pub const ALL: [MeasurementKind; 2] = [MeasurementKind::Level, MeasurementKind::Temperature];

    /// Field name used in topics and measurement names.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Level => "level",
            MeasurementKind::Temperature => "temperature",
        }
    }

    /// Unit suffix the source page appends to this reading's text.
    pub fn unit_suffix(&self) -> &'static str {
        match self {
            MeasurementKind::Level => "′",
            MeasurementKind::Temperature => "°F",
        }
    }

    /// Unit tag attached to published points.
    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::Level => "ft",
            MeasurementKind::Temperature => "ºF",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value lifted off the page, unit suffix already stripped. Immutable
/// once created; ownership moves through the measurement channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub raw: String,
}

impl Measurement {
    pub fn new(kind: MeasurementKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// What the collector managed to gather before its deadline. May be partial:
/// a kind whose watcher never fired stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedReadings {
    pub level: Option<String>,
    pub temperature: Option<String>,
}

impl CollectedReadings {
    /// Fold a measurement in. Returns false when its kind was already
    /// recorded; the first value wins.
    pub fn record(&mut self, measurement: Measurement) -> bool {
        let slot = match measurement.kind {
            MeasurementKind::Level => &mut self.level,
            MeasurementKind::Temperature => &mut self.temperature,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(measurement.raw);
        true
    }

    /// True once exactly one measurement of each kind has been folded in.
    pub fn is_complete(&self) -> bool {
        self.level.is_some() && self.temperature.is_some()
    }

    /// Build the publishable reading. Requires a non-empty temperature:
    /// a run without one is a no-data run, not a malformed publish. The
    /// level may be absent (markup change on the source page) and defaults
    /// to empty in the summary output.
    pub fn into_reading(self) -> Option<AggregatedReading> {
        match self.temperature {
            Some(temperature) if !temperature.is_empty() => Some(AggregatedReading {
                level: self.level.unwrap_or_default(),
                temperature,
            }),
            _ => None,
        }
    }
}

/// The aggregated result of one scrape. Both fields are raw, unparsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedReading {
    pub level: String,
    pub temperature: String,
}

/// Result of a single sink's publish attempt. Never retried or mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub sink: String,
    pub success: bool,
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn success(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(sink: impl Into<String>, error: impl ToString) -> Self {
        Self {
            sink: sink.into(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Terminal pipeline output.
#[derive(Debug, Clone)]
pub enum RunReport {
    /// The temperature never arrived: an explicit no-op termination.
    NoData,

    /// Publishing ran; outcomes are in sink registration order.
    Published {
        reading: AggregatedReading,
        outcomes: Vec<PublishOutcome>,
    },
}

impl RunReport {
    /// Operator-facing summary line(s).
    pub fn summary(&self) -> String {
        match self {
            RunReport::NoData => "no temperature data".to_string(),
            RunReport::Published { reading, .. } => format!(
                "Level: {} ft\nTemp: {} ºF",
                reading.level, reading.temperature
            ),
        }
    }
}
