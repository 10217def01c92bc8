//! Data points and line protocol serialization.

use chrono::{DateTime, Utc};

use crate::error::{InfluxError, Result};

/// A single field value. InfluxDB distinguishes string and float fields at
/// the protocol level, so the distinction is kept here rather than stringly
/// typing everything.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    String(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// A measurement point destined for a single line of line protocol.
///
/// # Example
///
/// ```rust
/// use influx_client::DataPoint;
/// use chrono::Utc;
///
/// let point = DataPoint::new("lake_temperature")
///     .tag("unit", "ºF")
///     .field("value", "71")
///     .field("valueNum", 71.0)
///     .timestamp(Utc::now());
/// ```
#[derive(Debug, Clone)]
pub struct DataPoint {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<DateTime<Utc>>,
}

impl DataPoint {
    /// Create a point for the given measurement name.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Add a tag. Tags are indexed key/value metadata.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Add a field. Every point needs at least one.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set an explicit timestamp. Defaults to server-assigned time when unset.
    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Serialize to one line of InfluxDB line protocol (nanosecond precision).
    pub fn to_line_protocol(&self) -> Result<String> {
        if self.measurement.is_empty() {
            return Err(InfluxError::InvalidPoint(
                "measurement name is empty".into(),
            ));
        }
        if self.fields.is_empty() {
            return Err(InfluxError::InvalidPoint(format!(
                "point {} has no fields",
                self.measurement
            )));
        }

        let mut line = escape_measurement(&self.measurement);

        // Tags sorted by key, as the server recommends for write performance.
        let mut tags = self.tags.clone();
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in &tags {
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&escape_tag(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_tag(key));
            line.push('=');
            match value {
                FieldValue::Float(f) => line.push_str(&f.to_string()),
                FieldValue::String(s) => {
                    line.push('"');
                    line.push_str(&s.replace('\\', "\\\\").replace('"', "\\\""));
                    line.push('"');
                }
            }
        }

        if let Some(ts) = self.timestamp {
            let nanos = ts
                .timestamp_nanos_opt()
                .ok_or_else(|| InfluxError::InvalidPoint("timestamp out of range".into()))?;
            line.push(' ');
            line.push_str(&nanos.to_string());
        }

        Ok(line)
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_basic_line() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let point = DataPoint::new("laketemperature")
            .tag("unit", "ºF")
            .field("value", "71")
            .field("valueNum", 71.0)
            .timestamp(ts);

        let line = point.to_line_protocol().unwrap();
        assert_eq!(
            line,
            "laketemperature,unit=ºF value=\"71\",valueNum=71 1700000000000000000"
        );
    }

    #[test]
    fn test_tags_sorted_by_key() {
        let point = DataPoint::new("m")
            .tag("zone", "a")
            .tag("unit", "ft")
            .field("value", 1.5);

        let line = point.to_line_protocol().unwrap();
        assert!(line.starts_with("m,unit=ft,zone=a "));
    }

    #[test]
    fn test_escaping() {
        let point = DataPoint::new("lake temp")
            .tag("site", "table rock, mo")
            .field("note", "said \"high\"");

        let line = point.to_line_protocol().unwrap();
        assert!(line.starts_with("lake\\ temp,site=table\\ rock\\,\\ mo "));
        assert!(line.contains("note=\"said \\\"high\\\"\""));
    }

    #[test]
    fn test_point_without_fields_is_invalid() {
        let point = DataPoint::new("m").tag("unit", "ft");
        assert!(matches!(
            point.to_line_protocol(),
            Err(InfluxError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_point_without_timestamp_omits_it() {
        let line = DataPoint::new("m").field("v", 2.0).to_line_protocol().unwrap();
        assert_eq!(line, "m v=2");
    }
}
