//! InfluxDB time-series sink.
//!
//! Writes one tagged point per run: the original text in `value`, the parsed
//! number in `valueNum`, with a `unit` tag keyed off the field name. A value
//! that fails to parse is a reported outcome for this sink only.

use async_trait::async_trait;
use chrono::Utc;
use influx_client::{DataPoint, InfluxClient};
use tracing::{info, warn};

use crate::config::InfluxSettings;
use crate::error::{PublishError, PublishResult};
use crate::sinks::ReadingSink;
use crate::types::{AggregatedReading, PublishOutcome};

pub struct TimeSeriesSink {
    settings: InfluxSettings,
}

/// Settings with the mandatory keys proven present.
struct ValidatedInflux {
    url: String,
    prefix: String,
    database: String,
    token: Option<String>,
}

impl TimeSeriesSink {
    pub fn new(settings: InfluxSettings) -> Self {
        Self { settings }
    }

    fn validated(&self) -> PublishResult<ValidatedInflux> {
        let server = self
            .settings
            .server
            .clone()
            .ok_or_else(|| PublishError::Config("no INFLUXDB_SERVER specified".into()))?;
        let prefix = self
            .settings
            .prefix
            .clone()
            .ok_or_else(|| PublishError::Config("no INFLUXDB_PREFIX specified".into()))?;

        let scheme = if self.settings.use_tls { "https" } else { "http" };
        let token = match (&self.settings.username, &self.settings.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        };

        Ok(ValidatedInflux {
            url: format!("{}://{}:{}", scheme, server, self.settings.port),
            prefix,
            database: self.settings.database.clone(),
            token,
        })
    }

    async fn publish_inner(&self, reading: &AggregatedReading) -> PublishResult<()> {
        let cfg = self.validated()?;

        let value = reading.temperature.as_str();
        let value_num: f64 = value.parse().map_err(|e: std::num::ParseFloatError| {
            PublishError::Parse {
                value: value.to_string(),
                reason: e.to_string(),
            }
        })?;

        let client = InfluxClient::new(&cfg.url, cfg.token)
            .map_err(|e| PublishError::Connect(e.to_string()))?;

        let point = point_for(&cfg.prefix, "temperature", value, value_num);
        info!(url = %cfg.url, database = %cfg.database, "writing point");
        client
            .write_point(&cfg.database, &point)
            .await
            .map_err(|e| PublishError::Write(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ReadingSink for TimeSeriesSink {
    async fn publish(&self, reading: &AggregatedReading) -> PublishOutcome {
        match self.publish_inner(reading).await {
            Ok(()) => {
                info!("wrote temperature to InfluxDB");
                PublishOutcome::success(self.name())
            }
            Err(e) => {
                warn!(error = %e, "InfluxDB publish failed");
                PublishOutcome::failure(self.name(), e)
            }
        }
    }

    fn name(&self) -> &str {
        "influxdb"
    }
}

/// Build the tagged point for one field. The unit tag follows the field
/// name: level readings are feet, everything else degrees Fahrenheit.
fn point_for(prefix: &str, name: &str, value: &str, value_num: f64) -> DataPoint {
    let unit = if name == "level" { "ft" } else { "ºF" };
    DataPoint::new(format!("{}{}", prefix, name))
        .tag("unit", unit)
        .field("value", value)
        .field("valueNum", value_num)
        .timestamp(Utc::now())
}
