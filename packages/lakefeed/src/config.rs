//! Settings for the source page and the two sinks.
//!
//! Settings structs are deliberately unvalidated: each sink checks its own
//! mandatory keys at publish time, so a missing broker setting becomes that
//! sink's configuration-error outcome without touching the other sink.
//! `from_env()` constructors read the same variable names the deployment
//! environment uses; tests build the structs directly.

use std::env;
use std::time::Duration;

use crate::types::MeasurementKind;

/// The lake conditions page scraped by default.
pub const DEFAULT_SOURCE_URL: &str =
    "https://anglerspy.com/table-rock-lake-water-temperature-ipm/";

/// CSS selectors for the two page elements carrying the readings.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub level: String,
    pub temperature: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            level: "#wrsn-temp-weather-1".to_string(),
            temperature: "#wrsn-temp-1".to_string(),
        }
    }
}

impl SelectorSet {
    pub fn for_kind(&self, kind: MeasurementKind) -> &str {
        match kind {
            MeasurementKind::Level => &self.level,
            MeasurementKind::Temperature => &self.temperature,
        }
    }
}

/// Pipeline-wide settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub source_url: String,
    pub selectors: SelectorSet,
    /// Bound on how long a run waits for both readings.
    pub collect_deadline: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            selectors: SelectorSet::default(),
            collect_deadline: Duration::from_secs(10),
        }
    }
}

impl PipelineSettings {
    /// Load from the environment (`SOURCE_URL`), defaulting everything else.
    pub fn from_env() -> Self {
        Self {
            source_url: env_nonempty("SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            ..Self::default()
        }
    }
}

/// MQTT broker settings. `server` and `prefix` are mandatory; the sink
/// reports their absence as a configuration error.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub server: Option<String>,
    pub port: u16,
    pub prefix: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            server: None,
            port: 1883,
            prefix: None,
            username: None,
            password: None,
        }
    }
}

impl BrokerSettings {
    /// Load from `MQTT_SERVER`, `MQTT_PORT`, `MQTT_PREFIX`, `MQTT_USERNAME`,
    /// `MQTT_PASSWORD`.
    pub fn from_env() -> Self {
        Self {
            server: env_nonempty("MQTT_SERVER"),
            port: env_port("MQTT_PORT", 1883),
            prefix: env_nonempty("MQTT_PREFIX"),
            username: env_nonempty("MQTT_USERNAME"),
            password: env_nonempty("MQTT_PASSWORD"),
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// InfluxDB settings. `server` and `prefix` are mandatory; the database name
/// is genuinely configurable and defaults to `lakeinfo`.
#[derive(Debug, Clone)]
pub struct InfluxSettings {
    pub server: Option<String>,
    pub port: u16,
    pub prefix: Option<String>,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
}

impl Default for InfluxSettings {
    fn default() -> Self {
        Self {
            server: None,
            port: 8086,
            prefix: None,
            database: "lakeinfo".to_string(),
            username: None,
            password: None,
            use_tls: false,
        }
    }
}

impl InfluxSettings {
    /// Load from `INFLUXDB_SERVER`, `INFLUXDB_PORT`, `INFLUXDB_PREFIX`,
    /// `INFLUXDB_DATABASE`, `INFLUXDB_USERNAME`, `INFLUXDB_PASSWORD`,
    /// `INFLUXDB_USE_SSL` (`yes` enables https).
    pub fn from_env() -> Self {
        Self {
            server: env_nonempty("INFLUXDB_SERVER"),
            port: env_port("INFLUXDB_PORT", 8086),
            prefix: env_nonempty("INFLUXDB_PREFIX"),
            database: env_nonempty("INFLUXDB_DATABASE")
                .unwrap_or_else(|| "lakeinfo".to_string()),
            username: env_nonempty("INFLUXDB_USERNAME"),
            password: env_nonempty("INFLUXDB_PASSWORD"),
            use_tls: env_nonempty("INFLUXDB_USE_SSL").as_deref() == Some("yes"),
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_port(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
