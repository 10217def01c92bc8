//! Minimal InfluxDB write client.
//!
//! Speaks the InfluxDB HTTP write API directly: points are serialized to
//! line protocol and POSTed to `/write`. Covers exactly what a telemetry
//! publisher needs: no query support, no admin surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use influx_client::{DataPoint, InfluxClient};
//!
//! let client = InfluxClient::new("http://localhost:8086", None)?;
//! let point = DataPoint::new("laketemperature")
//!     .tag("unit", "ºF")
//!     .field("valueNum", 71.0);
//! client.write_point("lakeinfo", &point).await?;
//! ```

pub mod error;
pub mod point;

pub use error::{InfluxError, Result};
pub use point::{DataPoint, FieldValue};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// Error body the server returns on a rejected write.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Client for the InfluxDB `/write` endpoint.
pub struct InfluxClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl InfluxClient {
    /// Create a client for the given server base URL (e.g.
    /// `http://localhost:8086`). `token` is sent as `Authorization: Token …`
    /// when present; the 1.x compatibility API accepts `user:pass` here.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Write a single point to the given database.
    pub async fn write_point(&self, database: &str, point: &DataPoint) -> Result<()> {
        self.write_points(database, std::slice::from_ref(point)).await
    }

    /// Write a batch of points to the given database.
    pub async fn write_points(&self, database: &str, points: &[DataPoint]) -> Result<()> {
        let body = points
            .iter()
            .map(DataPoint::to_line_protocol)
            .collect::<Result<Vec<_>>>()?
            .join("\n");

        let url = format!("{}/write", self.base_url);
        debug!(url = %url, database = %database, points = points.len(), "writing points");

        let mut request = self
            .client
            .post(&url)
            .query(&[("db", database), ("precision", "ns")])
            .body(body);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                Err(_) => body,
            };
            return Err(InfluxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// The configured server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
