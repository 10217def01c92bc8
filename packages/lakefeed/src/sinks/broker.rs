//! MQTT broker sink.
//!
//! Each run opens a fresh session under a generated client id, publishes the
//! temperature at QoS 1, waits for the broker's acknowledgment, and
//! disconnects with a bounded grace period. A connect failure is a reported
//! outcome like any other; the broker being unreachable must not take the
//! other sink down with it.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::BrokerSettings;
use crate::error::{PublishError, PublishResult};
use crate::sinks::ReadingSink;
use crate::types::{AggregatedReading, PublishOutcome};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ACK_TIMEOUT: Duration = Duration::from_secs(10);
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Alphabet the ephemeral client id suffix draws from. Collisions are
/// tolerated: the session lives for one publish.
const CLIENT_ID_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZÅÄÖabcdefghijklmnopqrstuvwxyzåäö0123456789";
const CLIENT_ID_SUFFIX_LEN: usize = 8;

pub struct BrokerSink {
    settings: BrokerSettings,
}

/// Settings with the mandatory keys proven present.
struct ValidatedBroker {
    server: String,
    port: u16,
    prefix: String,
    username: Option<String>,
    password: Option<String>,
}

impl BrokerSink {
    pub fn new(settings: BrokerSettings) -> Self {
        Self { settings }
    }

    fn validated(&self) -> PublishResult<ValidatedBroker> {
        let server = self
            .settings
            .server
            .clone()
            .ok_or_else(|| PublishError::Config("no MQTT_SERVER specified".into()))?;
        let prefix = self
            .settings
            .prefix
            .clone()
            .ok_or_else(|| PublishError::Config("no MQTT_PREFIX specified".into()))?;

        Ok(ValidatedBroker {
            server,
            port: self.settings.port,
            prefix,
            username: self.settings.username.clone(),
            password: self.settings.password.clone(),
        })
    }

    async fn publish_inner(&self, reading: &AggregatedReading) -> PublishResult<()> {
        let cfg = self.validated()?;

        let mut rng = fastrand::Rng::new();
        let client_id = random_client_id(&mut rng);
        info!(
            server = %cfg.server,
            port = cfg.port,
            client_id = %client_id,
            "connecting to broker"
        );

        let mut options = MqttOptions::new(client_id, cfg.server.clone(), cfg.port);
        options.set_keep_alive(Duration::from_secs(5));
        if let Some(username) = &cfg.username {
            options.set_credentials(username, cfg.password.as_deref().unwrap_or(""));
        }

        let (client, mut eventloop) = AsyncClient::new(options, 4);

        wait_for_packet(&mut eventloop, CONNECT_TIMEOUT, |p| {
            matches!(p, Packet::ConnAck(_))
        })
        .await
        .map_err(PublishError::Connect)?;

        let topic = topic_for(&cfg.prefix, "temperature");
        client
            .publish(topic.as_str(), QoS::AtLeastOnce, false, reading.temperature.clone())
            .await
            .map_err(|e| PublishError::Write(e.to_string()))?;

        wait_for_packet(&mut eventloop, ACK_TIMEOUT, |p| {
            matches!(p, Packet::PubAck(_))
        })
        .await
        .map_err(PublishError::Write)?;
        debug!(topic = %topic, "publish acknowledged");

        // Bounded-grace teardown; a slow broker must not stall the run.
        let _ = client.disconnect().await;
        let _ = timeout(DISCONNECT_GRACE, drain(&mut eventloop)).await;

        Ok(())
    }
}

#[async_trait]
impl ReadingSink for BrokerSink {
    async fn publish(&self, reading: &AggregatedReading) -> PublishOutcome {
        match self.publish_inner(reading).await {
            Ok(()) => {
                info!("wrote temperature to MQTT");
                PublishOutcome::success(self.name())
            }
            Err(e) => {
                warn!(error = %e, "MQTT publish failed");
                PublishOutcome::failure(self.name(), e)
            }
        }
    }

    fn name(&self) -> &str {
        "mqtt"
    }
}

/// Topic for one field under the configured prefix.
fn topic_for(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix, name)
}

/// Generate an ephemeral client id from a locally scoped RNG.
fn random_client_id(rng: &mut fastrand::Rng) -> String {
    let alphabet: Vec<char> = CLIENT_ID_ALPHABET.chars().collect();
    let suffix: String = (0..CLIENT_ID_SUFFIX_LEN)
        .map(|_| alphabet[rng.usize(..alphabet.len())])
        .collect();
    format!("lake-svc-{}", suffix)
}

/// Drive the event loop until `want` matches an incoming packet. Bounded by
/// `limit`; any connection error ends the wait.
async fn wait_for_packet(
    eventloop: &mut EventLoop,
    limit: Duration,
    want: impl Fn(&Packet) -> bool,
) -> Result<(), String> {
    let drive = async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(packet)) if want(&packet) => return Ok(()),
                Ok(_) => continue,
                Err(e) => return Err(e.to_string()),
            }
        }
    };

    match timeout(limit, drive).await {
        Ok(result) => result,
        Err(_) => Err(format!("timed out after {:?}", limit)),
    }
}

/// Poll until the connection winds down or errors.
async fn drain(eventloop: &mut EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) | Err(_) => return,
            Ok(_) => continue,
        }
    }
}
