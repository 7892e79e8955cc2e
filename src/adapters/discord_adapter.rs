//! Discord webhook alert adapter.
//!
//! Posts signal notifications as Discord embeds. A successful delivery is
//! HTTP 204 from the webhook endpoint.

use crate::domain::error::CrosswatchError;
use crate::ports::alert_port::{AlertPort, SignalAlert};
use crate::domain::signal::Signal;
use serde_json::json;
use std::time::Duration;

const COLOR_GREEN: u32 = 3_066_993;
const COLOR_RED: u32 = 15_158_332;

pub struct DiscordAdapter {
    webhook_url: String,
    client: reqwest::blocking::Client,
}

impl DiscordAdapter {
    /// Placeholder URLs from an unedited config template are rejected here
    /// rather than producing a failed delivery every cycle.
    pub fn new(webhook_url: &str) -> Result<Self, CrosswatchError> {
        if webhook_url.is_empty() || webhook_url.contains("YOUR_WEBHOOK") {
            return Err(CrosswatchError::ConfigInvalid {
                section: "alert".to_string(),
                key: "discord_webhook_url".to_string(),
                reason: "webhook URL is not configured".to_string(),
            });
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Ok(Self {
            webhook_url: webhook_url.to_string(),
            client,
        })
    }

    fn payload(alert: &SignalAlert) -> serde_json::Value {
        let (color, title) = match alert.signal {
            Signal::Buy => (COLOR_GREEN, "BUY SIGNAL DETECTED"),
            Signal::Sell => (COLOR_RED, "SELL SIGNAL DETECTED"),
        };

        let mut fields = vec![
            json!({
                "name": "Signal Type",
                "value": alert.signal.to_string(),
                "inline": true
            }),
            json!({
                "name": "Current Price",
                "value": format!("${:.2}", alert.price),
                "inline": true
            }),
        ];

        if let Some(snapshot) = &alert.snapshot {
            fields.push(json!({
                "name": "Short MA",
                "value": format!("${:.2}", snapshot.short_ma),
                "inline": true
            }));
            fields.push(json!({
                "name": "Long MA",
                "value": format!("${:.2}", snapshot.long_ma),
                "inline": true
            }));
        }

        json!({
            "embeds": [{
                "title": title,
                "description": format!("**{}** trading signal detected", alert.symbol),
                "color": color,
                "fields": fields,
                "footer": {
                    "text": format!(
                        "crosswatch • {}",
                        alert.at.format("%Y-%m-%d %H:%M:%S")
                    )
                }
            }]
        })
    }
}

impl AlertPort for DiscordAdapter {
    fn send(&self, alert: &SignalAlert) -> Result<(), CrosswatchError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::payload(alert))
            .send()
            .map_err(|e| CrosswatchError::AlertDelivery {
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(CrosswatchError::AlertDelivery {
                reason: format!("webhook returned HTTP {}", response.status()),
            })
        }
    }
}
