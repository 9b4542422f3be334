//! Outbound email delivery side-channel.
//!
//! Delivery is always best-effort relative to the message ledger: the
//! caller persists the outcome but a transport failure never unwinds
//! the write that triggered it, so [`Mailer::deliver`] reports failure
//! through [`DeliveryOutcome`] instead of an error.
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::core::AppConfig;

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
    contact_address: String,
}

/// An email handed to the provider. The reply-to points at the human
/// sender rather than the system address so replies reach the right
/// person.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub from_name: String,
    pub reply_to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub provider_id: Option<String>,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            // A provider that hangs is treated the same as one that
            // errors: the send has already been saved
            .timeout(Duration::from_secs(config.mail_timeout_secs))
            .build()
            .expect("Failed to build mail HTTP client");

        Self {
            client,
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from_address: config.mail_from_address.clone(),
            contact_address: config.mail_contact_address.clone(),
        }
    }

    pub async fn deliver(&self, email: &OutboundEmail) -> DeliveryOutcome {
        let Some(api_key) = &self.api_key else {
            tracing::warn!(
                "Mail provider is not configured, skipping delivery to {}",
                email.to
            );
            return DeliveryOutcome::default();
        };

        let payload = json!({
            "from": format!("{} <{}>", email.from_name, self.from_address),
            "to": [email.to],
            "reply_to": email.reply_to,
            "subject": email.subject,
            "html": email.html_body,
            "text": email.text_body,
            "headers": {
                "List-Unsubscribe": format!("<mailto:{}>", self.contact_address),
                // Stable per-send reference so providers do not collapse
                // unrelated sends into one thread or flag them as bulk
                "X-Entity-Ref-ID": email.sent_at.timestamp_millis().to_string(),
            },
        });

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let provider_id = resp
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| body["id"].as_str().map(|id| id.to_string()));
                DeliveryOutcome {
                    success: true,
                    provider_id,
                }
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::error!("Mail provider rejected delivery ({}): {}", status, body);
                DeliveryOutcome::default()
            }
            Err(err) => {
                tracing::error!("Mail delivery to {} failed: {}", email.to, err);
                DeliveryOutcome::default()
            }
        }
    }
}
