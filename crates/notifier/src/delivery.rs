//! Discord webhook delivery.
//!
//! One POST per notification, no retries. Discord answers `204 No Content`
//! (or `200 OK` with `?wait=true`); everything else is a failure.

use std::time::Duration;

use serde::Serialize;

use herald_common::error::HeraldResult;
use herald_common::types::{DeliveryResult, EmbedField, NotificationPayload};

use crate::transport::Transport;

/// Timeout for the webhook POST.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Status codes Discord uses for an accepted webhook execution.
const ACCEPTED_STATUS: &[u16] = &[200, 204];

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    embeds: [Embed<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    fields: &'a [EmbedField],
    timestamp: String,
}

/// Serialize a payload into Discord's webhook execution body.
pub fn to_webhook_json(payload: &NotificationPayload) -> HeraldResult<serde_json::Value> {
    let message = WebhookMessage {
        embeds: [Embed {
            title: &payload.title,
            description: &payload.description,
            color: payload.color,
            fields: &payload.fields,
            timestamp: payload.timestamp.to_rfc3339(),
        }],
        username: payload.username.as_deref(),
        avatar_url: payload.avatar_url.as_deref(),
    };
    Ok(serde_json::to_value(message)?)
}

/// Sends notification payloads to a single webhook.
pub struct DeliveryClient {
    transport: Box<dyn Transport>,
    webhook_url: String,
}

impl DeliveryClient {
    pub fn new(transport: Box<dyn Transport>, webhook_url: impl Into<String>) -> Self {
        Self {
            transport,
            webhook_url: webhook_url.into(),
        }
    }

    /// POST the payload once and report the outcome. Never returns an error.
    pub async fn send(&self, payload: &NotificationPayload) -> DeliveryResult {
        let body = match to_webhook_json(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize webhook message");
                return DeliveryResult::failed(e.to_string());
            }
        };

        match self.transport.post_json(&self.webhook_url, &body).await {
            Ok(response) if ACCEPTED_STATUS.contains(&response.status) => {
                tracing::debug!(status = response.status, "Webhook accepted message");
                DeliveryResult::delivered()
            }
            Ok(response) => {
                tracing::warn!(status = response.status, "Webhook rejected message");
                DeliveryResult::failed(format!("HTTP {}: {}", response.status, response.body))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Webhook request failed");
                DeliveryResult::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use herald_common::error::HeraldError;

    use crate::transport::TransportResponse;

    enum Canned {
        Status(u16, &'static str),
        TimedOut,
    }

    struct CannedTransport(Canned);

    #[async_trait]
    impl Transport for CannedTransport {
        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> HeraldResult<TransportResponse> {
            match &self.0 {
                Canned::Status(status, body) => Ok(TransportResponse {
                    status: *status,
                    body: body.to_string(),
                }),
                Canned::TimedOut => Err(HeraldError::Transport(
                    "request timed out after 10s".to_string(),
                )),
            }
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl Transport for &'static RecordingTransport {
        async fn post_json(
            &self,
            _url: &str,
            body: &serde_json::Value,
        ) -> HeraldResult<TransportResponse> {
            self.bodies.lock().unwrap().push(body.clone());
            Ok(TransportResponse {
                status: 204,
                body: String::new(),
            })
        }
    }

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "🟣 Dexter".to_string(),
            description: "**Task**: Deploy frontend\n**Status**: ✅".to_string(),
            color: 0x800080,
            fields: vec![EmbedField {
                name: "Details".to_string(),
                value: "Deployment complete!".to_string(),
                inline: false,
            }],
            username: None,
            avatar_url: None,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        }
    }

    fn client(canned: Canned) -> DeliveryClient {
        DeliveryClient::new(
            Box::new(CannedTransport(canned)),
            "https://discord.test/hook",
        )
    }

    #[test]
    fn test_wire_format() {
        let json = to_webhook_json(&payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "embeds": [{
                    "title": "🟣 Dexter",
                    "description": "**Task**: Deploy frontend\n**Status**: ✅",
                    "color": 8388736,
                    "fields": [{"name": "Details", "value": "Deployment complete!", "inline": false}],
                    "timestamp": "2026-10-18T12:00:00+00:00"
                }]
            })
        );
    }

    #[test]
    fn test_wire_format_with_identity_override() {
        let mut payload = payload();
        payload.username = Some("🟣 Dexter".to_string());
        payload.avatar_url = Some("https://img.test/dexter.png".to_string());
        let json = to_webhook_json(&payload).unwrap();
        assert_eq!(json["username"], "🟣 Dexter");
        assert_eq!(json["avatar_url"], "https://img.test/dexter.png");
    }

    #[tokio::test]
    async fn test_send_204_is_success() {
        let result = client(Canned::Status(204, "")).send(&payload()).await;
        assert!(result.success);
        assert!(result.detail.is_none());
    }

    #[tokio::test]
    async fn test_send_200_is_success() {
        assert!(client(Canned::Status(200, "{}")).send(&payload()).await.success);
    }

    #[tokio::test]
    async fn test_send_404_is_failure_with_detail() {
        let result = client(Canned::Status(404, "{\"message\": \"Unknown Webhook\"}"))
            .send(&payload())
            .await;
        assert!(!result.success);
        let detail = result.detail.unwrap();
        assert!(detail.contains("404"));
        assert!(detail.contains("Unknown Webhook"));
    }

    #[tokio::test]
    async fn test_send_timeout_is_failure() {
        let result = client(Canned::TimedOut).send(&payload()).await;
        assert!(!result.success);
        assert!(result.detail.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_send_posts_serialized_message() {
        let transport: &'static RecordingTransport = Box::leak(Box::default());
        let client = DeliveryClient::new(Box::new(transport), "https://discord.test/hook");

        assert!(client.send(&payload()).await.success);

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0], to_webhook_json(&payload()).unwrap());
        assert!(bodies[0]["embeds"].is_array());
    }
}
