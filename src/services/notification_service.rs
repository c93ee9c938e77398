//! Notification outbox. Services enqueue rows in the request path; a
//! background worker drains them to the email relay webhook.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::database::repository::NotificationRepository;
use crate::error::{Error, Result};
use crate::models::notification::{Notification, NotificationKind, MAX_DELIVERY_ATTEMPTS};
use crate::utils::time::now;

const BASE_BACKOFF_SECS: i64 = 30;
const MAX_BACKOFF_SECS: i64 = 3600;
/// How long a claimed notification stays invisible to other workers.
pub const CLAIM_LEASE_SECS: i64 = 300;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// POSTs each notification to the relay, authenticated by a shared secret.
pub struct WebhookTransport {
    client: Client,
    url: String,
    secret: Option<String>,
}

impl WebhookTransport {
    pub fn new(url: String, secret: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(StdDuration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url,
            secret,
        })
    }
}

#[async_trait]
impl NotificationTransport for WebhookTransport {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let body = json!({
            "id": notification.id,
            "kind": notification.kind,
            "recipient_id": notification.recipient_id,
            "payload": notification.payload,
            "created_at": notification.created_at,
        });
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!("relay answered {status}: {text}")));
        }
        Ok(())
    }
}

/// Used when no relay is configured: the delivery is only logged.
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            notification_id = %notification.id,
            kind = %notification.kind,
            recipient_id = %notification.recipient_id,
            "No notification relay configured, delivery logged only"
        );
        Ok(())
    }
}

/// Delay before retry number `attempts + 1`: 30s doubling per attempt, capped
/// at one hour.
pub fn backoff_for(attempts: i32) -> Duration {
    let exponent = u32::try_from(attempts.max(1) - 1).unwrap_or(0).min(16);
    let secs = BASE_BACKOFF_SECS.saturating_mul(1_i64 << exponent);
    Duration::seconds(secs.min(MAX_BACKOFF_SECS))
}

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationService {
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self { repo, transport }
    }

    pub async fn enqueue(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        payload: JsonValue,
    ) -> Result<Notification> {
        let notification = self.repo.enqueue(recipient_id, kind, payload).await?;
        tracing::debug!(notification_id = %notification.id, kind = %kind, "Notification queued");
        Ok(notification)
    }

    /// Delivers at most one due notification. Returns `false` when the queue
    /// had nothing due, so the caller can back off.
    pub async fn run_once(&self) -> Result<bool> {
        let at = now();
        let lease_until = at + Duration::seconds(CLAIM_LEASE_SECS);
        let Some(notification) = self.repo.claim_due(at, lease_until).await? else {
            return Ok(false);
        };

        match self.transport.deliver(&notification).await {
            Ok(()) => {
                self.repo.mark_sent(notification.id).await?;
            }
            Err(e) => {
                let attempts = notification.attempts + 1;
                let retry_at =
                    (attempts < MAX_DELIVERY_ATTEMPTS).then(|| now() + backoff_for(attempts));
                tracing::warn!(
                    notification_id = %notification.id,
                    attempts,
                    giving_up = retry_at.is_none(),
                    error = %e,
                    "Notification delivery failed"
                );
                self.repo
                    .mark_failed(notification.id, &e.to_string(), retry_at)
                    .await?;
            }
        }
        Ok(true)
    }
}
