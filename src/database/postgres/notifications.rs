use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::{parse_column, PgStore};
use crate::database::repository::NotificationRepository;
use crate::error::{Error, Result};
use crate::models::notification::{Notification, NotificationKind};

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, kind, payload, status, attempts, last_error, next_retry_at, created_at, updated_at";

#[derive(FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: Uuid,
    kind: String,
    payload: JsonValue,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    next_retry_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            recipient_id: row.recipient_id,
            kind: parse_column(&row.kind)?,
            payload: row.payload,
            status: parse_column(&row.status)?,
            attempts: row.attempts,
            last_error: row.last_error,
            next_retry_at: row.next_retry_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn enqueue(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        payload: JsonValue,
    ) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications (recipient_id, kind, payload, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(recipient_id)
        .bind(kind.as_str())
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            UPDATE notifications
            SET next_retry_at = $2, updated_at = NOW()
            WHERE id = (
                SELECT id
                FROM notifications
                WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= $1)
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(lease_until)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Notification::try_from).transpose()
    }

    async fn mark_sent(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'sent', attempts = attempts + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str, retry_at: Option<DateTime<Utc>>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET
                status = CASE WHEN $3::timestamptz IS NULL THEN 'failed' ELSE 'pending' END,
                attempts = attempts + 1,
                last_error = $2,
                next_retry_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(retry_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
