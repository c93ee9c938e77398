use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::repository::AuditRepository;
use crate::error::Result;
use crate::models::audit_log::{AuditLog, NewAuditLog};

#[async_trait]
impl AuditRepository for PgStore {
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let row = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (user_id, action, entity_type, entity_id, changes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, action, entity_type, entity_id, changes, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.changes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn for_entity(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, user_id, action, entity_type, entity_id, changes, created_at
            FROM audit_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
