use std::sync::Arc;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::database::repository::AuditRepository;
use crate::error::Result;
use crate::models::audit_log::{AuditLog, NewAuditLog};

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub async fn log(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<JsonValue>,
    ) -> Result<AuditLog> {
        self.repo
            .record(NewAuditLog {
                user_id,
                action: action.to_string(),
                entity_type: entity_type.to_string(),
                entity_id,
                changes,
            })
            .await
    }

    pub async fn history(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditLog>> {
        self.repo.for_entity(entity_type, entity_id).await
    }
}
