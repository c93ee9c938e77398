use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
    pub offer_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
    #[validate(length(max = 1000))]
    pub reject_reason: Option<String>,
    /// Version the caller last read; defaults to the current one.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct NotesPayload {
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct WithdrawPayload {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// An application together with the values clients render from its status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub swipe_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub reject_reason: Option<String>,
    pub notes: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub step_index: i8,
    pub can_withdraw: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            step_index: app.status.step_index(),
            can_withdraw: app.status.can_withdraw(),
            id: app.id,
            candidate_id: app.candidate_id,
            offer_id: app.offer_id,
            swipe_id: app.swipe_id,
            status: app.status,
            applied_at: app.applied_at,
            reject_reason: app.reject_reason,
            notes: app.notes,
            conversation_id: app.conversation_id,
            withdrawn_at: app.withdrawn_at,
            version: app.version,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}
