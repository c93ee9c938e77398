use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Conversation {
    pub id: Uuid,
    pub application_id: Option<Uuid>,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.candidate_id == user_id || self.recruiter_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub application_id: Option<Uuid>,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
