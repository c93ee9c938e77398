use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::interview::InterviewStatus;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInterviewPayload {
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: i32,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_url: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInterviewPayload {
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_url: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub status: Option<InterviewStatus>,
}
