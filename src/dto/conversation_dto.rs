use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OpenConversationPayload {
    pub application_id: Uuid,
}

/// Longest message body, counted after trimming.
pub const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessagePayload {
    #[validate(custom(function = "not_blank"))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadResponse {
    pub unread: i64,
}
