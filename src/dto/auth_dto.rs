use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{User, UserRole};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: String,
    pub role: UserRole,
    #[validate(length(max = 200))]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshPayload {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[validate(length(max = 50))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub headline: Option<String>,
    pub skills: Vec<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            headline: user.headline,
            skills: user.skills,
            company: user.company,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}
