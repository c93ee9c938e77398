use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::UserRole;
use crate::AppState;

/// Access token payload, inserted into request extensions once verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins pass every role check.
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<()> {
        if self.is_admin() || allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "This action is not available to the '{}' role",
                self.role
            )))
        }
    }

    pub fn require_candidate(&self) -> Result<()> {
        self.require_role(&[UserRole::Candidate])
    }

    pub fn require_recruiter(&self) -> Result<()> {
        self.require_role(&[UserRole::Recruiter])
    }
}

fn bearer_token(req: &Request) -> Result<Option<&str>> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("Malformed Authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| Error::Unauthorized("Unsupported authorization scheme".to_string()))
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match bearer_token(&req) {
        Ok(Some(token)) => state.auth_service.verify_access_token(token),
        Ok(None) => Err(Error::Unauthorized("Missing bearer token".to_string())),
        Err(e) => Err(e),
    };
    match claims {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Attaches claims when a valid token is present and lets anonymous requests
/// through. A token that is present but invalid is still refused.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let verified = match bearer_token(&req) {
        Ok(Some(token)) => Some(state.auth_service.verify_access_token(token)),
        Ok(None) => None,
        Err(e) => Some(Err(e)),
    };
    match verified {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(claims);
        }
        Some(Err(e)) => return e.into_response(),
        None => {}
    }
    next.run(req).await
}
