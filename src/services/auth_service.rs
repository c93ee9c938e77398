use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::Config;
use crate::database::repository::{RefreshTokenRepository, UserRepository};
use crate::dto::auth_dto::{
    AuthResponse, LoginPayload, RegisterPayload, UpdateProfilePayload, UserResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{NewUser, ProfileUpdate, User, UserRole};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::time::now;
use crate::utils::token::{digest_matches, generate_refresh_token, hash_token};
use crate::utils::validation::normalize_skills;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        config: &Config,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt_secret: config.jwt_secret.clone(),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days),
        }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse> {
        if payload.role == UserRole::Admin {
            return Err(Error::BadRequest(
                "Only candidate and recruiter accounts can self-register".to_string(),
            ));
        }

        let email = payload.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash: hash_password(&payload.password)?,
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                role: payload.role,
                company: payload.company,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue_tokens(user).await
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let email = payload.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|user| user.is_active && verify_password(&payload.password, &user.password_hash))
            .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        self.issue_tokens(user).await
    }

    /// Rotates a refresh token: the presented one is revoked and a new pair
    /// is issued. Reusing a rotated token fails.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse> {
        let invalid = || Error::Unauthorized("Invalid or expired refresh token".to_string());

        let token_hash = hash_token(refresh_token);
        let stored = self
            .refresh_tokens
            .find_by_hash(&token_hash)
            .await?
            .filter(|stored| digest_matches(refresh_token, &stored.token_hash))
            .ok_or_else(invalid)?;

        if !stored.is_usable_at(now()) {
            return Err(invalid());
        }
        if !self.refresh_tokens.revoke(stored.id).await? {
            return Err(invalid());
        }

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(invalid)?;

        self.issue_tokens(user).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let token_hash = hash_token(refresh_token);
        if let Some(stored) = self.refresh_tokens.find_by_hash(&token_hash).await? {
            self.refresh_tokens.revoke(stored.id).await?;
        }
        Ok(())
    }

    pub async fn me(&self, claims: &Claims) -> Result<UserResponse> {
        let user = self.load_user(claims).await?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        claims: &Claims,
        payload: UpdateProfilePayload,
    ) -> Result<UserResponse> {
        let user = self
            .users
            .update_profile(
                claims.user_id(),
                ProfileUpdate {
                    first_name: payload.first_name.map(|v| v.trim().to_string()),
                    last_name: payload.last_name.map(|v| v.trim().to_string()),
                    headline: payload.headline,
                    skills: payload.skills.map(normalize_skills),
                    company: payload.company,
                },
            )
            .await?;
        Ok(user.into())
    }

    pub async fn load_user(&self, claims: &Claims) -> Result<User> {
        self.users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        let issued_at = now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: issued_at.timestamp() as usize,
            exp: (issued_at + self.access_ttl).timestamp() as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign access token: {e}")))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| Error::Unauthorized("Invalid or expired access token".to_string()))
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthResponse> {
        let access_token = self.issue_access_token(&user)?;
        let refresh_token = generate_refresh_token();
        self.refresh_tokens
            .store(user.id, &hash_token(&refresh_token), now() + self.refresh_ttl)
            .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
            user: user.into(),
        })
    }
}
