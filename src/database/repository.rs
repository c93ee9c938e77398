//! Storage ports used by the services.
//!
//! Every trait has a Postgres adapter (`database::postgres`) and an in-process
//! adapter (`database::memory`). Adapters report duplicates as
//! [`Error::Conflict`](crate::error::Error::Conflict) and missing rows as
//! [`Error::NotFound`](crate::error::Error::NotFound).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, Scope, StatusChange,
};
use crate::models::audit_log::{AuditLog, NewAuditLog};
use crate::models::availability::{AvailabilitySlot, NewSlot};
use crate::models::conversation::{Conversation, Message, NewConversation};
use crate::models::interview::{Interview, InterviewUpdate, NewInterview};
use crate::models::notification::{Notification, NotificationKind};
use crate::models::offer::{NewOffer, Offer, OfferFilter, OfferStatus, OfferUpdate};
use crate::models::refresh_token::RefreshToken;
use crate::models::swipe::{NewSwipe, SwipeAction, SwipeEvent};
use crate::models::user::{NewUser, ProfileUpdate, User};

/// Zero-based slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn store(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken>;
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;
    /// Returns `true` only for the call that actually revoked the token.
    async fn revoke(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn create(&self, offer: NewOffer) -> Result<Offer>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>>;
    async fn update(&self, id: Uuid, update: OfferUpdate) -> Result<Offer>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn list(&self, filter: &OfferFilter, page: Page) -> Result<(Vec<Offer>, i64)>;
    /// Published offers the user has not swiped on yet, newest first.
    async fn unswiped_published(&self, user_id: Uuid, limit: i64) -> Result<Vec<Offer>>;
    async fn count_by_status(&self, recruiter_id: Uuid) -> Result<Vec<(OfferStatus, i64)>>;
    /// Whether any candidate swiped the offer. Every application starts with
    /// a swipe, so this also covers offers with applications.
    async fn has_swipes(&self, offer_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SwipeRepository: Send + Sync {
    /// Persists the swipe and, when `open_application` is set, an application
    /// in status `new`, as one unit. A second swipe on the same
    /// `(user_id, offer_id)` fails with a conflict and writes nothing.
    async fn record(
        &self,
        swipe: NewSwipe,
        open_application: bool,
    ) -> Result<(SwipeEvent, Option<Application>)>;
    async fn find(&self, user_id: Uuid, offer_id: Uuid) -> Result<Option<SwipeEvent>>;
    async fn list_for_user(
        &self,
        user_id: Uuid,
        action: Option<SwipeAction>,
        page: Page,
    ) -> Result<(Vec<SwipeEvent>, i64)>;
    async fn count_by_action(&self, scope: Scope) -> Result<Vec<(SwipeAction, i64)>>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn list(&self, filter: &ApplicationFilter, page: Page) -> Result<(Vec<Application>, i64)>;
    /// Compare-and-set on `version`; a stale version is a conflict.
    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Application>;
    async fn update_notes(&self, id: Uuid, notes: Option<String>) -> Result<Application>;
    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> Result<Application>;
    async fn count_by_status(&self, scope: Scope) -> Result<Vec<(ApplicationStatus, i64)>>;
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn create(&self, interview: NewInterview) -> Result<Interview>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Interview>>;
    async fn update(&self, id: Uuid, update: InterviewUpdate) -> Result<Interview>;
    async fn count_upcoming(&self, recruiter_id: Uuid, after: DateTime<Utc>) -> Result<i64>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Creates the conversation, or returns the one already attached to the
    /// same application.
    async fn open(&self, conversation: NewConversation) -> Result<Conversation>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>>;
    async fn add_message(&self, conversation_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message>;
    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>>;
    /// Marks every message not sent by `reader_id` as read.
    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64>;
    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn list(&self, user_id: Uuid) -> Result<Vec<AvailabilitySlot>>;
    async fn replace(&self, user_id: Uuid, slots: Vec<NewSlot>) -> Result<Vec<AvailabilitySlot>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn enqueue(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        payload: JsonValue,
    ) -> Result<Notification>;
    /// Claims the oldest pending row whose retry time has passed by moving
    /// its retry time to `lease_until`. Other workers skip the row until the
    /// lease runs out, which also brings back rows of a crashed worker.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<Option<Notification>>;
    async fn mark_sent(&self, id: Uuid) -> Result<()>;
    /// Records a failed attempt. `retry_at = None` gives up on the row.
    async fn mark_failed(&self, id: Uuid, error: &str, retry_at: Option<DateTime<Utc>>) -> Result<()>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog>;
    async fn for_entity(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditLog>>;
}
