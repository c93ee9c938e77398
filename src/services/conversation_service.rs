use std::sync::Arc;

use uuid::Uuid;

use crate::database::repository::ConversationRepository;
use crate::dto::conversation_dto::MAX_MESSAGE_CHARS;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::ApplicationStatus;
use crate::models::conversation::{Conversation, Message, NewConversation};
use crate::models::user::UserRole;
use crate::services::application_service::ApplicationService;

#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    applications: ApplicationService,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        applications: ApplicationService,
    ) -> Self {
        Self {
            conversations,
            applications,
        }
    }

    /// Returns the application's conversation, creating and linking it on
    /// first use. A recruiter opening it counts as contacting the candidate.
    pub async fn open(&self, claims: &Claims, application_id: Uuid) -> Result<Conversation> {
        let (application, offer) = self
            .applications
            .load_for_participant(claims, application_id)
            .await?;

        let conversation = self
            .conversations
            .open(NewConversation {
                application_id: Some(application.id),
                candidate_id: application.candidate_id,
                recruiter_id: offer.recruiter_id,
            })
            .await?;

        let application = if application.conversation_id == Some(conversation.id) {
            application
        } else {
            self.applications
                .link_conversation(application.id, conversation.id)
                .await?
        };

        let by_recruiter = claims.role != UserRole::Candidate;
        if by_recruiter
            && matches!(
                application.status,
                ApplicationStatus::New | ApplicationStatus::Viewed
            )
        {
            self.applications
                .advance_to(claims.user_id(), &application, ApplicationStatus::Contacted)
                .await?;
        }
        Ok(conversation)
    }

    pub async fn list(&self, claims: &Claims) -> Result<Vec<Conversation>> {
        self.conversations.list_for_user(claims.user_id()).await
    }

    /// Messages in sending order. Reading them marks the other party's
    /// messages as read.
    pub async fn messages(&self, claims: &Claims, id: Uuid) -> Result<Vec<Message>> {
        self.find_joined(claims, id).await?;
        let marked = self.conversations.mark_read(id, claims.user_id()).await?;
        if marked > 0 {
            tracing::debug!(conversation_id = %id, marked, "Messages marked read");
        }
        self.conversations.messages(id).await
    }

    pub async fn send(&self, claims: &Claims, id: Uuid, body: &str) -> Result<Message> {
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::BadRequest("Message body cannot be empty".to_string()));
        }
        if body.chars().count() > MAX_MESSAGE_CHARS {
            return Err(Error::BadRequest(format!(
                "Message body cannot exceed {MAX_MESSAGE_CHARS} characters"
            )));
        }
        self.find_joined(claims, id).await?;
        self.conversations.add_message(id, claims.user_id(), body).await
    }

    pub async fn unread(&self, claims: &Claims) -> Result<i64> {
        self.conversations.unread_count(claims.user_id()).await
    }

    async fn find_joined(&self, claims: &Claims, id: Uuid) -> Result<Conversation> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;
        if !conversation.involves(claims.user_id()) {
            return Err(Error::Forbidden(
                "You are not a participant in this conversation".to_string(),
            ));
        }
        Ok(conversation)
    }
}
