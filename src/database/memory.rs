//! In-process store used by the test suite and by `STORAGE_BACKEND=memory`.
//!
//! Each trait method takes the single state lock once, so every write is
//! atomic with respect to the others, mirroring the transactions of the
//! Postgres adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::repository::{
    ApplicationRepository, AuditRepository, AvailabilityRepository, ConversationRepository,
    InterviewRepository, NotificationRepository, OfferRepository, Page, RefreshTokenRepository,
    SwipeRepository, UserRepository,
};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, Scope, StatusChange,
};
use crate::models::audit_log::{AuditLog, NewAuditLog};
use crate::models::availability::{AvailabilitySlot, NewSlot};
use crate::models::conversation::{Conversation, Message, NewConversation};
use crate::models::interview::{Interview, InterviewStatus, InterviewUpdate, NewInterview};
use crate::models::notification::{Notification, NotificationKind, NotificationStatus};
use crate::models::offer::{NewOffer, Offer, OfferFilter, OfferStatus, OfferUpdate};
use crate::models::refresh_token::RefreshToken;
use crate::models::swipe::{NewSwipe, SwipeAction, SwipeEvent};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::utils::time::now;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<Uuid, RefreshToken>,
    offers: HashMap<Uuid, Offer>,
    swipes: Vec<SwipeEvent>,
    applications: HashMap<Uuid, Application>,
    interviews: HashMap<Uuid, Interview>,
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<Message>,
    availability: HashMap<Uuid, Vec<AvailabilitySlot>>,
    notifications: Vec<Notification>,
    audit: Vec<AuditLog>,
}

impl MemoryState {
    fn offer_owner(&self, offer_id: Uuid) -> Option<Uuid> {
        self.offers.get(&offer_id).map(|offer| offer.recruiter_id)
    }

    fn application_matches(&self, filter: &ApplicationFilter, app: &Application) -> bool {
        if filter.candidate_id.is_some_and(|id| id != app.candidate_id) {
            return false;
        }
        if filter.offer_id.is_some_and(|id| id != app.offer_id) {
            return false;
        }
        if filter.status.is_some_and(|status| status != app.status) {
            return false;
        }
        if let Some(recruiter_id) = filter.recruiter_id {
            if self.offer_owner(app.offer_id) != Some(recruiter_id) {
                return false;
            }
        }
        true
    }

    fn application_mut(&mut self, id: Uuid) -> Result<&mut Application> {
        self.applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn paginate<T: Clone>(items: &[T], page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    items.iter().skip(offset).take(limit).cloned().collect()
}

fn count_into<K: PartialEq + Copy>(counts: &mut Vec<(K, i64)>, key: K) {
    match counts.iter_mut().find(|(k, _)| *k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key, 1)),
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut state = self.state();
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }
        let ts = now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            headline: None,
            skills: Vec::new(),
            company: user.company,
            is_active: true,
            created_at: ts,
            updated_at: ts,
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if update.headline.is_some() {
            user.headline = update.headline;
        }
        if let Some(skills) = update.skills {
            user.skills = skills;
        }
        if update.company.is_some() {
            user.company = update.company;
        }
        user.updated_at = now();
        Ok(user.clone())
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn store(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken> {
        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked_at: None,
            created_at: now(),
        };
        self.state().refresh_tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        Ok(self
            .state()
            .refresh_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state();
        match state.refresh_tokens.get_mut(&id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn create(&self, offer: NewOffer) -> Result<Offer> {
        let ts = now();
        let record = Offer {
            id: Uuid::new_v4(),
            recruiter_id: offer.recruiter_id,
            title: offer.title,
            company: offer.company,
            location: offer.location,
            contract_type: offer.contract_type,
            salary_min: offer.salary_min,
            salary_max: offer.salary_max,
            currency: offer.currency,
            description: offer.description,
            skills: offer.skills,
            remote: offer.remote,
            status: offer.status,
            created_at: ts,
            updated_at: ts,
        };
        self.state().offers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        Ok(self.state().offers.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, update: OfferUpdate) -> Result<Offer> {
        let mut state = self.state();
        let offer = state
            .offers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if let Some(title) = update.title {
            offer.title = title;
        }
        if let Some(company) = update.company {
            offer.company = company;
        }
        if let Some(location) = update.location {
            offer.location = location;
        }
        if update.contract_type.is_some() {
            offer.contract_type = update.contract_type;
        }
        if update.salary_min.is_some() {
            offer.salary_min = update.salary_min;
        }
        if update.salary_max.is_some() {
            offer.salary_max = update.salary_max;
        }
        if update.currency.is_some() {
            offer.currency = update.currency;
        }
        if let Some(description) = update.description {
            offer.description = description;
        }
        if let Some(skills) = update.skills {
            offer.skills = skills;
        }
        if let Some(remote) = update.remote {
            offer.remote = remote;
        }
        if let Some(status) = update.status {
            offer.status = status;
        }
        offer.updated_at = now();
        Ok(offer.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state();
        if state.swipes.iter().any(|s| s.offer_id == id) {
            return Err(Error::Conflict(
                "Offer has been swiped and cannot be deleted".to_string(),
            ));
        }
        Ok(state.offers.remove(&id).is_some())
    }

    async fn list(&self, filter: &OfferFilter, page: Page) -> Result<(Vec<Offer>, i64)> {
        let state = self.state();
        let mut items: Vec<Offer> = state
            .offers
            .values()
            .filter(|offer| filter.matches(offer))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        Ok((paginate(&items, page), total))
    }

    async fn unswiped_published(&self, user_id: Uuid, limit: i64) -> Result<Vec<Offer>> {
        let state = self.state();
        let mut items: Vec<Offer> = state
            .offers
            .values()
            .filter(|offer| offer.status == OfferStatus::Published)
            .filter(|offer| {
                !state
                    .swipes
                    .iter()
                    .any(|s| s.user_id == user_id && s.offer_id == offer.id)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }

    async fn count_by_status(&self, recruiter_id: Uuid) -> Result<Vec<(OfferStatus, i64)>> {
        let state = self.state();
        let mut counts = Vec::new();
        for offer in state.offers.values().filter(|o| o.recruiter_id == recruiter_id) {
            count_into(&mut counts, offer.status);
        }
        Ok(counts)
    }

    async fn has_swipes(&self, offer_id: Uuid) -> Result<bool> {
        Ok(self
            .state()
            .swipes
            .iter()
            .any(|swipe| swipe.offer_id == offer_id))
    }
}

#[async_trait]
impl SwipeRepository for MemoryStore {
    async fn record(
        &self,
        swipe: NewSwipe,
        open_application: bool,
    ) -> Result<(SwipeEvent, Option<Application>)> {
        let mut state = self.state();
        if state
            .swipes
            .iter()
            .any(|s| s.user_id == swipe.user_id && s.offer_id == swipe.offer_id)
        {
            return Err(Error::Conflict(
                "This offer has already been swiped".to_string(),
            ));
        }
        let ts = now();
        let event = SwipeEvent {
            id: Uuid::new_v4(),
            user_id: swipe.user_id,
            offer_id: swipe.offer_id,
            action: swipe.action,
            rejection_reason: swipe.rejection_reason,
            matching_score: swipe.matching_score,
            created_at: ts,
            updated_at: ts,
        };
        let application = open_application.then(|| Application {
            id: Uuid::new_v4(),
            candidate_id: event.user_id,
            offer_id: event.offer_id,
            swipe_id: event.id,
            status: ApplicationStatus::New,
            applied_at: ts,
            reject_reason: None,
            notes: None,
            conversation_id: None,
            withdrawn_at: None,
            version: 1,
            created_at: ts,
            updated_at: ts,
        });
        state.swipes.push(event.clone());
        if let Some(app) = &application {
            state.applications.insert(app.id, app.clone());
        }
        Ok((event, application))
    }

    async fn find(&self, user_id: Uuid, offer_id: Uuid) -> Result<Option<SwipeEvent>> {
        Ok(self
            .state()
            .swipes
            .iter()
            .find(|s| s.user_id == user_id && s.offer_id == offer_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        action: Option<SwipeAction>,
        page: Page,
    ) -> Result<(Vec<SwipeEvent>, i64)> {
        let state = self.state();
        let mut items: Vec<SwipeEvent> = state
            .swipes
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| action.map_or(true, |a| a == s.action))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        Ok((paginate(&items, page), total))
    }

    async fn count_by_action(&self, scope: Scope) -> Result<Vec<(SwipeAction, i64)>> {
        let state = self.state();
        let mut counts = Vec::new();
        for swipe in &state.swipes {
            let in_scope = match scope {
                Scope::Candidate(id) => swipe.user_id == id,
                Scope::Recruiter(id) => state.offer_owner(swipe.offer_id) == Some(id),
            };
            if in_scope {
                count_into(&mut counts, swipe.action);
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.state().applications.get(&id).cloned())
    }

    async fn list(&self, filter: &ApplicationFilter, page: Page) -> Result<(Vec<Application>, i64)> {
        let state = self.state();
        let mut items: Vec<Application> = state
            .applications
            .values()
            .filter(|app| state.application_matches(filter, app))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        let total = items.len() as i64;
        Ok((paginate(&items, page), total))
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Application> {
        let mut state = self.state();
        let app = state.application_mut(id)?;
        if app.version != change.expected_version {
            return Err(Error::Conflict(
                "Application was modified concurrently; reload and retry".to_string(),
            ));
        }
        app.status = change.status;
        if change.reject_reason.is_some() {
            app.reject_reason = change.reject_reason;
        }
        if change.withdrawn_at.is_some() {
            app.withdrawn_at = change.withdrawn_at;
        }
        app.version += 1;
        app.updated_at = now();
        Ok(app.clone())
    }

    async fn update_notes(&self, id: Uuid, notes: Option<String>) -> Result<Application> {
        let mut state = self.state();
        let app = state.application_mut(id)?;
        app.notes = notes;
        app.version += 1;
        app.updated_at = now();
        Ok(app.clone())
    }

    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> Result<Application> {
        let mut state = self.state();
        let app = state.application_mut(id)?;
        app.conversation_id = Some(conversation_id);
        app.version += 1;
        app.updated_at = now();
        Ok(app.clone())
    }

    async fn count_by_status(&self, scope: Scope) -> Result<Vec<(ApplicationStatus, i64)>> {
        let state = self.state();
        let filter = ApplicationFilter::from(scope);
        let mut counts = Vec::new();
        for app in state.applications.values() {
            if state.application_matches(&filter, app) {
                count_into(&mut counts, app.status);
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl InterviewRepository for MemoryStore {
    async fn create(&self, interview: NewInterview) -> Result<Interview> {
        let ts = now();
        let record = Interview {
            id: Uuid::new_v4(),
            application_id: interview.application_id,
            recruiter_id: interview.recruiter_id,
            candidate_id: interview.candidate_id,
            scheduled_at: interview.scheduled_at,
            duration_minutes: interview.duration_minutes,
            location: interview.location,
            meeting_url: interview.meeting_url,
            notes: interview.notes,
            status: InterviewStatus::Scheduled,
            created_at: ts,
            updated_at: ts,
        };
        self.state().interviews.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        Ok(self.state().interviews.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Interview>> {
        let state = self.state();
        let mut items: Vec<Interview> = state
            .interviews
            .values()
            .filter(|i| i.involves(user_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        Ok(items)
    }

    async fn update(&self, id: Uuid, update: InterviewUpdate) -> Result<Interview> {
        let mut state = self.state();
        let interview = state
            .interviews
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        if let Some(scheduled_at) = update.scheduled_at {
            interview.scheduled_at = scheduled_at;
        }
        if let Some(duration) = update.duration_minutes {
            interview.duration_minutes = duration;
        }
        if update.location.is_some() {
            interview.location = update.location;
        }
        if update.meeting_url.is_some() {
            interview.meeting_url = update.meeting_url;
        }
        if update.notes.is_some() {
            interview.notes = update.notes;
        }
        if let Some(status) = update.status {
            interview.status = status;
        }
        interview.updated_at = now();
        Ok(interview.clone())
    }

    async fn count_upcoming(&self, recruiter_id: Uuid, after: DateTime<Utc>) -> Result<i64> {
        Ok(self
            .state()
            .interviews
            .values()
            .filter(|i| {
                i.recruiter_id == recruiter_id
                    && i.status == InterviewStatus::Scheduled
                    && i.scheduled_at > after
            })
            .count() as i64)
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn open(&self, conversation: NewConversation) -> Result<Conversation> {
        let mut state = self.state();
        if let Some(application_id) = conversation.application_id {
            if let Some(existing) = state
                .conversations
                .values()
                .find(|c| c.application_id == Some(application_id))
            {
                return Ok(existing.clone());
            }
        }
        let ts = now();
        let record = Conversation {
            id: Uuid::new_v4(),
            application_id: conversation.application_id,
            candidate_id: conversation.candidate_id,
            recruiter_id: conversation.recruiter_id,
            created_at: ts,
            updated_at: ts,
        };
        state.conversations.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        Ok(self.state().conversations.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let state = self.state();
        let mut items: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.involves(user_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }

    async fn add_message(&self, conversation_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message> {
        let mut state = self.state();
        let ts = now();
        let conversation = state
            .conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;
        conversation.updated_at = ts;
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            body: body.to_string(),
            read_at: None,
            created_at: ts,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        Ok(self
            .state()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64> {
        let mut state = self.state();
        let ts = now();
        let mut marked = 0;
        for message in state.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.sender_id != reader_id && m.read_at.is_none()
        }) {
            message.read_at = Some(ts);
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let state = self.state();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.sender_id != user_id && m.read_at.is_none())
            .filter(|m| {
                state
                    .conversations
                    .get(&m.conversation_id)
                    .is_some_and(|c| c.involves(user_id))
            })
            .count() as i64)
    }
}

#[async_trait]
impl AvailabilityRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<AvailabilitySlot>> {
        Ok(self
            .state()
            .availability
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace(&self, user_id: Uuid, slots: Vec<NewSlot>) -> Result<Vec<AvailabilitySlot>> {
        let mut records: Vec<AvailabilitySlot> = slots
            .into_iter()
            .map(|slot| AvailabilitySlot {
                id: Uuid::new_v4(),
                user_id,
                weekday: slot.weekday,
                start_time: slot.start_time,
                end_time: slot.end_time,
            })
            .collect();
        records.sort_by(|a, b| (a.weekday, a.start_time).cmp(&(b.weekday, b.start_time)));
        self.state().availability.insert(user_id, records.clone());
        Ok(records)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn enqueue(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        payload: JsonValue,
    ) -> Result<Notification> {
        let ts = now();
        let record = Notification {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            payload,
            status: NotificationStatus::Pending,
            attempts: 0,
            last_error: None,
            next_retry_at: None,
            created_at: ts,
            updated_at: ts,
        };
        self.state().notifications.push(record.clone());
        Ok(record)
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let mut state = self.state();
        let claimed = state.notifications.iter_mut().find(|n| {
            n.status == NotificationStatus::Pending && n.next_retry_at.map_or(true, |at| at <= now)
        });
        Ok(claimed.map(|n| {
            n.next_retry_at = Some(lease_until);
            n.updated_at = now;
            n.clone()
        }))
    }

    async fn mark_sent(&self, id: Uuid) -> Result<()> {
        let mut state = self.state();
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.status = NotificationStatus::Sent;
            n.attempts += 1;
            n.updated_at = now();
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str, retry_at: Option<DateTime<Utc>>) -> Result<()> {
        let mut state = self.state();
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.attempts += 1;
            n.last_error = Some(error.to_string());
            n.next_retry_at = retry_at;
            n.status = if retry_at.is_some() {
                NotificationStatus::Pending
            } else {
                NotificationStatus::Failed
            };
            n.updated_at = now();
        }
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let record = AuditLog {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            changes: entry.changes,
            created_at: now(),
        };
        self.state().audit.push(record.clone());
        Ok(record)
    }

    async fn for_entity(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditLog>> {
        Ok(self
            .state()
            .audit
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
