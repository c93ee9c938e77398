use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::database::repository::{ApplicationRepository, OfferRepository};
use crate::dto::application_dto::{ApplicationListQuery, UpdateStatusPayload};
use crate::dto::PageParams;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, StatusChange, WITHDRAWN_REASON,
};
use crate::models::audit_log::AuditLog;
use crate::models::notification::NotificationKind;
use crate::models::offer::Offer;
use crate::models::user::UserRole;
use crate::services::audit_service::AuditService;
use crate::services::notification_service::NotificationService;
use crate::utils::time::now;

pub const AUDIT_ENTITY: &str = "application";

#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    offers: Arc<dyn OfferRepository>,
    audit: AuditService,
    notifications: NotificationService,
}

pub struct ApplicationList {
    pub items: Vec<Application>,
    pub total: i64,
    pub params: PageParams,
}

/// A status write about to be applied to one application.
struct Transition<'a> {
    actor: Uuid,
    current: &'a Application,
    next: ApplicationStatus,
    expected_version: i32,
    reject_reason: Option<String>,
    withdrawn_at: Option<DateTime<Utc>>,
    action: &'static str,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        offers: Arc<dyn OfferRepository>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            applications,
            offers,
            audit,
            notifications,
        }
    }

    pub async fn list(&self, claims: &Claims, query: ApplicationListQuery) -> Result<ApplicationList> {
        let params = PageParams::new(query.page, query.per_page);
        let mut filter = match claims.role {
            UserRole::Candidate => ApplicationFilter {
                candidate_id: Some(claims.user_id()),
                ..ApplicationFilter::default()
            },
            UserRole::Recruiter => ApplicationFilter {
                recruiter_id: Some(claims.user_id()),
                ..ApplicationFilter::default()
            },
            UserRole::Admin => ApplicationFilter::default(),
        };
        filter.status = query.status;
        filter.offer_id = query.offer_id;

        let (items, total) = self.applications.list(&filter, params.to_page()).await?;
        Ok(ApplicationList {
            items,
            total,
            params,
        })
    }

    pub async fn get(&self, claims: &Claims, id: Uuid) -> Result<Application> {
        let (application, _) = self.load_for_participant(claims, id).await?;
        Ok(application)
    }

    pub async fn history(&self, claims: &Claims, id: Uuid) -> Result<Vec<AuditLog>> {
        self.load_for_participant(claims, id).await?;
        self.audit.history(AUDIT_ENTITY, id).await
    }

    /// Recruiter decision on an application. The write is refused when the
    /// status changed since `expected_version` (or since it was read here).
    pub async fn update_status(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: UpdateStatusPayload,
    ) -> Result<Application> {
        let (current, offer) = self.load_for_recruiter(claims, id).await?;
        let expected_version = payload.expected_version.unwrap_or(current.version);
        if expected_version != current.version {
            return Err(stale_version());
        }

        let reject_reason = match payload.status {
            ApplicationStatus::Rejected => payload
                .reject_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            _ => None,
        };

        let updated = self
            .apply(Transition {
                actor: claims.user_id(),
                current: &current,
                next: payload.status,
                expected_version,
                reject_reason,
                withdrawn_at: None,
                action: "application.status_changed",
            })
            .await?;
        self.notify_candidate(&current, &updated, &offer).await;
        Ok(updated)
    }

    /// Explicit "seen" marker; meaningful only for a fresh application.
    pub async fn mark_viewed(&self, claims: &Claims, id: Uuid) -> Result<Application> {
        let (current, _) = self.load_for_recruiter(claims, id).await?;
        if current.status != ApplicationStatus::New {
            return Err(Error::Conflict(format!(
                "Only new applications can be marked as viewed, this one is '{}'",
                current.status
            )));
        }
        self.apply(Transition {
            actor: claims.user_id(),
            current: &current,
            next: ApplicationStatus::Viewed,
            expected_version: current.version,
            reject_reason: None,
            withdrawn_at: None,
            action: "application.viewed",
        })
        .await
    }

    pub async fn update_notes(
        &self,
        claims: &Claims,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<Application> {
        self.load_for_recruiter(claims, id).await?;
        let notes = notes.filter(|n| !n.trim().is_empty());
        let updated = self.applications.update_notes(id, notes).await?;
        if let Err(e) = self
            .audit
            .log(
                Some(claims.user_id()),
                "application.notes_updated",
                AUDIT_ENTITY,
                id,
                None,
            )
            .await
        {
            tracing::error!(application_id = %id, error = %e, "Failed to write audit entry");
        }
        Ok(updated)
    }

    /// The owning candidate pulls out of the process. Stored as a rejection
    /// carrying `withdrawn_at`.
    pub async fn withdraw(
        &self,
        claims: &Claims,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Application> {
        let current = self.find(id).await?;
        if current.candidate_id != claims.user_id() {
            return Err(Error::Forbidden(
                "Only the candidate can withdraw this application".to_string(),
            ));
        }
        if !current.status.can_withdraw() {
            return Err(Error::Conflict(format!(
                "An application in status '{}' can no longer be withdrawn",
                current.status
            )));
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| WITHDRAWN_REASON.to_string());

        let updated = self
            .apply(Transition {
                actor: claims.user_id(),
                current: &current,
                next: ApplicationStatus::Rejected,
                expected_version: current.version,
                reject_reason: Some(reason),
                withdrawn_at: Some(now()),
                action: "application.withdrawn",
            })
            .await?;

        if let Some(offer) = self.offers.find_by_id(current.offer_id).await? {
            self.notifications
                .enqueue(
                    offer.recruiter_id,
                    NotificationKind::ApplicationStatusChanged,
                    json!({
                        "application_id": updated.id,
                        "offer_id": offer.id,
                        "offer_title": offer.title,
                        "from": current.status,
                        "to": updated.status,
                        "withdrawn": true,
                    }),
                )
                .await?;
        }
        Ok(updated)
    }

    /// Moves an application forward to `target` as a side effect of another
    /// recruiter action. Applications already at or past `target`, or closed,
    /// are returned untouched.
    pub async fn advance_to(
        &self,
        actor: Uuid,
        current: &Application,
        target: ApplicationStatus,
    ) -> Result<Application> {
        let behind = match (current.status.rank(), target.rank()) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        };
        if !behind || current.status.is_terminal() {
            return Ok(current.clone());
        }

        let updated = self
            .apply(Transition {
                actor,
                current,
                next: target,
                expected_version: current.version,
                reject_reason: None,
                withdrawn_at: None,
                action: "application.status_changed",
            })
            .await?;
        if let Some(offer) = self.offers.find_by_id(current.offer_id).await? {
            self.notify_candidate(current, &updated, &offer).await;
        }
        Ok(updated)
    }

    pub async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> Result<Application> {
        self.applications.link_conversation(id, conversation_id).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Application> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    /// Loads an application the caller manages, along with its offer.
    pub async fn load_for_recruiter(&self, claims: &Claims, id: Uuid) -> Result<(Application, Offer)> {
        claims.require_recruiter()?;
        let application = self.find(id).await?;
        let offer = self.offer_of(&application).await?;
        if !claims.is_admin() && offer.recruiter_id != claims.user_id() {
            return Err(Error::Forbidden(
                "This application belongs to another recruiter's offer".to_string(),
            ));
        }
        Ok((application, offer))
    }

    /// Loads an application the caller takes part in, on either side.
    pub async fn load_for_participant(
        &self,
        claims: &Claims,
        id: Uuid,
    ) -> Result<(Application, Offer)> {
        let application = self.find(id).await?;
        let offer = self.offer_of(&application).await?;
        let user_id = claims.user_id();
        if !claims.is_admin() && application.candidate_id != user_id && offer.recruiter_id != user_id
        {
            return Err(Error::Forbidden(
                "You are not a participant in this application".to_string(),
            ));
        }
        Ok((application, offer))
    }

    async fn offer_of(&self, application: &Application) -> Result<Offer> {
        self.offers
            .find_by_id(application.offer_id)
            .await?
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))
    }

    async fn apply(&self, transition: Transition<'_>) -> Result<Application> {
        let from = transition.current.status;
        let next = from
            .transition(transition.next)
            .map_err(|e| Error::Conflict(e.to_string()))?;

        let updated = self
            .applications
            .change_status(
                transition.current.id,
                StatusChange {
                    expected_version: transition.expected_version,
                    status: next,
                    reject_reason: transition.reject_reason,
                    withdrawn_at: transition.withdrawn_at,
                },
            )
            .await?;

        // The status write is the commit point; audit is recorded after it.
        if let Err(e) = self
            .audit
            .log(
                Some(transition.actor),
                transition.action,
                AUDIT_ENTITY,
                updated.id,
                Some(json!({
                    "from": from,
                    "to": updated.status,
                    "reject_reason": updated.reject_reason,
                    "version": updated.version,
                })),
            )
            .await
        {
            tracing::error!(application_id = %updated.id, error = %e, "Failed to write audit entry");
        }

        tracing::info!(
            application_id = %updated.id,
            from = %from,
            to = %updated.status,
            actor = %transition.actor,
            "Application status changed"
        );
        Ok(updated)
    }

    async fn notify_candidate(&self, before: &Application, after: &Application, offer: &Offer) {
        let (kind, payload) = if after.status == ApplicationStatus::Rejected {
            (
                NotificationKind::ApplicationRejected,
                json!({
                    "application_id": after.id,
                    "offer_id": offer.id,
                    "offer_title": offer.title,
                    "company": offer.company,
                    "reason": after.reject_reason,
                }),
            )
        } else {
            (
                NotificationKind::ApplicationStatusChanged,
                json!({
                    "application_id": after.id,
                    "offer_id": offer.id,
                    "offer_title": offer.title,
                    "from": before.status,
                    "to": after.status,
                }),
            )
        };
        if let Err(e) = self.notifications.enqueue(after.candidate_id, kind, payload).await {
            tracing::error!(application_id = %after.id, error = %e, "Failed to enqueue notification");
        }
    }
}

fn stale_version() -> Error {
    Error::Conflict("The application was changed by someone else, reload and retry".to_string())
}
