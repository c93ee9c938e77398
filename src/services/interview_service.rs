use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::database::repository::InterviewRepository;
use crate::dto::interview_dto::{CreateInterviewPayload, UpdateInterviewPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::ApplicationStatus;
use crate::models::interview::{Interview, InterviewStatus, InterviewUpdate, NewInterview};
use crate::models::notification::NotificationKind;
use crate::services::application_service::ApplicationService;
use crate::services::notification_service::NotificationService;
use crate::utils::time::now;

#[derive(Clone)]
pub struct InterviewService {
    interviews: Arc<dyn InterviewRepository>,
    applications: ApplicationService,
    notifications: NotificationService,
}

impl InterviewService {
    pub fn new(
        interviews: Arc<dyn InterviewRepository>,
        applications: ApplicationService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            interviews,
            applications,
            notifications,
        }
    }

    /// Schedules an interview and moves the application to `interview` when
    /// it has not got that far yet.
    pub async fn schedule(&self, claims: &Claims, payload: CreateInterviewPayload) -> Result<Interview> {
        let (application, offer) = self
            .applications
            .load_for_recruiter(claims, payload.application_id)
            .await?;
        if application.status.is_terminal() {
            return Err(Error::Conflict(format!(
                "Cannot schedule an interview for an application in status '{}'",
                application.status
            )));
        }
        if payload.scheduled_at <= now() {
            return Err(Error::BadRequest(
                "scheduled_at must be in the future".to_string(),
            ));
        }

        // A stale application must fail before the interview row exists.
        self.applications
            .advance_to(claims.user_id(), &application, ApplicationStatus::Interview)
            .await?;

        let interview = self
            .interviews
            .create(NewInterview {
                application_id: application.id,
                recruiter_id: offer.recruiter_id,
                candidate_id: application.candidate_id,
                scheduled_at: payload.scheduled_at,
                duration_minutes: payload.duration_minutes,
                location: payload.location,
                meeting_url: payload.meeting_url,
                notes: payload.notes,
            })
            .await?;

        if let Err(e) = self
            .notifications
            .enqueue(
                interview.candidate_id,
                NotificationKind::InterviewScheduled,
                json!({
                    "interview_id": interview.id,
                    "application_id": application.id,
                    "offer_title": offer.title,
                    "company": offer.company,
                    "scheduled_at": interview.scheduled_at,
                    "duration_minutes": interview.duration_minutes,
                    "location": interview.location,
                    "meeting_url": interview.meeting_url,
                }),
            )
            .await
        {
            tracing::error!(interview_id = %interview.id, error = %e, "Failed to enqueue notification");
        }

        tracing::info!(
            interview_id = %interview.id,
            application_id = %application.id,
            scheduled_at = %interview.scheduled_at,
            "Interview scheduled"
        );
        Ok(interview)
    }

    pub async fn list(&self, claims: &Claims) -> Result<Vec<Interview>> {
        self.interviews.list_for_user(claims.user_id()).await
    }

    pub async fn get(&self, claims: &Claims, id: Uuid) -> Result<Interview> {
        let interview = self.find(id).await?;
        if !claims.is_admin() && !interview.involves(claims.user_id()) {
            return Err(Error::Forbidden(
                "You are not a participant in this interview".to_string(),
            ));
        }
        Ok(interview)
    }

    /// Reschedules or closes an interview. Only the organising recruiter may
    /// change it, and only while it is still scheduled.
    pub async fn update(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: UpdateInterviewPayload,
    ) -> Result<Interview> {
        claims.require_recruiter()?;
        let interview = self.find(id).await?;
        if !claims.is_admin() && interview.recruiter_id != claims.user_id() {
            return Err(Error::Forbidden(
                "Only the organising recruiter can change this interview".to_string(),
            ));
        }
        if interview.status != InterviewStatus::Scheduled {
            return Err(Error::Conflict(format!(
                "Interview is already {}",
                interview.status
            )));
        }
        if let Some(at) = payload.scheduled_at {
            if at <= now() {
                return Err(Error::BadRequest(
                    "scheduled_at must be in the future".to_string(),
                ));
            }
        }

        let updated = self
            .interviews
            .update(
                id,
                InterviewUpdate {
                    scheduled_at: payload.scheduled_at,
                    duration_minutes: payload.duration_minutes,
                    location: payload.location,
                    meeting_url: payload.meeting_url,
                    notes: payload.notes,
                    status: payload.status,
                },
            )
            .await?;

        if payload.scheduled_at.is_some() && updated.status == InterviewStatus::Scheduled {
            if let Err(e) = self
                .notifications
                .enqueue(
                    updated.candidate_id,
                    NotificationKind::InterviewScheduled,
                    json!({
                        "interview_id": updated.id,
                        "application_id": updated.application_id,
                        "scheduled_at": updated.scheduled_at,
                        "duration_minutes": updated.duration_minutes,
                        "rescheduled": true,
                    }),
                )
                .await
            {
                tracing::error!(interview_id = %updated.id, error = %e, "Failed to enqueue notification");
            }
        }
        Ok(updated)
    }

    async fn find(&self, id: Uuid) -> Result<Interview> {
        self.interviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }
}
