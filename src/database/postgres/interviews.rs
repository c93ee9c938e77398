use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{parse_column, PgStore};
use crate::database::repository::InterviewRepository;
use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewStatus, InterviewUpdate, NewInterview};

const INTERVIEW_COLUMNS: &str = "id, application_id, recruiter_id, candidate_id, scheduled_at, duration_minutes, location, meeting_url, notes, status, created_at, updated_at";

#[derive(FromRow)]
struct InterviewRow {
    id: Uuid,
    application_id: Uuid,
    recruiter_id: Uuid,
    candidate_id: Uuid,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    location: Option<String>,
    meeting_url: Option<String>,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = Error;

    fn try_from(row: InterviewRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            application_id: row.application_id,
            recruiter_id: row.recruiter_id,
            candidate_id: row.candidate_id,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            location: row.location,
            meeting_url: row.meeting_url,
            notes: row.notes,
            status: parse_column(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl InterviewRepository for PgStore {
    async fn create(&self, interview: NewInterview) -> Result<Interview> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            r#"
            INSERT INTO interviews (
                application_id, recruiter_id, candidate_id, scheduled_at,
                duration_minutes, location, meeting_url, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INTERVIEW_COLUMNS}
            "#
        ))
        .bind(interview.application_id)
        .bind(interview.recruiter_id)
        .bind(interview.candidate_id)
        .bind(interview.scheduled_at)
        .bind(interview.duration_minutes)
        .bind(&interview.location)
        .bind(&interview.meeting_url)
        .bind(&interview.notes)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Interview::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, InterviewRow>(&format!(
            r#"
            SELECT {INTERVIEW_COLUMNS}
            FROM interviews
            WHERE recruiter_id = $1 OR candidate_id = $1
            ORDER BY scheduled_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Interview::try_from).collect()
    }

    async fn update(&self, id: Uuid, update: InterviewUpdate) -> Result<Interview> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            r#"
            UPDATE interviews
            SET
                scheduled_at = COALESCE($2, scheduled_at),
                duration_minutes = COALESCE($3, duration_minutes),
                location = COALESCE($4, location),
                meeting_url = COALESCE($5, meeting_url),
                notes = COALESCE($6, notes),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INTERVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.scheduled_at)
        .bind(update.duration_minutes)
        .bind(&update.location)
        .bind(&update.meeting_url)
        .bind(&update.notes)
        .bind(update.status.map(InterviewStatus::as_str))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        row.try_into()
    }

    async fn count_upcoming(&self, recruiter_id: Uuid, after: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM interviews
            WHERE recruiter_id = $1 AND status = 'scheduled' AND scheduled_at > $2
            "#,
        )
        .bind(recruiter_id)
        .bind(after)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
