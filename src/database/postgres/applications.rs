use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{parse_column, PgStore};
use crate::database::repository::{ApplicationRepository, Page};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, Scope, StatusChange,
};

pub(super) const APPLICATION_COLUMNS: &str = "id, candidate_id, offer_id, swipe_id, status, applied_at, reject_reason, notes, conversation_id, withdrawn_at, version, created_at, updated_at";

#[derive(FromRow)]
pub(super) struct ApplicationRow {
    id: Uuid,
    candidate_id: Uuid,
    offer_id: Uuid,
    swipe_id: Uuid,
    status: String,
    applied_at: DateTime<Utc>,
    reject_reason: Option<String>,
    notes: Option<String>,
    conversation_id: Option<Uuid>,
    withdrawn_at: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            candidate_id: row.candidate_id,
            offer_id: row.offer_id,
            swipe_id: row.swipe_id,
            status: parse_column(&row.status)?,
            applied_at: row.applied_at,
            reject_reason: row.reject_reason,
            notes: row.notes,
            conversation_id: row.conversation_id,
            withdrawn_at: row.withdrawn_at,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ApplicationFilter) {
    builder.push(" WHERE TRUE");
    if let Some(candidate_id) = filter.candidate_id {
        builder.push(" AND a.candidate_id = ").push_bind(candidate_id);
    }
    if let Some(recruiter_id) = filter.recruiter_id {
        builder.push(" AND o.recruiter_id = ").push_bind(recruiter_id);
    }
    if let Some(offer_id) = filter.offer_id {
        builder.push(" AND a.offer_id = ").push_bind(offer_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND a.status = ").push_bind(status.as_str());
    }
}

fn qualified_columns() -> String {
    APPLICATION_COLUMNS
        .split(", ")
        .map(|column| format!("a.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PgStore {
    async fn application_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM applications WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list(&self, filter: &ApplicationFilter, page: Page) -> Result<(Vec<Application>, i64)> {
        let mut items_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM applications a JOIN offers o ON o.id = a.offer_id",
            qualified_columns()
        ));
        push_filters(&mut items_query, filter);
        items_query
            .push(" ORDER BY a.applied_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows = items_query
            .build_query_as::<ApplicationRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM applications a JOIN offers o ON o.id = a.offer_id",
        );
        push_filters(&mut total_query, filter);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET
                status = $3,
                reject_reason = COALESCE($4, reject_reason),
                withdrawn_at = COALESCE($5, withdrawn_at),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(change.expected_version)
        .bind(change.status.as_str())
        .bind(&change.reject_reason)
        .bind(change.withdrawn_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None if self.application_exists(id).await? => Err(Error::Conflict(
                "Application was modified concurrently; reload and retry".to_string(),
            )),
            None => Err(Error::NotFound("Application not found".to_string())),
        }
    }

    async fn update_notes(&self, id: Uuid, notes: Option<String>) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET notes = $2, version = version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        row.try_into()
    }

    async fn link_conversation(&self, id: Uuid, conversation_id: Uuid) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET conversation_id = $2, version = version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        row.try_into()
    }

    async fn count_by_status(&self, scope: Scope) -> Result<Vec<(ApplicationStatus, i64)>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT a.status, COUNT(*) FROM applications a JOIN offers o ON o.id = a.offer_id",
        );
        push_filters(&mut query, &ApplicationFilter::from(scope));
        query.push(" GROUP BY a.status");
        let rows = query
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|(status, count)| Ok((parse_column(&status)?, count)))
            .collect()
    }
}
