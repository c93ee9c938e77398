use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::applications::{ApplicationRow, APPLICATION_COLUMNS};
use super::{parse_column, PgStore};
use crate::database::repository::{Page, SwipeRepository};
use crate::error::{Error, Result};
use crate::models::application::{Application, Scope};
use crate::models::swipe::{NewSwipe, SwipeAction, SwipeEvent};

const SWIPE_COLUMNS: &str =
    "id, user_id, offer_id, action, rejection_reason, matching_score, created_at, updated_at";

#[derive(FromRow)]
struct SwipeRow {
    id: Uuid,
    user_id: Uuid,
    offer_id: Uuid,
    action: String,
    rejection_reason: Option<String>,
    matching_score: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SwipeRow> for SwipeEvent {
    type Error = Error;

    fn try_from(row: SwipeRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            offer_id: row.offer_id,
            action: parse_column(&row.action)?,
            rejection_reason: row.rejection_reason,
            matching_score: row.matching_score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl SwipeRepository for PgStore {
    async fn record(
        &self,
        swipe: NewSwipe,
        open_application: bool,
    ) -> Result<(SwipeEvent, Option<Application>)> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, SwipeRow>(&format!(
            r#"
            INSERT INTO swipe_events (user_id, offer_id, action, rejection_reason, matching_score)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, offer_id) DO NOTHING
            RETURNING {SWIPE_COLUMNS}
            "#
        ))
        .bind(swipe.user_id)
        .bind(swipe.offer_id)
        .bind(swipe.action.as_str())
        .bind(&swipe.rejection_reason)
        .bind(swipe.matching_score)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = inserted else {
            return Err(Error::Conflict(
                "This offer has already been swiped".to_string(),
            ));
        };
        let event = SwipeEvent::try_from(row)?;

        let application = if open_application {
            let row = sqlx::query_as::<_, ApplicationRow>(&format!(
                r#"
                INSERT INTO applications (candidate_id, offer_id, swipe_id, status, applied_at)
                VALUES ($1, $2, $3, 'new', $4)
                RETURNING {APPLICATION_COLUMNS}
                "#
            ))
            .bind(event.user_id)
            .bind(event.offer_id)
            .bind(event.id)
            .bind(event.created_at)
            .fetch_one(&mut *tx)
            .await?;
            Some(Application::try_from(row)?)
        } else {
            None
        };

        tx.commit().await?;
        Ok((event, application))
    }

    async fn find(&self, user_id: Uuid, offer_id: Uuid) -> Result<Option<SwipeEvent>> {
        let row = sqlx::query_as::<_, SwipeRow>(&format!(
            "SELECT {SWIPE_COLUMNS} FROM swipe_events WHERE user_id = $1 AND offer_id = $2"
        ))
        .bind(user_id)
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SwipeEvent::try_from).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        action: Option<SwipeAction>,
        page: Page,
    ) -> Result<(Vec<SwipeEvent>, i64)> {
        let action = action.map(SwipeAction::as_str);
        let rows = sqlx::query_as::<_, SwipeRow>(&format!(
            r#"
            SELECT {SWIPE_COLUMNS}
            FROM swipe_events
            WHERE user_id = $1 AND ($2::text IS NULL OR action = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(action)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM swipe_events WHERE user_id = $1 AND ($2::text IS NULL OR action = $2)",
        )
        .bind(user_id)
        .bind(action)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(SwipeEvent::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn count_by_action(&self, scope: Scope) -> Result<Vec<(SwipeAction, i64)>> {
        let rows: Vec<(String, i64)> = match scope {
            Scope::Candidate(user_id) => {
                sqlx::query_as(
                    "SELECT action, COUNT(*) FROM swipe_events WHERE user_id = $1 GROUP BY action",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            Scope::Recruiter(recruiter_id) => {
                sqlx::query_as(
                    r#"
                    SELECT s.action, COUNT(*)
                    FROM swipe_events s
                    JOIN offers o ON o.id = s.offer_id
                    WHERE o.recruiter_id = $1
                    GROUP BY s.action
                    "#,
                )
                .bind(recruiter_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter()
            .map(|(action, count)| Ok((parse_column(&action)?, count)))
            .collect()
    }
}
