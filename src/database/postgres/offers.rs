use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{parse_column, PgStore};
use crate::database::repository::{OfferRepository, Page};
use crate::error::{Error, Result};
use crate::models::offer::{NewOffer, Offer, OfferFilter, OfferStatus, OfferUpdate};

const OFFER_COLUMNS: &str = "id, recruiter_id, title, company, location, contract_type, salary_min, salary_max, currency, description, skills, remote, status, created_at, updated_at";

#[derive(FromRow)]
struct OfferRow {
    id: Uuid,
    recruiter_id: Uuid,
    title: String,
    company: String,
    location: String,
    contract_type: Option<String>,
    salary_min: Option<Decimal>,
    salary_max: Option<Decimal>,
    currency: Option<String>,
    description: String,
    skills: Vec<String>,
    remote: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = Error;

    fn try_from(row: OfferRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            recruiter_id: row.recruiter_id,
            title: row.title,
            company: row.company,
            location: row.location,
            contract_type: row.contract_type,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            currency: row.currency,
            description: row.description,
            skills: row.skills,
            remote: row.remote,
            status: parse_column(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &OfferFilter) {
    builder.push(" WHERE TRUE");
    if let Some(recruiter_id) = filter.recruiter_id {
        builder.push(" AND recruiter_id = ").push_bind(recruiter_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(remote) = filter.remote {
        builder.push(" AND remote = ").push_bind(remote);
    }
    if let Some(location) = &filter.location {
        builder
            .push(" AND location ILIKE ")
            .push_bind(format!("%{}%", location));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl OfferRepository for PgStore {
    async fn create(&self, offer: NewOffer) -> Result<Offer> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            INSERT INTO offers (
                recruiter_id, title, company, location, contract_type,
                salary_min, salary_max, currency, description, skills,
                remote, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {OFFER_COLUMNS}
            "#
        ))
        .bind(offer.recruiter_id)
        .bind(&offer.title)
        .bind(&offer.company)
        .bind(&offer.location)
        .bind(&offer.contract_type)
        .bind(offer.salary_min)
        .bind(offer.salary_max)
        .bind(&offer.currency)
        .bind(&offer.description)
        .bind(&offer.skills)
        .bind(offer.remote)
        .bind(offer.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Offer::try_from).transpose()
    }

    async fn update(&self, id: Uuid, update: OfferUpdate) -> Result<Offer> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            UPDATE offers
            SET
                title = COALESCE($2, title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                contract_type = COALESCE($5, contract_type),
                salary_min = COALESCE($6, salary_min),
                salary_max = COALESCE($7, salary_max),
                currency = COALESCE($8, currency),
                description = COALESCE($9, description),
                skills = COALESCE($10, skills),
                remote = COALESCE($11, remote),
                status = COALESCE($12, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {OFFER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.company)
        .bind(&update.location)
        .bind(&update.contract_type)
        .bind(update.salary_min)
        .bind(update.salary_max)
        .bind(&update.currency)
        .bind(&update.description)
        .bind(&update.skills)
        .bind(update.remote)
        .bind(update.status.map(OfferStatus::as_str))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &OfferFilter, page: Page) -> Result<(Vec<Offer>, i64)> {
        let mut items_query = QueryBuilder::<Postgres>::new(format!("SELECT {OFFER_COLUMNS} FROM offers"));
        push_filters(&mut items_query, filter);
        items_query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows = items_query
            .build_query_as::<OfferRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offers");
        push_filters(&mut total_query, filter);
        let total: i64 = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Offer::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn unswiped_published(&self, user_id: Uuid, limit: i64) -> Result<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            SELECT {OFFER_COLUMNS}
            FROM offers o
            WHERE o.status = 'published'
              AND NOT EXISTS (
                SELECT 1 FROM swipe_events s WHERE s.offer_id = o.id AND s.user_id = $1
              )
            ORDER BY o.created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Offer::try_from).collect()
    }

    async fn count_by_status(&self, recruiter_id: Uuid) -> Result<Vec<(OfferStatus, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM offers WHERE recruiter_id = $1 GROUP BY status",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(status, count)| Ok((parse_column(&status)?, count)))
            .collect()
    }

    async fn has_swipes(&self, offer_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM swipe_events WHERE offer_id = $1)",
        )
        .bind(offer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
