use std::sync::Arc;

use uuid::Uuid;

use crate::database::repository::OfferRepository;
use crate::dto::offer_dto::{
    CreateOfferPayload, OfferListQuery, OfferRemovalResponse, RemovalOutcome, UpdateOfferPayload,
};
use crate::dto::PageParams;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::offer::{NewOffer, Offer, OfferFilter, OfferStatus, OfferUpdate};
use crate::utils::validation::normalize_skills;

#[derive(Clone)]
pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
}

pub struct OfferList {
    pub items: Vec<Offer>,
    pub total: i64,
    pub params: PageParams,
}

impl OfferService {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self { offers }
    }

    pub async fn create(&self, claims: &Claims, payload: CreateOfferPayload) -> Result<Offer> {
        claims.require_recruiter()?;
        let offer = self
            .offers
            .create(NewOffer {
                recruiter_id: claims.user_id(),
                title: payload.title.trim().to_string(),
                company: payload.company.trim().to_string(),
                location: payload.location.trim().to_string(),
                contract_type: payload.contract_type,
                salary_min: payload.salary_min,
                salary_max: payload.salary_max,
                currency: payload.currency.map(|c| c.to_uppercase()),
                description: payload.description,
                skills: normalize_skills(payload.skills),
                remote: payload.remote,
                status: payload.status.unwrap_or(OfferStatus::Draft),
            })
            .await?;
        tracing::info!(offer_id = %offer.id, recruiter_id = %offer.recruiter_id, "Offer created");
        Ok(offer)
    }

    /// Public listing. Only published offers are visible unless the caller
    /// filters on a status, in which case the listing narrows to offers the
    /// caller owns (every offer for an admin).
    pub async fn list(&self, viewer: Option<&Claims>, query: OfferListQuery) -> Result<OfferList> {
        let params = PageParams::new(query.page, query.per_page);
        let mut filter = OfferFilter {
            recruiter_id: None,
            status: Some(OfferStatus::Published),
            search: non_empty(query.search),
            location: non_empty(query.location),
            remote: query.remote,
        };

        match (query.status, viewer) {
            (None, _) | (Some(OfferStatus::Published), _) => {}
            (Some(status), Some(claims)) => {
                filter.status = Some(status);
                if !claims.is_admin() {
                    filter.recruiter_id = Some(claims.user_id());
                }
            }
            (Some(_), None) => {
                return Err(Error::Unauthorized(
                    "Sign in to list unpublished offers".to_string(),
                ))
            }
        }

        let (items, total) = self.offers.list(&filter, params.to_page()).await?;
        Ok(OfferList { items, total, params })
    }

    pub async fn mine(&self, claims: &Claims, query: OfferListQuery) -> Result<OfferList> {
        claims.require_recruiter()?;
        let params = PageParams::new(query.page, query.per_page);
        let filter = OfferFilter {
            recruiter_id: Some(claims.user_id()),
            status: query.status,
            search: non_empty(query.search),
            location: non_empty(query.location),
            remote: query.remote,
        };
        let (items, total) = self.offers.list(&filter, params.to_page()).await?;
        Ok(OfferList { items, total, params })
    }

    /// Unpublished offers are reported as missing to everyone but their owner.
    pub async fn get(&self, viewer: Option<&Claims>, id: Uuid) -> Result<Offer> {
        let offer = self.find(id).await?;
        let visible = offer.status == OfferStatus::Published
            || viewer.is_some_and(|claims| can_manage(claims, &offer));
        if !visible {
            return Err(Error::NotFound("Offer not found".to_string()));
        }
        Ok(offer)
    }

    pub async fn update(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: UpdateOfferPayload,
    ) -> Result<Offer> {
        let current = self.find_managed(claims, id).await?;

        let salary_min = payload.salary_min.or(current.salary_min);
        let salary_max = payload.salary_max.or(current.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(Error::BadRequest(
                    "salary_min must not exceed salary_max".to_string(),
                ));
            }
        }

        let offer = self
            .offers
            .update(
                id,
                OfferUpdate {
                    title: payload.title.map(|v| v.trim().to_string()),
                    company: payload.company.map(|v| v.trim().to_string()),
                    location: payload.location.map(|v| v.trim().to_string()),
                    contract_type: payload.contract_type,
                    salary_min: payload.salary_min,
                    salary_max: payload.salary_max,
                    currency: payload.currency.map(|c| c.to_uppercase()),
                    description: payload.description,
                    skills: payload.skills.map(normalize_skills),
                    remote: payload.remote,
                    status: payload.status,
                },
            )
            .await?;
        Ok(offer)
    }

    /// Offers that were swiped at least once are closed rather than deleted
    /// so swipe history and applications keep their offer.
    pub async fn remove(&self, claims: &Claims, id: Uuid) -> Result<OfferRemovalResponse> {
        self.find_managed(claims, id).await?;

        if self.offers.has_swipes(id).await? {
            self.offers
                .update(
                    id,
                    OfferUpdate {
                        status: Some(OfferStatus::Closed),
                        ..OfferUpdate::default()
                    },
                )
                .await?;
            tracing::info!(offer_id = %id, "Offer was swiped, closed instead of deleted");
            return Ok(OfferRemovalResponse {
                id,
                outcome: RemovalOutcome::Closed,
            });
        }

        if !self.offers.delete(id).await? {
            return Err(Error::NotFound("Offer not found".to_string()));
        }
        tracing::info!(offer_id = %id, "Offer deleted");
        Ok(OfferRemovalResponse {
            id,
            outcome: RemovalOutcome::Deleted,
        })
    }

    pub async fn find(&self, id: Uuid) -> Result<Offer> {
        self.offers
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))
    }

    async fn find_managed(&self, claims: &Claims, id: Uuid) -> Result<Offer> {
        let offer = self.find(id).await?;
        if !can_manage(claims, &offer) {
            return Err(Error::Forbidden(
                "Only the offer's recruiter can change it".to_string(),
            ));
        }
        Ok(offer)
    }
}

fn can_manage(claims: &Claims, offer: &Offer) -> bool {
    claims.is_admin() || offer.recruiter_id == claims.user_id()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
