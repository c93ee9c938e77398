use std::cmp::Ordering;
use std::sync::Arc;

use crate::database::repository::{OfferRepository, Page, SwipeRepository, UserRepository};
use crate::dto::swipe_dto::{FeedItem, SwipeHistoryQuery, SwipePayload, SwipeResponse};
use crate::dto::PageParams;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::offer::{Offer, OfferStatus};
use crate::models::swipe::{NewSwipe, SwipeAction, SwipeEvent};
use crate::services::matching_service::{clamp_score, matching_score};

pub const DEFAULT_FEED_SIZE: i64 = 20;
pub const MAX_FEED_SIZE: i64 = 100;
const MAX_FAVORITES: i64 = 500;
/// Unswiped offers considered before ranking by score.
const FEED_WINDOW: i64 = 500;

#[derive(Clone)]
pub struct SwipeService {
    swipes: Arc<dyn SwipeRepository>,
    offers: Arc<dyn OfferRepository>,
    users: Arc<dyn UserRepository>,
}

pub struct SwipeHistory {
    pub items: Vec<SwipeEvent>,
    pub total: i64,
    pub params: PageParams,
}

impl SwipeService {
    pub fn new(
        swipes: Arc<dyn SwipeRepository>,
        offers: Arc<dyn OfferRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            swipes,
            offers,
            users,
        }
    }

    /// Records one decision on one offer. A right swipe also opens the
    /// application, in the same write. Swiping the same offer twice is a
    /// conflict whatever the actions were.
    pub async fn swipe(&self, claims: &Claims, payload: SwipePayload) -> Result<SwipeResponse> {
        claims.require_candidate()?;

        let offer = self
            .offers
            .find_by_id(payload.offer_id)
            .await?
            .ok_or_else(|| Error::NotFound("Offer not found".to_string()))?;
        if offer.status != OfferStatus::Published {
            return Err(Error::BadRequest(
                "Only published offers can be swiped".to_string(),
            ));
        }

        let matching_score = match payload.matching_score {
            Some(score) => score,
            None => self.score_for(claims, &offer).await?,
        };

        let rejection_reason = match payload.action {
            SwipeAction::Left => payload
                .rejection_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            _ => None,
        };

        let (swipe, application) = self
            .swipes
            .record(
                NewSwipe {
                    user_id: claims.user_id(),
                    offer_id: offer.id,
                    action: payload.action,
                    rejection_reason,
                    matching_score: Some(matching_score),
                },
                payload.action.creates_application(),
            )
            .await?;

        tracing::info!(
            user_id = %swipe.user_id,
            offer_id = %swipe.offer_id,
            action = %swipe.action,
            application_id = ?application.as_ref().map(|a| a.id),
            "Swipe recorded"
        );
        Ok(SwipeResponse { swipe, application })
    }

    pub async fn history(&self, claims: &Claims, query: SwipeHistoryQuery) -> Result<SwipeHistory> {
        let params = PageParams::new(query.page, query.per_page);
        let (items, total) = self
            .swipes
            .list_for_user(claims.user_id(), query.action, params.to_page())
            .await?;
        Ok(SwipeHistory {
            items,
            total,
            params,
        })
    }

    /// Offers the caller marked as favorite, most recent first. Offers removed
    /// since are skipped.
    pub async fn favorites(&self, claims: &Claims) -> Result<Vec<Offer>> {
        let (swipes, _) = self
            .swipes
            .list_for_user(
                claims.user_id(),
                Some(SwipeAction::Favorite),
                Page {
                    limit: MAX_FAVORITES,
                    offset: 0,
                },
            )
            .await?;

        let mut offers = Vec::with_capacity(swipes.len());
        for swipe in swipes {
            if let Some(offer) = self.offers.find_by_id(swipe.offer_id).await? {
                offers.push(offer);
            }
        }
        Ok(offers)
    }

    /// Published offers the caller has not swiped yet, best match first and
    /// newest first among equal scores.
    pub async fn feed(&self, claims: &Claims, limit: Option<i64>) -> Result<Vec<FeedItem>> {
        claims.require_candidate()?;
        let limit = limit.unwrap_or(DEFAULT_FEED_SIZE).clamp(1, MAX_FEED_SIZE);

        let candidate_skills = self.candidate_skills(claims).await?;
        let offers = self
            .offers
            .unswiped_published(claims.user_id(), FEED_WINDOW)
            .await?;

        let mut items: Vec<FeedItem> = offers
            .into_iter()
            .map(|offer| FeedItem {
                score_matching: matching_score(&candidate_skills, &offer.skills),
                offer: offer.into(),
            })
            .collect();
        items.sort_by(|a, b| {
            b.score_matching
                .partial_cmp(&a.score_matching)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.offer.created_at.cmp(&a.offer.created_at))
        });
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }

    async fn score_for(&self, claims: &Claims, offer: &Offer) -> Result<f64> {
        let candidate_skills = self.candidate_skills(claims).await?;
        Ok(clamp_score(matching_score(&candidate_skills, &offer.skills)))
    }

    async fn candidate_skills(&self, claims: &Claims) -> Result<Vec<String>> {
        Ok(self
            .users
            .find_by_id(claims.user_id())
            .await?
            .map(|user| user.skills)
            .unwrap_or_default())
    }
}
