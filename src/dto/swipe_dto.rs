use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::offer_dto::OfferResponse;
use crate::models::application::Application;
use crate::models::swipe::{SwipeAction, SwipeEvent};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SwipePayload {
    pub offer_id: Uuid,
    pub action: SwipeAction,
    #[validate(length(max = 500))]
    pub rejection_reason: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub matching_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwipeResponse {
    pub swipe: SwipeEvent,
    /// Present only for a right swipe.
    pub application: Option<Application>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwipeHistoryQuery {
    pub action: Option<SwipeAction>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedItem {
    pub offer: OfferResponse,
    pub score_matching: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(score: Option<f64>) -> SwipePayload {
        SwipePayload {
            offer_id: Uuid::new_v4(),
            action: SwipeAction::Right,
            rejection_reason: None,
            matching_score: score,
        }
    }

    #[test]
    fn score_must_stay_within_percent_range() {
        assert!(payload(None).validate().is_ok());
        assert!(payload(Some(0.0)).validate().is_ok());
        assert!(payload(Some(100.0)).validate().is_ok());
        assert!(payload(Some(100.5)).validate().is_err());
        assert!(payload(Some(-1.0)).validate().is_err());
    }

    #[test]
    fn legacy_action_names_are_accepted() {
        let raw = format!(r#"{{"offer_id":"{}","action":"gauche"}}"#, Uuid::new_v4());
        let parsed: SwipePayload = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.action, SwipeAction::Left);
    }
}
