use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::offer::{Offer, OfferStatus};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "salary_range_is_ordered"))]
pub struct CreateOfferPayload {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub company: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub location: String,
    #[validate(length(max = 50))]
    pub contract_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub skills: Vec<String>,
    #[serde(default)]
    pub remote: bool,
    pub status: Option<OfferStatus>,
}

fn salary_range_is_ordered(payload: &CreateOfferPayload) -> Result<(), ValidationError> {
    match (payload.salary_min, payload.salary_max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOfferPayload {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub location: Option<String>,
    #[validate(length(max = 50))]
    pub contract_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub skills: Option<Vec<String>>,
    pub remote: Option<bool>,
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferListQuery {
    pub status: Option<OfferStatus>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferResponse {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub contract_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub currency: Option<String>,
    pub description: String,
    pub skills: Vec<String>,
    pub remote: bool,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
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
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RemovalOutcome {
    Deleted,
    /// The offer had been swiped, so it was closed instead.
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferRemovalResponse {
    pub id: Uuid,
    pub outcome: RemovalOutcome,
}
