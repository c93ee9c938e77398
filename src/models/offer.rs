use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Draft,
    Published,
    Closed,
}

impl OfferStatus {
    pub const ALL: [OfferStatus; 3] = [OfferStatus::Draft, OfferStatus::Published, OfferStatus::Closed];

    pub const fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Published => "published",
            OfferStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OfferStatus::Draft),
            "published" => Ok(OfferStatus::Published),
            "closed" => Ok(OfferStatus::Closed),
            other => Err(ParseEnumError::new("offer status", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
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

#[derive(Debug, Clone)]
pub struct NewOffer {
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
}

#[derive(Debug, Clone, Default)]
pub struct OfferUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub remote: Option<bool>,
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    pub recruiter_id: Option<Uuid>,
    pub status: Option<OfferStatus>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
}

impl OfferFilter {
    /// In-process equivalent of the SQL predicate used by the Postgres adapter.
    pub fn matches(&self, offer: &Offer) -> bool {
        if self.recruiter_id.is_some_and(|id| id != offer.recruiter_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != offer.status) {
            return false;
        }
        if self.remote.is_some_and(|remote| remote != offer.remote) {
            return false;
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&offer.location, location) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let hit = contains_ignore_case(&offer.title, search)
                || contains_ignore_case(&offer.company, search)
                || contains_ignore_case(&offer.description, search);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
