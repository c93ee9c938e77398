use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Count maps list every known key, with zero where nothing matches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecruiterStats {
    pub offers_by_status: BTreeMap<String, i64>,
    pub applications_by_status: BTreeMap<String, i64>,
    pub swipes_by_action: BTreeMap<String, i64>,
    pub total_applications: i64,
    pub upcoming_interviews: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateStats {
    pub swipes_by_action: BTreeMap<String, i64>,
    pub applications_by_status: BTreeMap<String, i64>,
    pub total_swipes: i64,
    pub total_applications: i64,
}
