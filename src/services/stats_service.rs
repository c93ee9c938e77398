use std::collections::BTreeMap;
use std::sync::Arc;

use crate::database::repository::{
    ApplicationRepository, InterviewRepository, OfferRepository, SwipeRepository,
};
use crate::dto::stats_dto::{CandidateStats, RecruiterStats};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::application::{ApplicationStatus, Scope};
use crate::models::offer::OfferStatus;
use crate::models::swipe::SwipeAction;
use crate::utils::time::now;

#[derive(Clone)]
pub struct StatsService {
    offers: Arc<dyn OfferRepository>,
    swipes: Arc<dyn SwipeRepository>,
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
}

impl StatsService {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        swipes: Arc<dyn SwipeRepository>,
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
    ) -> Self {
        Self {
            offers,
            swipes,
            applications,
            interviews,
        }
    }

    pub async fn recruiter(&self, claims: &Claims) -> Result<RecruiterStats> {
        claims.require_recruiter()?;
        let recruiter_id = claims.user_id();
        let scope = Scope::Recruiter(recruiter_id);

        let offers = self.offers.count_by_status(recruiter_id).await?;
        let applications = self.applications.count_by_status(scope).await?;
        let swipes = self.swipes.count_by_action(scope).await?;
        let upcoming_interviews = self.interviews.count_upcoming(recruiter_id, now()).await?;

        Ok(RecruiterStats {
            offers_by_status: tally(OfferStatus::ALL.map(OfferStatus::as_str), &offers, |s| s.as_str()),
            total_applications: applications.iter().map(|(_, n)| n).sum(),
            applications_by_status: tally(
                ApplicationStatus::ALL.map(ApplicationStatus::as_str),
                &applications,
                |s| s.as_str(),
            ),
            swipes_by_action: tally(SwipeAction::ALL.map(SwipeAction::as_str), &swipes, |a| a.as_str()),
            upcoming_interviews,
        })
    }

    pub async fn candidate(&self, claims: &Claims) -> Result<CandidateStats> {
        claims.require_candidate()?;
        let scope = Scope::Candidate(claims.user_id());

        let swipes = self.swipes.count_by_action(scope).await?;
        let applications = self.applications.count_by_status(scope).await?;

        Ok(CandidateStats {
            total_swipes: swipes.iter().map(|(_, n)| n).sum(),
            total_applications: applications.iter().map(|(_, n)| n).sum(),
            swipes_by_action: tally(SwipeAction::ALL.map(SwipeAction::as_str), &swipes, |a| a.as_str()),
            applications_by_status: tally(
                ApplicationStatus::ALL.map(ApplicationStatus::as_str),
                &applications,
                |s| s.as_str(),
            ),
        })
    }
}

/// Lays counts out over every known key so absent keys read as zero.
fn tally<K: Copy, const N: usize>(
    keys: [&'static str; N],
    counts: &[(K, i64)],
    name: impl Fn(K) -> &'static str,
) -> BTreeMap<String, i64> {
    let mut out: BTreeMap<String, i64> = keys.iter().map(|k| (k.to_string(), 0)).collect();
    for (key, n) in counts {
        *out.entry(name(*key).to_string()).or_insert(0) += n;
    }
    out
}
