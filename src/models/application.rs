//! Application records and the status lifecycle they move through.
//!
//! An application is opened by a right-swipe in status [`ApplicationStatus::New`]
//! and then advances through the recruiter review pipeline. Progress is
//! forward-only; `rejected` is reachable from every non-terminal status, and
//! `accepted`, `hired` and `rejected` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ParseEnumError;

/// Stored as the rejection reason when a candidate withdraws without giving one.
pub const WITHDRAWN_REASON: &str = "Withdrawn by candidate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    New,
    Viewed,
    Contacted,
    Interview,
    Offer,
    Accepted,
    Hired,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move an application from '{from}' to '{to}'")]
pub struct InvalidTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::New,
        ApplicationStatus::Viewed,
        ApplicationStatus::Contacted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Accepted,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Viewed => "viewed",
            ApplicationStatus::Contacted => "contacted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Position in the review pipeline. `rejected` sits outside it.
    pub const fn rank(self) -> Option<u8> {
        match self {
            ApplicationStatus::New => Some(0),
            ApplicationStatus::Viewed => Some(1),
            ApplicationStatus::Contacted => Some(2),
            ApplicationStatus::Interview => Some(3),
            ApplicationStatus::Offer => Some(4),
            ApplicationStatus::Accepted | ApplicationStatus::Hired => Some(5),
            ApplicationStatus::Rejected => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Hired | ApplicationStatus::Rejected
        )
    }

    /// Index of the candidate-facing progress stepper; `-1` for rejected.
    pub const fn step_index(self) -> i8 {
        match self {
            ApplicationStatus::New => 0,
            ApplicationStatus::Viewed | ApplicationStatus::Contacted => 1,
            ApplicationStatus::Interview | ApplicationStatus::Offer => 2,
            ApplicationStatus::Accepted | ApplicationStatus::Hired => 3,
            ApplicationStatus::Rejected => -1,
        }
    }

    pub const fn can_withdraw(self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    pub fn transition(self, next: ApplicationStatus) -> Result<ApplicationStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("application status", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub swipe_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub reject_reason: Option<String>,
    pub notes: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A compare-and-set status write. Applied only while the stored version
/// still equals `expected_version`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub expected_version: i32,
    pub status: ApplicationStatus,
    pub reject_reason: Option<String>,
    pub withdrawn_at: Option<DateTime<Utc>>,
}

/// Which side of the marketplace a listing or aggregate is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Candidate(Uuid),
    Recruiter(Uuid),
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub candidate_id: Option<Uuid>,
    pub recruiter_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

impl From<Scope> for ApplicationFilter {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Candidate(id) => Self {
                candidate_id: Some(id),
                ..Self::default()
            },
            Scope::Recruiter(id) => Self {
                recruiter_id: Some(id),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn happy_path_moves_forward() {
        let mut status = New;
        for next in [Viewed, Interview, Accepted] {
            status = status.transition(next).expect("forward move");
        }
        assert_eq!(status, Accepted);
    }

    #[test]
    fn forward_skips_are_allowed() {
        assert!(New.can_transition_to(Interview));
        assert!(Viewed.can_transition_to(Hired));
        assert!(Contacted.can_transition_to(Offer));
    }

    #[test]
    fn backward_and_same_state_moves_are_refused() {
        assert!(!Interview.can_transition_to(Viewed));
        assert!(!Viewed.can_transition_to(Viewed));
        assert!(!Offer.can_transition_to(Contacted));
        let err = Interview.transition(New).unwrap_err();
        assert_eq!(err, InvalidTransition { from: Interview, to: New });
    }

    #[test]
    fn rejected_is_reachable_from_every_open_status() {
        for status in [New, Viewed, Contacted, Interview, Offer] {
            assert!(status.can_transition_to(Rejected), "{status} -> rejected");
        }
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        for terminal in [Accepted, Hired, Rejected] {
            assert!(terminal.is_terminal());
            for next in ApplicationStatus::ALL {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
        assert!(!Accepted.can_transition_to(Hired));
    }

    #[test]
    fn step_index_matches_candidate_stepper() {
        assert_eq!(New.step_index(), 0);
        assert_eq!(Viewed.step_index(), 1);
        assert_eq!(Interview.step_index(), 2);
        assert_eq!(Accepted.step_index(), 3);
        assert_eq!(Rejected.step_index(), -1);
        for status in ApplicationStatus::ALL {
            if status != Rejected {
                assert!((0..=3).contains(&status.step_index()));
            }
        }
    }

    #[test]
    fn withdraw_only_while_open() {
        assert!(New.can_withdraw());
        assert!(Offer.can_withdraw());
        assert!(!Rejected.can_withdraw());
        assert!(!Accepted.can_withdraw());
        assert!(!Hired.can_withdraw());
    }

    #[test]
    fn only_known_statuses_parse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("withdrawn".parse::<ApplicationStatus>().is_err());
        assert!(serde_json::from_str::<ApplicationStatus>(r#""archived""#).is_err());
    }
}
