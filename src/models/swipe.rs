use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ParseEnumError;

/// A candidate's decision on one offer in the discovery feed.
///
/// The legacy French spellings (`droite`, `gauche`, `favori`) are accepted on
/// input; responses always use the English names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    #[serde(alias = "droite")]
    Right,
    #[serde(alias = "gauche")]
    Left,
    #[serde(alias = "favori")]
    Favorite,
}

impl SwipeAction {
    pub const ALL: [SwipeAction; 3] = [SwipeAction::Right, SwipeAction::Left, SwipeAction::Favorite];

    pub const fn as_str(self) -> &'static str {
        match self {
            SwipeAction::Right => "right",
            SwipeAction::Left => "left",
            SwipeAction::Favorite => "favorite",
        }
    }

    /// Only an apply swipe opens an application.
    pub const fn creates_application(self) -> bool {
        matches!(self, SwipeAction::Right)
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" | "droite" => Ok(SwipeAction::Right),
            "left" | "gauche" => Ok(SwipeAction::Left),
            "favorite" | "favori" => Ok(SwipeAction::Favorite),
            other => Err(ParseEnumError::new("swipe action", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwipeEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub offer_id: Uuid,
    pub action: SwipeAction,
    pub rejection_reason: Option<String>,
    pub matching_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSwipe {
    pub user_id: Uuid,
    pub offer_id: Uuid,
    pub action: SwipeAction,
    pub rejection_reason: Option<String>,
    pub matching_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_spellings_deserialize() {
        let parsed: Vec<SwipeAction> =
            serde_json::from_str(r#"["droite","gauche","favori","right"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                SwipeAction::Right,
                SwipeAction::Left,
                SwipeAction::Favorite,
                SwipeAction::Right
            ]
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<SwipeAction>(r#""up""#).is_err());
        assert!("superlike".parse::<SwipeAction>().is_err());
    }

    #[test]
    fn only_right_creates_an_application() {
        assert!(SwipeAction::Right.creates_application());
        assert!(!SwipeAction::Left.creates_application());
        assert!(!SwipeAction::Favorite.creates_application());
    }

    #[test]
    fn serializes_with_english_names() {
        assert_eq!(
            serde_json::to_string(&SwipeAction::Favorite).unwrap(),
            r#""favorite""#
        );
    }
}
