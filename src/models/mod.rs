pub mod application;
pub mod audit_log;
pub mod availability;
pub mod conversation;
pub mod interview;
pub mod notification;
pub mod offer;
pub mod refresh_token;
pub mod swipe;
pub mod user;

/// Raised when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
