pub mod application_service;
pub mod audit_service;
pub mod auth_service;
pub mod availability_service;
pub mod conversation_service;
pub mod interview_service;
pub mod matching_service;
pub mod notification_service;
pub mod offer_service;
pub mod stats_service;
pub mod swipe_service;
