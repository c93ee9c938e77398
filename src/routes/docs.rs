//! OpenAPI document for the REST API, served as JSON at
//! `/api-docs/openapi.json`.

use axum::{response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto::{
    application_dto::{ApplicationResponse, NotesPayload, UpdateStatusPayload, WithdrawPayload},
    auth_dto::{
        AuthResponse, LoginPayload, RefreshPayload, RegisterPayload, UpdateProfilePayload,
        UserResponse,
    },
    availability_dto::{ReplaceAvailabilityPayload, SlotPayload},
    conversation_dto::{OpenConversationPayload, SendMessagePayload, UnreadResponse},
    interview_dto::{CreateInterviewPayload, UpdateInterviewPayload},
    offer_dto::{
        CreateOfferPayload, OfferRemovalResponse, OfferResponse, RemovalOutcome,
        UpdateOfferPayload,
    },
    stats_dto::{CandidateStats, RecruiterStats},
    swipe_dto::{FeedItem, SwipePayload, SwipeResponse},
    Pagination,
};
use crate::models::{
    application::{Application, ApplicationStatus},
    audit_log::AuditLog,
    availability::AvailabilitySlot,
    conversation::{Conversation, Message},
    interview::{Interview, InterviewStatus},
    offer::OfferStatus,
    swipe::{SwipeAction, SwipeEvent},
    user::UserRole,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hereoz API",
        description = "Swipe-based recruiting marketplace: offers, swipes, applications and the recruiter pipeline."
    ),
    paths(
        super::health::health,
        super::auth::register,
        super::auth::login,
        super::auth::refresh,
        super::auth::logout,
        super::auth::me,
        super::auth::update_me,
        super::jobs::create_job,
        super::jobs::list_jobs,
        super::jobs::my_jobs,
        super::jobs::get_job,
        super::jobs::update_job,
        super::jobs::delete_job,
        super::matches::swipe,
        super::matches::history,
        super::matches::favorites,
        super::matches::feed,
        super::applications::list_applications,
        super::applications::get_application,
        super::applications::update_status,
        super::applications::mark_viewed,
        super::applications::update_notes,
        super::applications::withdraw,
        super::applications::history,
        super::interviews::create_interview,
        super::interviews::list_interviews,
        super::interviews::get_interview,
        super::interviews::update_interview,
        super::conversations::open_conversation,
        super::conversations::list_conversations,
        super::conversations::list_messages,
        super::conversations::send_message,
        super::conversations::unread,
        super::availability::get_availability,
        super::availability::replace_availability,
        super::stats::recruiter_stats,
        super::stats::candidate_stats,
    ),
    components(schemas(
        Pagination,
        RegisterPayload, LoginPayload, RefreshPayload, UpdateProfilePayload,
        UserResponse, AuthResponse, UserRole,
        CreateOfferPayload, UpdateOfferPayload, OfferResponse, OfferStatus,
        OfferRemovalResponse, RemovalOutcome,
        SwipePayload, SwipeResponse, SwipeAction, SwipeEvent, FeedItem,
        Application, ApplicationStatus, ApplicationResponse,
        UpdateStatusPayload, NotesPayload, WithdrawPayload, AuditLog,
        CreateInterviewPayload, UpdateInterviewPayload, Interview, InterviewStatus,
        OpenConversationPayload, SendMessagePayload, UnreadResponse, Conversation, Message,
        SlotPayload, ReplaceAvailabilityPayload, AvailabilitySlot,
        RecruiterStats, CandidateStats,
    )),
    tags(
        (name = "hereoz", description = "Recruiting marketplace API")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/matches/swipe", "/applications/{id}/status", "/auth/login"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("ApplicationResponse"));
    }
}
