pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Repositories;
use crate::error::Result;
use crate::services::{
    application_service::ApplicationService,
    audit_service::AuditService,
    auth_service::AuthService,
    availability_service::AvailabilityService,
    conversation_service::ConversationService,
    interview_service::InterviewService,
    notification_service::{
        LogTransport, NotificationService, NotificationTransport, WebhookTransport,
    },
    offer_service::OfferService,
    stats_service::StatsService,
    swipe_service::SwipeService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub offer_service: OfferService,
    pub swipe_service: SwipeService,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
    pub conversation_service: ConversationService,
    pub availability_service: AvailabilityService,
    pub stats_service: StatsService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories) -> Result<Self> {
        let transport: Arc<dyn NotificationTransport> = match &config.notification_webhook_url {
            Some(url) => Arc::new(WebhookTransport::new(
                url.clone(),
                config.notification_webhook_secret.clone(),
            )?),
            None => Arc::new(LogTransport),
        };
        let notification_service = NotificationService::new(repos.notifications.clone(), transport);
        let audit_service = AuditService::new(repos.audit.clone());

        let auth_service = AuthService::new(repos.users.clone(), repos.refresh_tokens.clone(), &config);
        let offer_service = OfferService::new(repos.offers.clone());
        let swipe_service = SwipeService::new(
            repos.swipes.clone(),
            repos.offers.clone(),
            repos.users.clone(),
        );
        let application_service = ApplicationService::new(
            repos.applications.clone(),
            repos.offers.clone(),
            audit_service,
            notification_service.clone(),
        );
        let interview_service = InterviewService::new(
            repos.interviews.clone(),
            application_service.clone(),
            notification_service.clone(),
        );
        let conversation_service =
            ConversationService::new(repos.conversations.clone(), application_service.clone());
        let availability_service = AvailabilityService::new(repos.availability.clone());
        let stats_service = StatsService::new(
            repos.offers.clone(),
            repos.swipes.clone(),
            repos.applications.clone(),
            repos.interviews.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            offer_service,
            swipe_service,
            application_service,
            interview_service,
            conversation_service,
            availability_service,
            stats_service,
            notification_service,
        })
    }
}
