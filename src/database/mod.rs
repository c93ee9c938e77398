pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use memory::MemoryStore;
use postgres::PgStore;
use repository::{
    ApplicationRepository, AuditRepository, AvailabilityRepository, ConversationRepository,
    InterviewRepository, NotificationRepository, OfferRepository, RefreshTokenRepository,
    SwipeRepository, UserRepository,
};

/// One handle per storage port, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub swipes: Arc<dyn SwipeRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub interviews: Arc<dyn InterviewRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub availability: Arc<dyn AvailabilityRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + RefreshTokenRepository
            + OfferRepository
            + SwipeRepository
            + ApplicationRepository
            + InterviewRepository
            + ConversationRepository
            + AvailabilityRepository
            + NotificationRepository
            + AuditRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            offers: store.clone(),
            swipes: store.clone(),
            applications: store.clone(),
            interviews: store.clone(),
            conversations: store.clone(),
            availability: store.clone(),
            notifications: store.clone(),
            audit: store,
        }
    }

    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub fn postgres(store: PgStore) -> Self {
        Self::from_store(Arc::new(store))
    }

    /// Opens the backend selected by `STORAGE_BACKEND`, migrating Postgres first.
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::memory())
            }
            StorageBackend::Postgres => {
                let pool = pool::create_pool(config).await?;
                pool::run_migrations(&pool).await?;
                tracing::info!("Database connected and migrations applied");
                Ok(Self::postgres(PgStore::new(pool)))
            }
        }
    }
}
