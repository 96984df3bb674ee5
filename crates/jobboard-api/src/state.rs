//! Application state.

use std::sync::Arc;

use jobboard_store::{
    AcceptedJobRepository, JobRepository, MongoAcceptedJobRepository, MongoJobRepository,
    MongoReviewRepository, MongoStore, ReviewRepository, StoreHealth,
};
use tracing::info;

use crate::auth::{FirebaseConfig, JwksCache, TokenVerifier};
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub jobs: Arc<dyn JobRepository>,
    pub accepted_jobs: Arc<dyn AcceptedJobRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub health: Arc<dyn StoreHealth>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = MongoStore::from_env().await?;
        let firebase = FirebaseConfig::from_env()?;
        info!(project_id = %firebase.project_id, "Verifying Firebase ID tokens");
        let jwks = JwksCache::new(firebase).await?;

        Ok(Self {
            config,
            jobs: Arc::new(MongoJobRepository::new(&store)),
            accepted_jobs: Arc::new(MongoAcceptedJobRepository::new(&store)),
            reviews: Arc::new(MongoReviewRepository::new(&store)),
            verifier: Arc::new(jwks),
            health: Arc::new(store),
        })
    }
}
