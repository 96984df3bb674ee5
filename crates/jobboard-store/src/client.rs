//! MongoDB client.
//!
//! One client is created at startup and shared by every repository. The
//! driver pools connections internally, so cloning the handle is cheap.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_operation;

/// Database used when `MONGO_DB` is not set.
pub const DEFAULT_DATABASE: &str = "usersJobsDb";

/// Collection names.
pub mod collections {
    pub const JOBS: &str = "jobs";
    pub const ACCEPTED_JOBS: &str = "acceptedJob";
    pub const REVIEWS: &str = "reviews";
}

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection string
    pub uri: String,
    /// Database name
    pub database: String,
    /// Application name reported to the server
    pub app_name: Option<String>,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| StoreError::config("MONGO_URI must be set to reach the document store"))?;

        if uri.trim().is_empty() {
            return Err(StoreError::config("MONGO_URI cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("MONGO_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            uri,
            database: std::env::var("MONGO_DB")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            app_name: std::env::var("MONGO_APP_NAME").ok().filter(|s| !s.is_empty()),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Connectivity probe used by readiness checks.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trip a `ping` command to the server.
    async fn ping(&self) -> StoreResult<()>;
}

/// Shared MongoDB handle.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Create a client for the configured deployment.
    ///
    /// The driver connects lazily; no server round-trip happens here.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );
        options.app_name = config.app_name.clone();
        options.connect_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        info!(database = %config.database, "MongoDB client configured");

        Ok(Self { database })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StoreResult<Self> {
        let config = StoreConfig::from_env()?;
        Self::connect(&config).await
    }

    /// Untyped handle to a collection.
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl StoreHealth for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        let start = Instant::now();
        let result = self.database.run_command(doc! { "ping": 1 }).await;
        record_operation("admin", "ping", result.is_ok(), start.elapsed());
        result?;
        debug!(latency_ms = start.elapsed().as_millis() as u64, "MongoDB ping ok");
        Ok(())
    }
}
