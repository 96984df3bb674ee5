//! Firebase ID token authentication.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Google JWKS URL for Firebase Auth.
const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Firebase token issuer prefix.
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Minimum spacing between refreshes triggered by an unknown key id.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Response message when no bearer token is supplied.
pub const NO_TOKEN_MESSAGE: &str = "unauthorized access - no token";

/// Response message when the token fails verification.
pub const INVALID_TOKEN_MESSAGE: &str = "unauthorized access - invalid token";

/// Token verification errors.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Auth configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unknown key ID: {0}")]
    UnknownKey(String),

    #[error("Token validation failed: {0}")]
    Rejected(String),
}

/// Decoded Firebase ID token claims.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaims {
    /// User ID
    pub sub: String,
    /// Email (if available)
    pub email: Option<String>,
    /// Display name (if available)
    pub name: Option<String>,
    /// Issuer
    pub iss: String,
    /// Audience (Firebase project ID)
    pub aud: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<FirebaseClaims> for AuthUser {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Verifies bearer tokens and yields the caller's identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError>;
}

/// Firebase token verification settings.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Firebase project ID (token audience)
    pub project_id: String,
    /// JWKS endpoint
    pub jwks_url: String,
    /// How long fetched keys stay fresh
    pub cache_ttl: Duration,
    /// Minimum gap between refreshes triggered by an unknown key ID
    pub min_refresh_interval: Duration,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            cache_ttl: JWKS_CACHE_TTL,
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        }
    }

    /// Create config from environment variables.
    ///
    /// The project ID comes from `FIREBASE_PROJECT_ID`, falling back to the
    /// `project_id` of the base64-encoded service account in `FIREBASE_SERVICE_KEY`.
    pub fn from_env() -> Result<Self, VerifyError> {
        let project_id = match std::env::var("FIREBASE_PROJECT_ID").ok().filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => {
                let key = std::env::var("FIREBASE_SERVICE_KEY").map_err(|_| {
                    VerifyError::Config(
                        "FIREBASE_PROJECT_ID or FIREBASE_SERVICE_KEY must be set".to_string(),
                    )
                })?;
                project_id_from_service_key(&key)?
            }
        };

        let mut config = Self::new(project_id);
        if let Ok(url) = std::env::var("FIREBASE_JWKS_URL") {
            if !url.is_empty() {
                config.jwks_url = url;
            }
        }
        Ok(config)
    }
}

#[derive(Deserialize)]
struct ServiceAccount {
    project_id: String,
}

/// Read the project ID from a base64-encoded service account JSON.
pub fn project_id_from_service_key(encoded: &str) -> Result<String, VerifyError> {
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| VerifyError::Config(format!("FIREBASE_SERVICE_KEY is not valid base64: {}", e)))?;
    let account: ServiceAccount = serde_json::from_slice(&decoded)
        .map_err(|e| VerifyError::Config(format!("FIREBASE_SERVICE_KEY is not a service account: {}", e)))?;

    if account.project_id.is_empty() {
        return Err(VerifyError::Config("service account has an empty project_id".to_string()));
    }
    Ok(account.project_id)
}

/// JWKS response from Google.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: Option<String>,
    e: Option<String>,
}

/// Firebase token verifier backed by a cache of Google's signing keys.
pub struct JwksCache {
    http: Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
    last_refresh: RwLock<Option<Instant>>,
    config: FirebaseConfig,
}

impl JwksCache {
    /// Create a new JWKS cache and load the current keys.
    pub async fn new(config: FirebaseConfig) -> Result<Self, VerifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VerifyError::Config(e.to_string()))?;

        let cache = Self {
            http,
            keys: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(None),
            config,
        };

        // Initial key refresh
        cache.refresh_keys().await?;

        Ok(cache)
    }

    /// Refresh JWKS keys.
    async fn refresh_keys(&self) -> Result<(), VerifyError> {
        debug!(url = %self.config.jwks_url, "Refreshing JWKS keys");

        let response = self
            .http
            .get(&self.config.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;
        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(err) => warn!(kid = %jwk.kid, "Skipping unusable JWKS key: {}", err),
            }
        }

        let key_count = keys.len();
        *self.keys.write().await = keys;
        *self.last_refresh.write().await = Some(Instant::now());

        debug!("Refreshed {} JWKS keys", key_count);
        Ok(())
    }

    async fn refreshed_within(&self, window: Duration) -> bool {
        self.last_refresh
            .read()
            .await
            .is_some_and(|at| at.elapsed() < window)
    }

    /// Get decoding key for a key ID.
    ///
    /// Stale keys are refreshed first. An unknown key ID triggers one extra
    /// refresh (rate limited) since Google rotates keys.
    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        if !self.refreshed_within(self.config.cache_ttl).await {
            if let Err(e) = self.refresh_keys().await {
                warn!("Failed to refresh JWKS keys: {}", e);
            }
        }

        if let Some(key) = self.keys.read().await.get(kid).cloned() {
            return Some(key);
        }

        if self.refreshed_within(self.config.min_refresh_interval).await {
            return None;
        }
        if let Err(e) = self.refresh_keys().await {
            warn!("Failed to refresh JWKS keys: {}", e);
            return None;
        }
        self.keys.read().await.get(kid).cloned()
    }
}

#[async_trait]
impl TokenVerifier for JwksCache {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError> {
        // Decode header to get key ID
        let header = decode_header(token).map_err(|e| VerifyError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Malformed(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Malformed("token missing key ID".to_string()))?;

        let key = self
            .get_key(&kid)
            .await
            .ok_or(VerifyError::UnknownKey(kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.config.project_id)]);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let token_data = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| VerifyError::Rejected(e.to_string()))?;

        if token_data.claims.sub.is_empty() {
            return Err(VerifyError::Rejected("empty subject".to_string()));
        }

        Ok(AuthUser::from(token_data.claims))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            debug!(path = %parts.uri.path(), "Missing or malformed Authorization header");
            metrics::record_auth_failure("no_token");
            ApiError::unauthorized(NO_TOKEN_MESSAGE)
        })?;

        state.verifier.verify(token).await.map_err(|e| {
            warn!(path = %parts.uri.path(), "Token verification failed: {}", e);
            metrics::record_auth_failure("invalid_token");
            ApiError::unauthorized(INVALID_TOKEN_MESSAGE)
        })
    }
}
