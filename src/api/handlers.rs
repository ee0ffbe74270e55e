//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheOptions, ExpiringCache, FileBackend, Storage};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    limit_from_json, ConfigRequest, ConfigResponse, GetResponse, HealthResponse, KeysResponse,
    MessageResponse, SetRequest, StatsResponse,
};

/// Application state shared across all handlers.
///
/// `ExpiringCache` is itself a shared handle, so no outer lock is needed.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: ExpiringCache,
}

impl AppState {
    pub fn new(cache: ExpiringCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the persistent file backend when `storage_path` is set,
    /// otherwise uses the in-memory store.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage = match &config.storage_path {
            Some(path) => Some(Storage::indexed(FileBackend::open(path).await?)),
            None => None,
        };

        let cache = ExpiringCache::new(CacheOptions {
            storage,
            ..config.cache_options()
        });
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(&req.key, &req.value).await?;

    Ok(Json(MessageResponse::set(req.key)))
}

/// Handler for GET /get/:key
///
/// Absent, expired and version-mismatched entries all answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get::<Value>(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Removing an absent key succeeds; the backend treats it as a no-op.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.cache.remove(&key).await?;

    Ok(Json(MessageResponse::deleted(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Result<Json<KeysResponse>> {
    let keys = state.cache.keys().await?;

    Ok(Json(KeysResponse { keys }))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.cache.clear().await?;

    Ok(Json(MessageResponse::cleared()))
}

/// Handler for PUT /config
pub async fn config_handler(
    State(state): State<AppState>,
    Json(req): Json<ConfigRequest>,
) -> Json<ConfigResponse> {
    if let Some(capacity) = &req.capacity {
        state
            .cache
            .set_capacity(
                limit_from_json(capacity).map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
            );
    }
    if let Some(max_age) = &req.max_age {
        state.cache.set_max_age(limit_from_json(max_age));
    }

    Json(ConfigResponse {
        capacity: state.cache.capacity(),
        max_age: state.cache.max_age(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
