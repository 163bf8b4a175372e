//! RustPresence - A lightweight, single-slot Rich Presence daemon
//!
//! Logs into a chat platform with an account token and keeps one Rich
//! Presence activity published, refreshing it on a fixed interval.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                Publisher (periodic driver)                   │
//! │  - ready signal → publish once → fixed-interval republish    │
//! └──────────────────────────────────────────────────────────────┘
//!                  │                          │
//! ┌────────────────────────────┐ ┌────────────────────────────────┐
//! │  Presence (normalization)  │ │  Assets (reference mapping)    │
//! │  - document → descriptor   │ │  - keys / platform URLs /      │
//! │  - defaults, closed enums  │ │    external URLs, cached       │
//! └────────────────────────────┘ └────────────────────────────────┘
//!                  │                          │
//! ┌──────────────────────────────────────────────────────────────┐
//! │            Platform (REST session + asset resolver)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `presence`: document normalization into typed descriptors
//! - `assets`: image reference classification, resolution, caching
//! - `platform`: REST session, external-asset endpoint, wire payloads
//! - `publisher`: the periodic publish loop
//! - `ops`: optional health/metrics listener
//! - `config`: daemon settings and the presence document
//! - `error`: error types

pub mod assets;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod platform;
pub mod presence;
pub mod publisher;

use std::sync::Arc;

/// Shared resources for the daemon
#[derive(Clone)]
pub struct AppState {
    /// Daemon settings
    pub settings: Arc<config::Settings>,

    /// HTTP client shared by the session and the asset resolver
    pub http_client: Arc<reqwest::Client>,

    /// External asset resolution cache (process lifetime)
    pub asset_cache: Arc<assets::AssetCache>,
}

impl AppState {
    /// Initialize shared state
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(settings: config::Settings) -> Result<Self, error::AppError> {
        // Every request carries a timeout; an unbounded hang would stall a
        // publish cycle indefinitely.
        let http_client = reqwest::Client::builder()
            .user_agent("RustPresence/0.1.0")
            .timeout(settings.platform.request_timeout())
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        Ok(Self {
            settings: Arc::new(settings),
            http_client: Arc::new(http_client),
            asset_cache: Arc::new(assets::AssetCache::new()),
        })
    }
}
