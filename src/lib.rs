//! Studiobook - pricing, availability and booking wizard service for the
//! studio rental marketplace.

pub mod availability;
pub mod booking;
pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;
pub mod routes;

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self {
            db,
            cache: AppCache::new(config.session_ttl_minutes),
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(pricing::router())
        .merge(availability::router())
        .merge(booking::router());

    Router::new()
        .merge(routes::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
