//! Stockpile API Library
//!
//! Hardware inventory backend: CRUD over items, categories, suppliers and
//! locations with an automatic stock movement log.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, put},
    Router,
};
use sea_orm::DatabaseConnection;
use slog::Logger;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route(
            "/items/:id",
            put(handlers::items::update_item).delete(handlers::items::delete_item),
        )
        .route("/suppliers", get(handlers::catalog::list_suppliers))
        .route("/locations", get(handlers::catalog::list_locations))
        .route("/categories", get(handlers::catalog::list_categories))
}

/// CORS from configuration: explicit origins when set, permissive otherwise.
///
/// Config validation only allows the permissive fallback in development or
/// behind `cors_allow_any_origin`.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        ::tracing::info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// The complete HTTP application: API, health, metrics and docs behind the
/// request-id, access-log, CORS, compression and tracing layers.
pub fn build_router(state: AppState, logger: Logger) -> Router {
    let cors = cors_layer(&state.config);
    let logging_state = Arc::new(logging::LoggingState::new(logger));

    Router::<AppState>::new()
        .route("/", get(|| async { "stockpile-api up" }))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/health", health::health_routes(state.db.clone()))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn_with_state(
            logging_state,
            logging::logging_middleware,
        ))
        // Outermost: every request carries a request id for traceability
        .layer(from_fn(middleware_helpers::request_id_middleware))
        .with_state(state)
}
