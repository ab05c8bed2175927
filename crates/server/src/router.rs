//! HTTP router construction.
//!
//! Assembles routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN '{}', allowing all origins", origin);
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Headroom over the file limit for multipart framing and the
    // options field.
    let body_limit = DefaultBodyLimit::max(state.config.upload.max_file_bytes + 64 * 1024);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/upload", post(api::upload).layer(body_limit.clone()))
        .route(
            "/api/create-exam",
            post(api::create_exam).layer(body_limit),
        )
        .route("/api/generate-alias", post(api::generate_alias))
        .route("/api/evaluate", post(api::evaluate))
        .layer(cors_layer(&state.config.server.cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
