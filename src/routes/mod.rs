use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::ActivityStore,
    middleware::{
        rate_limit::rate_limit_middleware,
        request_id::{make_span_with_request_id, request_id_middleware},
    },
    services::{pagination::PageLimits, MovieCatalog, RateLimiter},
};

pub mod feed;
pub mod movies;
pub mod recommendations;

/// Shared handler dependencies, built once at start-up
pub struct AppState {
    pub store: Arc<dyn ActivityStore>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub rate_limiter: Arc<RateLimiter>,
    pub page_limits: PageLimits,
    /// Default pick-tonight size when the caller gives none
    pub pick_tonight_count: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Routes that call the external catalog share the per-IP budget
    let catalog_routes = Router::new()
        .route(
            "/recommendations/pick-tonight",
            get(recommendations::pick_tonight),
        )
        .route(
            "/recommendations/because-you-watched",
            get(recommendations::because_you_watched),
        )
        .route("/movies/search", get(movies::search))
        .route_layer(middleware::from_fn_with_state(
            state,
            rate_limit_middleware,
        ));

    Router::new()
        .route("/feed/following", get(feed::following))
        .route("/feed/for-you", get(feed::for_you))
        .route("/users/:user_id/activity", get(feed::user_activity))
        .route("/activities", post(feed::record))
        .merge(catalog_routes)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
