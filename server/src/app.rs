use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/map", axum::routing::post(routes::api::compose_map))
        .route("/api/map/home", axum::routing::get(routes::api::home_map))
        .route(
            "/api/links/search",
            axum::routing::get(routes::api::search_link),
        )
        .route(
            "/api/links/directions",
            axum::routing::get(routes::api::directions_link),
        )
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/metrics", axum::routing::get(routes::api::metrics))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
