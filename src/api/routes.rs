use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Metadata provider
        .route("/search", get(handlers::search_titles))
        .route("/titles/:kind/:id", get(handlers::get_title_detail))
        // Board
        .route("/board", get(handlers::list_board))
        .route("/board/cards", post(handlers::add_card))
        .route("/board/cards/:id/status", put(handlers::set_card_status))
        .route("/board/cards/:id", delete(handlers::delete_card))
}
