pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::editor::handlers as editor;
use crate::layout::handlers as layout;
use crate::selection::handlers as selection;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Selection
        .route(
            "/api/v1/categories",
            get(selection::handle_list_categories),
        )
        .route("/api/v1/drafts", post(selection::handle_create_draft))
        .route("/api/v1/drafts/:id", get(selection::handle_get_draft))
        // Layout / export
        .route("/api/v1/drafts/:id/layout", get(layout::handle_get_layout))
        .route(
            "/api/v1/drafts/:id/published",
            get(layout::handle_get_published),
        )
        // Editor
        .route(
            "/api/v1/drafts/:id/categories/:category/swap",
            post(editor::handle_swap_category),
        )
        .route(
            "/api/v1/drafts/:id/categories/:category/regenerate",
            post(editor::handle_regenerate_category),
        )
        .route(
            "/api/v1/drafts/:id/categories/:category/saints/:candidate/swap",
            post(editor::handle_swap_saint),
        )
        .with_state(state)
}
