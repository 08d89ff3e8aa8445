//! services/api/src/web/routes.rs
//!
//! Assembles the `/api` router from the public and session-protected handlers.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::web::{
    auth::{login_handler, logout_handler, me_handler, register_handler},
    evaluate_answer_handler, generate_flashcards_handler,
    middleware::require_auth,
    state::AppState,
    transcribe_audio_handler,
};

/// Uploads larger than this are rejected before reaching a handler.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route("/transcribe_audio", post(transcribe_audio_handler))
        .route("/evaluate_answer", post(evaluate_answer_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/generate_flashcards", post(generate_flashcards_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(app_state);

    Router::new().nest("/api", api_router)
}
