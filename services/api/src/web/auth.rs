//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the current user.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_cards_core::domain::SessionUser;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::AuthError;
use crate::web::{
    envelope::{ErrorEnvelope, ErrorResponse, StatusResponse, STATUS_SUCCESS},
    middleware::{session_cookie, session_id_from_headers},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Absent and `null` fields are both read as empty strings.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<SessionUser> for UserDto {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            username: user.username,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub status: String,
    pub user: UserDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = StatusResponse),
        (status = 400, description = "Missing field, unreadable body or email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ErrorEnvelope> {
    let Json(req) = body.map_err(|rejection| {
        warn!("Rejected register body: {}", rejection.body_text());
        ErrorEnvelope::bad_request(AuthError::MissingField.to_string())
    })?;

    state
        .auth
        .register(
            req.username.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| match e {
            AuthError::Port(_) | AuthError::Hashing => {
                error!("Failed to register user: {:?}", e);
                ErrorEnvelope::internal("Failed to create user")
            }
            other => ErrorEnvelope::bad_request(other.to_string()),
        })?;

    Ok(Json(StatusResponse::success()))
}

/// POST /api/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the session cookie", body = StatusResponse),
        (status = 401, description = "Missing or invalid credentials, or an unreadable body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorEnvelope> {
    let Json(req) = body.map_err(|rejection| {
        warn!("Rejected login body: {}", rejection.body_text());
        ErrorEnvelope::unauthorized(AuthError::MissingCredentials.to_string())
    })?;

    let session = state
        .auth
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| match e {
            AuthError::Port(_) => {
                error!("Failed to log user in: {:?}", e);
                ErrorEnvelope::internal("Failed to create session")
            }
            other => ErrorEnvelope::unauthorized(other.to_string()),
        })?;

    let cookie = session_cookie(
        &session.id,
        state.auth.session_ttl().num_seconds(),
        state.config.session_cookie_secure,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(StatusResponse::success()),
    ))
}

/// POST /api/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logout successful; clears the session cookie", body = StatusResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(e) = state.auth.logout(session_id_from_headers(&headers)).await {
        error!("Failed to delete auth session: {:?}", e);
    }

    let cookie = session_cookie("", 0, state.config.session_cookie_secure);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(StatusResponse::success()),
    )
}

/// GET /api/me - The currently logged-in user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ErrorEnvelope> {
    let user = state
        .auth
        .current_user(session_id_from_headers(&headers))
        .await
        .ok_or_else(|| ErrorEnvelope::unauthorized("Not authenticated"))?;

    Ok(Json(MeResponse {
        status: STATUS_SUCCESS.to_string(),
        user: user.into(),
    }))
}
