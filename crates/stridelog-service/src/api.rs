//! REST API endpoints for the stridelog-service.
//!
//! Two operations make up the step API: recording today's count (an
//! idempotent upsert, one record per user per calendar day) and fetching
//! the trailing week of records. Both are scoped to the authenticated
//! user; the auth routes exist to mint the tokens the middleware checks.
//!
//! # Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]. Input
//! validation failures map to 400, authentication failures to 401, and
//! database failures to 503 (the caller may retry later).

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use stridelog_store::{StepRecord, StoredUser};

use crate::day;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::{auth, middleware};

/// Minimum accepted password length for registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Create the API router with all routes and the auth layer applied.
pub fn router(state: Arc<AppState>) -> Router {
    let steps = Router::new()
        .route("/api/steps/weekly", get(get_weekly_steps))
        .route("/api/steps/daily", post(record_daily_steps))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::require_auth,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(steps)
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint (no auth required).
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

// ==========================================================================
// Auth Endpoints
// ==========================================================================

/// Request to register a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user as exposed over the API (no password hash).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<StoredUser> for UserResponse {
    fn from(u: StoredUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Response carrying a freshly issued token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Register a new user and issue a token.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = auth::hash_password(&request.password)?;

    let user = {
        let store = state.store.lock().await;
        store.create_user(&email, &password_hash)?
    };

    info!("Registered user {}", user.email);

    let token = state.tokens.issue(&user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Exchange credentials for a token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = request.email.trim().to_lowercase();

    let user = {
        let store = state.store.lock().await;
        store.get_user_by_email(&email)?
    };

    // Same response for unknown email and wrong password
    let invalid = || AppError::Unauthorized("invalid email or password".to_string());

    let user = user.ok_or_else(invalid)?;
    if !auth::verify_password(&request.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.tokens.issue(&user.id)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

// ==========================================================================
// Step Endpoints
// ==========================================================================

/// Request to record today's step count.
#[derive(Debug, Deserialize)]
pub struct DailyStepsRequest {
    pub steps: i64,
}

/// Record today's step count for the authenticated user.
///
/// "Today" is the current date truncated to midnight in the configured
/// offset. Calling this again on the same day replaces the earlier value;
/// it never adds a second record or accumulates.
async fn record_daily_steps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DailyStepsRequest>,
) -> Result<Json<StepRecord>, AppError> {
    let utc_offset_hours = state.config.read().await.steps.utc_offset_hours;
    let today = day::day_start(OffsetDateTime::now_utc(), utc_offset_hours);

    let store = state.store.lock().await;
    let record = store.upsert_steps(&user.id, today, request.steps)?;

    Ok(Json(record))
}

/// Get the authenticated user's records for the trailing 7 days.
///
/// The window is wall-clock (now minus 7 days to now), not calendar
/// aligned. Days with no record are absent from the result; an empty
/// array is a successful response.
async fn get_weekly_steps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StepRecord>>, AppError> {
    let (since, until) = day::weekly_window(OffsetDateTime::now_utc());

    let store = state.store.lock().await;
    let records = store.steps_between(&user.id, since, until)?;

    Ok(Json(records))
}

// ==========================================================================
// Errors
// ==========================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Store(stridelog_store::Error),
    Internal(String),
}

impl From<stridelog_store::Error> for AppError {
    fn from(e: stridelog_store::Error) -> Self {
        use stridelog_store::Error;
        match e {
            Error::Validation { .. } => AppError::BadRequest(e.to_string()),
            Error::EmailTaken(_) => AppError::Conflict(e.to_string()),
            Error::UserNotFound(_) => AppError::NotFound(e.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl From<auth::AuthError> for AppError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::Hash(_) => AppError::Internal(e.to_string()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            // Infrastructure failure; the caller may retry later
            AppError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
