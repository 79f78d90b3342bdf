//! Request authentication middleware.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::auth::TokenIssuer;
use crate::state::AppState;

/// The authenticated caller, injected into request extensions by
/// [`require_auth`] and consumed by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified user id (the token's `sub` claim).
    pub id: String,
}

/// Bearer-token authentication middleware.
///
/// Verifies the `Authorization: Bearer <token>` header and makes the
/// authenticated user id available to downstream handlers. Returns 401
/// Unauthorized if the token is missing, malformed, or expired.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verified = TokenIssuer::extract_bearer_token(header_value)
        .and_then(|token| state.tokens.verify(token));

    match verified {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser { id: claims.sub });
            next.run(request).await
        }
        Err(e) => {
            warn!("Authentication failed for {}: {}", request.uri().path(), e);
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
