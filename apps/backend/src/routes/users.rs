//! User registration and profile endpoints

use axum::{body::Bytes, extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{MeResponse, RegisterRequest, RegisterResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/register
/// Creates a new user and returns the token. The JSON body is optional.
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RegisterResponse>> {
    let name = display_name(&body)?;
    let user = state.db.create_user(name.as_deref()).await?;

    tracing::info!(user_id = %user.id, "registered new user");

    Ok(Json(RegisterResponse {
        user_id: user.id,
        token: user.token,
    }))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>> {
    let user = state
        .db
        .get_user_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        name: user.name,
        last_seen_at: user.last_seen_at,
    }))
}

/// Pull the optional display name out of a register body. An empty body,
/// `null` and `{}` all register an anonymous user.
fn display_name(body: &[u8]) -> Result<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let payload: Option<RegisterRequest> = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid register body: {e}")))?;

    Ok(payload
        .and_then(|p| p.name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty()))
}
