//! Settings endpoints

use axum::{extract::State, Extension, Json};

use crate::config::validate_session_size;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/settings
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserSettings>> {
    let settings = state
        .db
        .get_settings(auth.user_id, state.config.max_cards_per_session)
        .await?;

    Ok(Json(settings.to_api_settings()))
}

/// PUT /api/settings
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<UserSettings>> {
    let mut current = state
        .db
        .get_settings(auth.user_id, state.config.max_cards_per_session)
        .await?;

    if let Some(size) = request.max_cards_per_session {
        let size = validate_session_size(size)
            .map_err(|reason| ApiError::Validation(format!("max_cards_per_session {reason}")))?;
        current.max_cards_per_session = size as i32;
    }

    state.db.upsert_settings(&current).await?;

    Ok(Json(current.to_api_settings()))
}
