//! Deck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.db.list_decks(auth.user_id, Utc::now()).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<Deck>)> {
    let (name, description) = request.validate()?;
    let deck = state.db.create_deck(auth.user_id, &name, &description).await?;

    tracing::info!(deck_id = %deck.id, user_id = %auth.user_id, "created deck");

    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET /api/decks/:deck_id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Deck>> {
    let deck = state
        .db
        .get_deck(auth.user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;
    Ok(Json(deck))
}

/// PUT /api/decks/:deck_id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Json(request): Json<UpdateDeckRequest>,
) -> Result<Json<Deck>> {
    let mut deck = state
        .db
        .get_deck(auth.user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    request.apply(&mut deck)?;
    let deck = state.db.update_deck(&deck).await?;

    Ok(Json(deck))
}

/// DELETE /api/decks/:deck_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_deck(auth.user_id, deck_id).await? {
        return Err(ApiError::NotFound("Deck not found".to_string()));
    }

    tracing::info!(%deck_id, user_id = %auth.user_id, "deleted deck");

    Ok(StatusCode::NO_CONTENT)
}
