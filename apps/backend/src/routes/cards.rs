//! Card endpoints

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

/// GET /api/decks/:deck_id/cards
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<CardListResponse>> {
    let deck = state
        .db
        .get_deck(auth.user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    let cards = state.db.list_cards(deck.id).await?;

    Ok(Json(CardListResponse {
        cards: cards.iter().map(DbCard::to_api_card).collect(),
    }))
}

/// POST /api/decks/:deck_id/cards
/// New cards start with the scheduler's initial state and are due at once
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>)> {
    let deck = state
        .db
        .get_deck(auth.user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    let content = request.validate()?;
    let now = Utc::now();
    let initial = state.scheduler.initial_state(now);
    let card = state.db.create_card(deck.id, &content, &initial, now).await?;

    tracing::debug!(card_id = %card.id, deck_id = %deck.id, "created card");

    Ok((StatusCode::CREATED, Json(card.to_api_card())))
}

/// PUT /api/cards/:card_id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    let mut card = state
        .db
        .get_card(auth.user_id, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    request.apply(&mut card)?;
    let card = state.db.update_card_content(&card).await?;

    Ok(Json(card.to_api_card()))
}

/// DELETE /api/cards/:card_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_card(auth.user_id, card_id).await? {
        return Err(ApiError::NotFound("Card not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
