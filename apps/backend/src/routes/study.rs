//! Study endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use review_core::select_study_cards;
use uuid::Uuid;

use crate::config::validate_session_size;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/study/:deck_id/session
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
    Query(query): Query<StudySessionQuery>,
) -> Result<Json<StudySessionResponse>> {
    let deck = state
        .db
        .get_deck(auth.user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

    let limit = match query.limit {
        Some(limit) => limit,
        None => {
            state
                .db
                .get_settings(auth.user_id, state.config.max_cards_per_session)
                .await?
                .to_api_settings()
                .max_cards_per_session
        }
    };
    let limit = validate_session_size(limit)
        .map_err(|reason| ApiError::BadRequest(format!("limit {reason}")))?;

    let cards = state.db.list_cards(deck.id).await?;
    let candidates: Vec<_> = cards.iter().map(DbCard::to_study_candidate).collect();

    let now = Utc::now();
    let order = select_study_cards(&candidates, limit as usize, now);

    let mut by_id: HashMap<Uuid, DbCard> = cards.into_iter().map(|c| (c.id, c)).collect();
    let selected: Vec<Card> = order
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|c| c.to_api_card())
        .collect();
    let due_count = selected.iter().filter(|c| c.review.is_due(now)).count();

    tracing::debug!(
        deck_id = %deck.id,
        selected = selected.len(),
        due_count,
        "built study session"
    );

    Ok(Json(StudySessionResponse {
        deck_id: deck.id,
        cards: selected,
        due_count,
    }))
}

/// POST /api/study/review
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let rating = payload.rating.parse()?;
    let now = Utc::now();
    let scheduler = state.scheduler.clone();

    let outcome = state
        .db
        .record_review(auth.user_id, payload.card_id, rating, now, |current| {
            scheduler.schedule(current, rating, now).map_err(ApiError::from)
        })
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let next_state = outcome.card.review_state();

    tracing::info!(
        card_id = %payload.card_id,
        %rating,
        interval = next_state.interval,
        ease_factor = next_state.ease_factor,
        next_review = %next_state.next_review_date,
        "recorded review"
    );

    Ok(Json(SubmitReviewResponse {
        card_id: payload.card_id,
        rating,
        previous_state: outcome.previous,
        next_state,
    }))
}
