//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ApiError, Result};

// Re-export shared types from review-core
pub use review_core::{CardReviewState, Rating, SchedulerError, StudyCandidate};

// === Database Entity Types ===

/// Registered user, identified by an opaque bearer token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Per-user settings in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserSettings {
    pub user_id: Uuid,
    pub max_cards_per_session: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUserSettings {
    /// Settings for a user who never saved any
    pub fn default_for_user(user_id: Uuid, max_cards_per_session: u32) -> Self {
        Self {
            user_id,
            max_cards_per_session: max_cards_per_session as i32,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn to_api_settings(&self) -> UserSettings {
        UserSettings {
            max_cards_per_session: self.max_cards_per_session.max(0) as u32,
        }
    }
}

/// Deck owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deck {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Deck with card counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub card_count: i64,
    pub due_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card stored in PostgreSQL, review state embedded
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub memo: String,
    pub interval_days: f64,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCard {
    /// Extract the review-core state from the stored columns
    pub fn review_state(&self) -> CardReviewState {
        CardReviewState {
            interval: self.interval_days,
            ease_factor: self.ease_factor,
            next_review_date: self.next_review_at,
            review_count: self.review_count.max(0) as u32,
        }
    }

    /// Overwrite the stored review columns with a scheduler result
    pub fn set_review_state(&mut self, state: &CardReviewState) -> Result<()> {
        self.review_count = stored_review_count(state.review_count)?;
        self.interval_days = state.interval;
        self.ease_factor = state.ease_factor;
        self.next_review_at = state.next_review_date;
        Ok(())
    }

    pub fn to_study_candidate(&self) -> StudyCandidate<Uuid> {
        StudyCandidate {
            id: self.id,
            state: self.review_state(),
            created_at: self.created_at,
        }
    }

    /// Convert to API card type
    pub fn to_api_card(&self) -> Card {
        Card {
            id: self.id,
            deck_id: self.deck_id,
            front: self.front.clone(),
            back: self.back.clone(),
            memo: self.memo.clone(),
            review: self.review_state(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Convert a review count to the `INT` column type
pub fn stored_review_count(count: u32) -> Result<i32> {
    i32::try_from(count)
        .map_err(|_| ApiError::Internal(format!("review count {count} does not fit the cards table")))
}

/// Review record, kept as an audit trail of scheduler transitions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReview {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub reviewed_at: DateTime<Utc>,
    pub rating: String,
    /// Shortcut value 1-4 of `rating`
    pub rating_value: i16,
    pub interval_before: f64,
    pub interval_after: f64,
    pub ease_before: f64,
    pub ease_after: f64,
    pub next_review_before: DateTime<Utc>,
    pub next_review_after: DateTime<Utc>,
}

impl DbReview {
    pub fn new(
        card_id: Uuid,
        user_id: Uuid,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
        before: &CardReviewState,
        after: &CardReviewState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            user_id,
            reviewed_at,
            rating: rating.as_str().to_string(),
            rating_value: i16::from(rating.to_value()),
            interval_before: before.interval,
            interval_after: after.interval,
            ease_before: before.ease_factor,
            ease_after: after.ease_factor,
            next_review_before: before.next_review_date,
            next_review_after: after.next_review_date,
        }
    }
}

/// Outcome of a committed review
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub card: DbCard,
    pub previous: CardReviewState,
}

// === Validation ===

/// Trim a required text field, rejecting blank input
fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

// Settings types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub max_cards_per_session: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub max_cards_per_session: Option<u32>,
}

// Deck types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateDeckRequest {
    /// Returns the trimmed name and description
    pub fn validate(&self) -> Result<(String, String)> {
        let name = required(&self.name, "name")?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        Ok((name, description))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDeckRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateDeckRequest {
    /// Apply the provided fields to `deck`
    pub fn apply(&self, deck: &mut Deck) -> Result<()> {
        if let Some(name) = &self.name {
            deck.name = required(name, "name")?;
        }
        if let Some(description) = &self.description {
            deck.description = description.trim().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

// Card types

/// Card as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub memo: String,
    pub review: CardReviewState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub front: String,
    pub back: String,
    pub memo: Option<String>,
}

/// Validated card content
#[derive(Debug, Clone, PartialEq)]
pub struct CardContent {
    pub front: String,
    pub back: String,
    pub memo: String,
}

impl CreateCardRequest {
    pub fn validate(&self) -> Result<CardContent> {
        Ok(CardContent {
            front: required(&self.front, "front")?,
            back: required(&self.back, "back")?,
            memo: self.memo.as_deref().map(str::trim).unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub front: Option<String>,
    pub back: Option<String>,
    pub memo: Option<String>,
}

impl UpdateCardRequest {
    /// Apply content edits. Review state is left alone.
    pub fn apply(&self, card: &mut DbCard) -> Result<()> {
        if let Some(front) = &self.front {
            card.front = required(front, "front")?;
        }
        if let Some(back) = &self.back {
            card.back = required(back, "back")?;
        }
        if let Some(memo) = &self.memo {
            card.memo = memo.trim().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardListResponse {
    pub cards: Vec<Card>,
}

// Study types
#[derive(Debug, Serialize, Deserialize)]
pub struct StudySessionQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudySessionResponse {
    pub deck_id: Uuid,
    pub cards: Vec<Card>,
    pub due_count: usize,
}

/// Rating as sent by clients: a name (`"good"`) or a 1-4 shortcut value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Value(i64),
    Name(String),
}

impl RatingInput {
    pub fn parse(&self) -> std::result::Result<Rating, SchedulerError> {
        match self {
            RatingInput::Value(value) => u8::try_from(*value)
                .map_err(|_| SchedulerError::InvalidRating(value.to_string()))
                .and_then(Rating::from_value),
            RatingInput::Name(name) => name.parse(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub card_id: Uuid,
    pub rating: RatingInput,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub card_id: Uuid,
    pub rating: Rating,
    pub previous_state: CardReviewState,
    pub next_state: CardReviewState,
}
