//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

const CARD_COLUMNS: &str = "c.id, c.deck_id, c.front, c.back, c.memo, c.interval_days, \
     c.ease_factor, c.next_review_at, c.review_count, c.created_at, c.updated_at";

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, name: Option<&str>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, token, name)
            VALUES ($1, $2, $3)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Settings Repository ===

    /// Get settings for a user, falling back to the server default
    pub async fn get_settings(&self, user_id: Uuid, default_session_size: u32) -> Result<DbUserSettings> {
        let settings = sqlx::query_as::<_, DbUserSettings>(
            r#"
            SELECT user_id, max_cards_per_session, created_at, updated_at
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or_else(|| DbUserSettings::default_for_user(user_id, default_session_size));

        Ok(settings)
    }

    /// Upsert user settings
    pub async fn upsert_settings(&self, settings: &DbUserSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, max_cards_per_session)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                max_cards_per_session = EXCLUDED.max_cards_per_session,
                updated_at = NOW()
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.max_cards_per_session)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Deck Repository ===

    /// Get all decks for a user with total and due card counts
    pub async fn list_decks(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DeckSummary>(
            r#"
            SELECT
                d.id,
                d.name,
                d.description,
                COUNT(c.id) as card_count,
                COUNT(CASE WHEN c.next_review_at <= $2 THEN 1 END) as due_count,
                d.created_at,
                d.updated_at
            FROM decks d
            LEFT JOIN cards c ON c.deck_id = d.id
            WHERE d.user_id = $1
            GROUP BY d.id
            ORDER BY d.created_at DESC, d.id
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Create a deck
    pub async fn create_deck(&self, user_id: Uuid, name: &str, description: &str) -> Result<Deck> {
        let deck = sqlx::query_as::<_, Deck>(
            r#"
            INSERT INTO decks (id, user_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Get a deck owned by the user
    pub async fn get_deck(&self, user_id: Uuid, deck_id: Uuid) -> Result<Option<Deck>> {
        let deck = sqlx::query_as::<_, Deck>(
            r#"
            SELECT id, user_id, name, description, created_at, updated_at
            FROM decks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Save deck name and description
    pub async fn update_deck(&self, deck: &Deck) -> Result<Deck> {
        let deck = sqlx::query_as::<_, Deck>(
            r#"
            UPDATE decks
            SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(deck.id)
        .bind(deck.user_id)
        .bind(&deck.name)
        .bind(&deck.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Delete a deck; its cards and reviews go with it
    pub async fn delete_deck(&self, user_id: Uuid, deck_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM decks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Card Repository ===

    /// Get all cards in a deck, newest first
    pub async fn list_cards(&self, deck_id: Uuid) -> Result<Vec<DbCard>> {
        let cards = sqlx::query_as::<_, DbCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards c
            WHERE c.deck_id = $1
            ORDER BY c.created_at DESC, c.id
            "#
        ))
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Insert a card with its initial review state
    pub async fn create_card(
        &self,
        deck_id: Uuid,
        content: &CardContent,
        state: &CardReviewState,
        created_at: DateTime<Utc>,
    ) -> Result<DbCard> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            INSERT INTO cards (id, deck_id, front, back, memo, interval_days, ease_factor,
                               next_review_at, review_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id, deck_id, front, back, memo, interval_days, ease_factor,
                      next_review_at, review_count, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(deck_id)
        .bind(&content.front)
        .bind(&content.back)
        .bind(&content.memo)
        .bind(state.interval)
        .bind(state.ease_factor)
        .bind(state.next_review_date)
        .bind(stored_review_count(state.review_count)?)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Get a card if it belongs to one of the user's decks
    pub async fn get_card(&self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>> {
        let card = sqlx::query_as::<_, DbCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards c
            JOIN decks d ON d.id = c.deck_id
            WHERE c.id = $1 AND d.user_id = $2
            "#
        ))
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Save card content. Review columns are only written by `record_review`.
    pub async fn update_card_content(&self, card: &DbCard) -> Result<DbCard> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            UPDATE cards
            SET front = $2, back = $3, memo = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, deck_id, front, back, memo, interval_days, ease_factor,
                      next_review_at, review_count, created_at, updated_at
            "#,
        )
        .bind(card.id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(&card.memo)
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Delete a card if it belongs to the user
    pub async fn delete_card(&self, user_id: Uuid, card_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM cards c
            USING decks d
            WHERE c.id = $1 AND c.deck_id = d.id AND d.user_id = $2
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Review Repository ===

    /// Apply a review to a card inside one transaction.
    ///
    /// The card row is locked while `schedule` computes the next state, so
    /// concurrent reviews of the same card are serialized. Returns `None`
    /// when the card does not exist or is not the user's.
    pub async fn record_review<F>(
        &self,
        user_id: Uuid,
        card_id: Uuid,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
        schedule: F,
    ) -> Result<Option<ReviewOutcome>>
    where
        F: FnOnce(&CardReviewState) -> Result<CardReviewState>,
    {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query_as::<_, DbCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards c
            JOIN decks d ON d.id = c.deck_id
            WHERE c.id = $1 AND d.user_id = $2
            FOR UPDATE OF c
            "#
        ))
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut card) = card else {
            return Ok(None);
        };

        let previous = card.review_state();
        let next = schedule(&previous)?;
        card.set_review_state(&next)?;
        card.updated_at = reviewed_at;

        sqlx::query(
            r#"
            UPDATE cards
            SET interval_days = $2, ease_factor = $3, next_review_at = $4,
                review_count = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(card.id)
        .bind(card.interval_days)
        .bind(card.ease_factor)
        .bind(card.next_review_at)
        .bind(card.review_count)
        .bind(card.updated_at)
        .execute(&mut *tx)
        .await?;

        let review = DbReview::new(card.id, user_id, rating, reviewed_at, &previous, &next);
        sqlx::query(
            r#"
            INSERT INTO reviews (id, card_id, user_id, reviewed_at, rating, rating_value,
                                 interval_before, interval_after, ease_before, ease_after,
                                 next_review_before, next_review_after)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(review.id)
        .bind(review.card_id)
        .bind(review.user_id)
        .bind(review.reviewed_at)
        .bind(&review.rating)
        .bind(review.rating_value)
        .bind(review.interval_before)
        .bind(review.interval_after)
        .bind(review.ease_before)
        .bind(review.ease_after)
        .bind(review.next_review_before)
        .bind(review.next_review_after)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(ReviewOutcome { card, previous }))
    }

    /// Get review records for a card, oldest first
    pub async fn get_reviews_for_card(&self, card_id: Uuid) -> Result<Vec<DbReview>> {
        let reviews = sqlx::query_as::<_, DbReview>(
            r#"
            SELECT id, card_id, user_id, reviewed_at, rating, rating_value,
                   interval_before, interval_after, ease_before, ease_after,
                   next_review_before, next_review_after
            FROM reviews
            WHERE card_id = $1
            ORDER BY reviewed_at
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
