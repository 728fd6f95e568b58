//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating and adjusting test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use flashdeck_backend::config::Config;
use flashdeck_backend::db::Database;
use flashdeck_backend::models::User;
use flashdeck_backend::{build_router, AppState};

/// Test context containing database connection and test router.
///
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            _ => None,
        })
        .expect("Failed to build test config");

        let db = Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db, config).expect("Failed to build app state");
        let db = state.db.clone();
        let app = build_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self, name: Option<&str>) -> (Uuid, String) {
        let user = self
            .db
            .create_user(name)
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Get user by token.
    pub async fn get_user_by_token(&self, token: &str) -> Option<User> {
        self.db.get_user_by_token(token).await.ok().flatten()
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Overwrite a card's review schedule directly.
    pub async fn set_card_schedule(
        &self,
        card_id: Uuid,
        interval_days: f64,
        ease_factor: f64,
        next_review_at: DateTime<Utc>,
    ) {
        sqlx::query(
            "UPDATE cards SET interval_days = $2, ease_factor = $3, next_review_at = $4 WHERE id = $1",
        )
        .bind(card_id)
        .bind(interval_days)
        .bind(ease_factor)
        .bind(next_review_at)
        .execute(self.db.pool())
        .await
        .expect("Failed to update card schedule");
    }

    /// Overwrite a card's creation time.
    pub async fn set_card_created_at(&self, card_id: Uuid, created_at: DateTime<Utc>) {
        sqlx::query("UPDATE cards SET created_at = $2 WHERE id = $1")
            .bind(card_id)
            .bind(created_at)
            .execute(self.db.pool())
            .await
            .expect("Failed to update card creation time");
    }

    /// Clean up test data for a user.
    ///
    /// Decks, cards, reviews and settings cascade from the user row.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
