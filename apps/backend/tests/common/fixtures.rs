//! Test fixtures and helpers for driving the API.

use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use super::TestContext;

/// Request body for creating a deck.
pub fn deck_request(name: &str) -> Value {
    json!({ "name": name, "description": format!("{name} vocabulary") })
}

/// Request body for creating a card.
pub fn card_request(front: &str, back: &str) -> Value {
    json!({ "front": front, "back": back, "memo": "" })
}

/// Request body for submitting a review.
pub fn review_request(card_id: Uuid, rating: Value) -> Value {
    json!({ "card_id": card_id, "rating": rating })
}

/// Create a deck through the API and return its ID.
pub async fn create_deck(server: &TestServer, token: &str, name: &str) -> Uuid {
    let response = server
        .post("/api/decks")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .json(&deck_request(name))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Create a card through the API and return its ID.
pub async fn create_card(server: &TestServer, token: &str, deck_id: Uuid, front: &str) -> Uuid {
    let response = server
        .post(&format!("/api/decks/{deck_id}/cards"))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .json(&card_request(front, &format!("meaning of {front}")))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_str().unwrap().parse().unwrap()
}
