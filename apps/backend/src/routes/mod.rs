pub mod auth;
pub mod cards;
pub mod decks;
pub mod settings;
pub mod study;
pub mod users;
