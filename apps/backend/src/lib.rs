pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use review_core::Scheduler;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scheduler: Arc<Scheduler>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state from a connected database and loaded configuration
    pub fn new(db: Database, config: Config) -> anyhow::Result<Self> {
        let scheduler = Scheduler::new(config.policy.clone())?;
        Ok(Self {
            db: Arc::new(db),
            scheduler: Arc::new(scheduler),
            config: Arc::new(config),
        })
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let addr = config.bind_addr();
    let state = AppState::new(db, config)?;
    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router. Everything except registration and the health check
/// requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Settings routes
        .route(
            "/api/settings",
            get(routes::settings::get).put(routes::settings::update),
        )
        // Deck routes
        .route(
            "/api/decks",
            get(routes::decks::list).post(routes::decks::create),
        )
        .route(
            "/api/decks/:deck_id",
            get(routes::decks::get)
                .put(routes::decks::update)
                .delete(routes::decks::delete),
        )
        // Card routes
        .route(
            "/api/decks/:deck_id/cards",
            get(routes::cards::list).post(routes::cards::create),
        )
        .route(
            "/api/cards/:card_id",
            put(routes::cards::update).delete(routes::cards::delete),
        )
        // Study routes
        .route("/api/study/:deck_id/session", get(routes::study::session))
        .route("/api/study/review", post(routes::study::review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
