// HTTP API surface.
//
// Handlers stay thin: unpack the request, call the store or a service
// wrapper, and wrap the result in the `{ "success": true, ... }`
// envelope. All error mapping lives in `ApiError`.

pub mod ai;
pub mod auth;
pub mod cars;
pub mod esim;
pub mod events;
pub mod flights;
pub mod hotels;
pub mod music;
pub mod payments;
pub mod translation;
pub mod trips;
pub mod weather;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::config::Config;
use crate::db::Database;
use crate::llm::client::LlmClient;
use crate::services::Services;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub llm: Arc<LlmClient>,
    pub services: Arc<Services>,
    pub trip_max_tokens: u32,
    pub chat_max_tokens: u32,
}

impl AppState {
    pub fn new(config: &Config, db: Arc<Database>) -> Self {
        let services = Arc::new(Services::from_config(config, db.clone()));
        let llm = Arc::new(LlmClient::from_config(config));
        AppState {
            db,
            llm,
            services,
            trip_max_tokens: config.llm.trip_max_tokens,
            chat_max_tokens: config.llm.chat_max_tokens,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// The full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // AI itinerary generation and chat
        .route("/api/trips/generate", post(ai::generate_trip))
        .route("/api/chat", post(ai::chat))
        // Auth and profiles
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/users/:id", get(auth::profile))
        .route("/api/auth/users/:id/preferences", put(auth::update_preferences))
        // Saved trips
        .route("/api/trips", post(trips::save).get(trips::list))
        .route("/api/trips/:id", get(trips::get).delete(trips::remove))
        .route("/api/trips/:id/favorite", post(trips::toggle_favorite))
        .route("/api/trips/:id/tags", put(trips::set_tags))
        .route("/api/trips/:id/notes", put(trips::set_notes))
        // Travel services
        .route("/api/hotels", get(hotels::search_get).post(hotels::search_post))
        .route("/api/hotels/:id", get(hotels::get_one))
        .route("/api/cars", get(cars::search_get).post(cars::search_post))
        .route("/api/flights/search", get(flights::search))
        .route("/api/flights/airports", get(flights::airports))
        .route("/api/events", get(events::search))
        .route("/api/weather", get(weather::forecast))
        // Translation
        .route("/api/translate", post(translation::translate))
        .route("/api/translate/languages", get(translation::languages))
        .route("/api/translate/phrasebook", get(translation::phrasebook))
        // Music
        .route("/api/music/search", get(music::search))
        .route("/api/music/recommendations", get(music::recommendations))
        .route("/api/music/popular", get(music::popular))
        .route("/api/music/mood/:mood", get(music::by_mood))
        .route("/api/music/playlists", post(music::create_playlist))
        // eSIM
        .route("/api/esim/plans", get(esim::plans))
        .route("/api/esim/recommendations", get(esim::recommendations))
        .route("/api/esim/global", get(esim::global))
        // Payments
        .route("/api/payments", post(payments::create))
        .route("/api/payments/currencies", get(payments::currencies))
        .route("/api/payments/:id", get(payments::status))
        .with_state(state)
}
