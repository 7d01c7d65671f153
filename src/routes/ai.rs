// AI endpoints: itinerary generation and the travel chat.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::llm::TripRequest;

use super::AppState;

pub async fn generate_trip(
    State(state): State<AppState>,
    Json(req): Json<TripRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.destination.trim().is_empty() {
        return Err(ApiError::MissingParam("destination"));
    }
    if req.duration_days == 0 {
        return Err(ApiError::BadRequest("duration_days must be at least 1".into()));
    }

    let generated = state.llm.generate_trip(&req, state.trip_max_tokens).await;
    Ok(Json(json!({
        "success": true,
        "source": generated.source.as_str(),
        "trip": generated.plan,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Prior (role, text) turns, oldest first.
    #[serde(default)]
    pub history: Vec<(String, String)>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::MissingParam("message"));
    }

    let reply = state
        .llm
        .chat(&req.message, &req.history, state.chat_max_tokens)
        .await;
    Ok(Json(json!({ "success": true, "reply": reply })))
}
