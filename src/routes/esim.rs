// eSIM plan endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanParams {
    pub country: Option<String>,
}

pub async fn plans(
    State(state): State<AppState>,
    Query(params): Query<PlanParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let country = params
        .country
        .filter(|c| !c.trim().is_empty())
        .ok_or(ApiError::MissingParam("country"))?;

    let plans = state.services.esim.plans(&country).await;
    Ok(Json(json!({ "success": true, "plans": plans })))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    /// Comma-separated destination countries.
    pub countries: Option<String>,
    pub days: Option<u32>,
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let countries: Vec<String> = params
        .countries
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if countries.is_empty() {
        return Err(ApiError::MissingParam("countries"));
    }

    let plans = state
        .services
        .esim
        .recommendations(&countries, params.days.unwrap_or(7))
        .await;
    Ok(Json(json!({ "success": true, "plans": plans })))
}

pub async fn global(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "plans": state.services.esim.global() }))
}
