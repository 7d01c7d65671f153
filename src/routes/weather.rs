// Weather forecast endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
    pub days: Option<u32>,
}

pub async fn forecast(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let city = params
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or(ApiError::MissingParam("city"))?;

    let forecast = state
        .services
        .weather
        .forecast(&city, params.days.unwrap_or(5))
        .await;
    Ok(Json(json!({ "success": true, "forecast": forecast })))
}
