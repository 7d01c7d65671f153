// Car rental search endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::cars::CarQuery;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CarParams {
    pub location: Option<String>,
    #[serde(default)]
    pub pick_up: String,
    #[serde(default)]
    pub drop_off: String,
}

impl CarParams {
    fn into_query(self) -> Result<CarQuery, ApiError> {
        let location = self
            .location
            .filter(|l| !l.trim().is_empty())
            .ok_or(ApiError::MissingParam("location"))?;
        Ok(CarQuery {
            location,
            pick_up: self.pick_up,
            drop_off: self.drop_off,
        })
    }
}

pub async fn search_get(
    State(state): State<AppState>,
    Query(params): Query<CarParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    search(&state, params).await
}

pub async fn search_post(
    State(state): State<AppState>,
    Json(params): Json<CarParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    search(&state, params).await
}

async fn search(
    state: &AppState,
    params: CarParams,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params.into_query()?;
    let cars = state.services.cars.search(&query).await;
    Ok(Json(json!({ "success": true, "cars": cars })))
}
