// Hotel search endpoints. GET takes query parameters, POST takes the
// same fields as a JSON body.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::hotels::HotelQuery;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct HotelParams {
    pub destination: Option<String>,
    #[serde(default)]
    pub check_in: String,
    #[serde(default)]
    pub check_out: String,
    pub guests: Option<u32>,
}

impl HotelParams {
    fn into_query(self) -> Result<HotelQuery, ApiError> {
        let destination = self
            .destination
            .filter(|d| !d.trim().is_empty())
            .ok_or(ApiError::MissingParam("destination"))?;
        Ok(HotelQuery {
            destination,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests.unwrap_or(2),
        })
    }
}

pub async fn search_get(
    State(state): State<AppState>,
    Query(params): Query<HotelParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    search(&state, params).await
}

pub async fn search_post(
    State(state): State<AppState>,
    Json(params): Json<HotelParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    search(&state, params).await
}

async fn search(
    state: &AppState,
    params: HotelParams,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params.into_query()?;
    let hotels = state.services.hotels.search(&query).await;
    Ok(Json(json!({ "success": true, "hotels": hotels })))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.services.hotels.get(&id).await {
        Some(hotel) => Ok(Json(json!({ "success": true, "hotel": hotel }))),
        None => Err(ApiError::NotFound(format!("hotel {id}"))),
    }
}
