// Flight search and airport lookup endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::flights::{self, FlightQuery};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct FlightParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    #[serde(default)]
    pub date: String,
    pub passengers: Option<u32>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<FlightParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let origin = params
        .origin
        .filter(|o| !o.trim().is_empty())
        .ok_or(ApiError::MissingParam("origin"))?;
    let destination = params
        .destination
        .filter(|d| !d.trim().is_empty())
        .ok_or(ApiError::MissingParam("destination"))?;

    let query = FlightQuery {
        origin,
        destination,
        date: params.date,
        passengers: params.passengers.unwrap_or(1),
    };
    let flights = state.services.flights.search(&query).await;
    Ok(Json(json!({ "success": true, "flights": flights })))
}

#[derive(Debug, Deserialize)]
pub struct AirportParams {
    pub query: Option<String>,
}

pub async fn airports(
    Query(params): Query<AirportParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or(ApiError::MissingParam("query"))?;
    let airports = flights::search_airports(&query);
    Ok(Json(json!({ "success": true, "airports": airports })))
}
