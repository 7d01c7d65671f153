// Local events endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct EventParams {
    pub city: Option<String>,
    pub keyword: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let city = params
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or(ApiError::MissingParam("city"))?;

    let events = state
        .services
        .events
        .search(&city, params.keyword.as_deref())
        .await;
    Ok(Json(json!({ "success": true, "events": events })))
}
