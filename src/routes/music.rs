// Music discovery endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

use super::AppState;

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or(ApiError::MissingParam("query"))?;

    let tracks = state
        .services
        .music
        .search(&query, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await;
    Ok(Json(json!({ "success": true, "tracks": tracks })))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub destination: Option<String>,
    pub limit: Option<usize>,
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let destination = params
        .destination
        .filter(|d| !d.trim().is_empty())
        .ok_or(ApiError::MissingParam("destination"))?;

    let tracks = state
        .services
        .music
        .recommendations(&destination, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await;
    Ok(Json(json!({ "success": true, "tracks": tracks })))
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tracks = state
        .services
        .music
        .popular(params.limit.unwrap_or(DEFAULT_LIMIT))
        .await;
    Ok(Json(json!({ "success": true, "tracks": tracks })))
}

pub async fn by_mood(
    State(state): State<AppState>,
    Path(mood): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tracks = state
        .services
        .music
        .by_mood(&mood, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await;
    Ok(Json(json!({ "success": true, "mood": mood, "tracks": tracks })))
}

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_id: String,
    /// Optional seed: when present the playlist is built from that
    /// destination's recommendations instead of the popular list.
    #[serde(default)]
    pub destination: Option<String>,
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Json(req): Json<PlaylistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::MissingParam("name"));
    }
    if req.user_id.trim().is_empty() {
        return Err(ApiError::MissingParam("user_id"));
    }

    let playlist = state
        .services
        .music
        .create_playlist(&req.name, &req.user_id, req.destination.as_deref())
        .await;
    Ok(Json(json!({ "success": true, "playlist": playlist })))
}
