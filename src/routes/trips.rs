// Saved trip CRUD endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::models::NewTrip;

use super::AppState;

pub async fn save(
    State(state): State<AppState>,
    Json(new): Json<NewTrip>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if new.user_id.trim().is_empty() {
        return Err(ApiError::MissingParam("user_id"));
    }
    if new.destination.trim().is_empty() {
        return Err(ApiError::MissingParam("destination"));
    }

    let trip = state.db.save_trip(&new)?;
    Ok(Json(json!({ "success": true, "trip": trip })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query.user_id.ok_or(ApiError::MissingParam("user_id"))?;
    let trips = state.db.list_trips(&user_id)?;
    Ok(Json(json!({ "success": true, "trips": trips })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.db.get_trip(&id)? {
        Some(trip) => Ok(Json(json!({ "success": true, "trip": trip }))),
        None => Err(ApiError::NotFound(format!("trip {id}"))),
    }
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.db.toggle_favorite(&id)? {
        Some(favorite) => Ok(Json(json!({ "success": true, "favorite": favorite }))),
        None => Err(ApiError::NotFound(format!("trip {id}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

pub async fn set_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TagsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.db.set_tags(&id, &req.tags)? {
        Ok(Json(json!({ "success": true, "tags": req.tags })))
    } else {
        Err(ApiError::NotFound(format!("trip {id}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: String,
}

pub async fn set_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.db.set_notes(&id, &req.notes)? {
        Ok(Json(json!({ "success": true, "notes": req.notes })))
    } else {
        Err(ApiError::NotFound(format!("trip {id}")))
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.db.delete_trip(&id)? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::NotFound(format!("trip {id}")))
    }
}
