// Auth endpoints: register, login, profile, preferences.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.email.is_empty() {
        return Err(ApiError::MissingParam("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::MissingParam("password"));
    }

    let profile = auth::register(&state.db, &req.email, &req.password, &req.name)?;
    Ok(Json(json!({ "success": true, "user": profile })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.email.is_empty() {
        return Err(ApiError::MissingParam("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::MissingParam("password"));
    }

    let profile = auth::login(&state.db, &req.email, &req.password)?;
    Ok(Json(json!({ "success": true, "user": profile })))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = auth::profile(&state.db, &id)?;
    Ok(Json(json!({ "success": true, "user": profile })))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(preferences): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !preferences.is_object() {
        return Err(ApiError::BadRequest("preferences must be an object".into()));
    }
    auth::update_preferences(&state.db, &id, &preferences)?;
    Ok(Json(json!({ "success": true, "preferences": preferences })))
}
