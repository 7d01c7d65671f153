// Translation, language list, and phrasebook endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::translation as svc;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    /// Source language; omitted means auto-detect (English for the
    /// fallback dictionary).
    #[serde(default, alias = "from")]
    pub source_lang: Option<String>,
    #[serde(default, alias = "to")]
    pub target_lang: String,
}

pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::MissingParam("text"));
    }
    if req.target_lang.trim().is_empty() {
        return Err(ApiError::MissingParam("target_lang"));
    }

    let translation = state
        .services
        .translation
        .translate(&req.text, req.source_lang.as_deref(), &req.target_lang)
        .await;
    Ok(Json(json!({ "success": true, "translation": translation })))
}

pub async fn languages() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "languages": svc::languages() }))
}

#[derive(Debug, Deserialize)]
pub struct PhrasebookParams {
    pub lang: Option<String>,
}

pub async fn phrasebook(
    Query(params): Query<PhrasebookParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lang = params
        .lang
        .filter(|l| !l.trim().is_empty())
        .ok_or(ApiError::MissingParam("lang"))?;
    Ok(Json(json!({ "success": true, "phrases": svc::phrasebook(&lang) })))
}
