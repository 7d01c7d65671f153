// Payment endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::services::payments::{self as svc, PaymentRequest};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = req.amount.ok_or(ApiError::MissingParam("amount"))?;
    if amount <= 0.0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }
    if req.currency.trim().is_empty() {
        return Err(ApiError::MissingParam("currency"));
    }

    let request = PaymentRequest {
        amount,
        currency: req.currency,
        description: req.description,
    };
    let intent = state.services.payments.create(&request).await?;
    Ok(Json(json!({ "success": true, "payment": intent })))
}

pub async fn currencies() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "currencies": svc::currencies() }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.services.payments.status(&id)? {
        Some(intent) => Ok(Json(json!({ "success": true, "payment": intent }))),
        None => Err(ApiError::NotFound(format!("payment {id}"))),
    }
}
