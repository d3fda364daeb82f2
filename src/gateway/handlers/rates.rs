//! Exchange-rate query and administration handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use crate::rate::models::Rate;

/// List all rate rows, including superseded and future-dated ones
///
/// GET /api/v1/rates
pub async fn list_rates(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Rate>> {
    let rates = state.rates.list().await?;
    ok(rates)
}

/// List the row currently in force for each ordered currency pair
///
/// GET /api/v1/rates/effective
pub async fn list_effective_rates(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Rate>> {
    let rates = state.rates.list_effective(Utc::now()).await?;
    ok(rates)
}

#[derive(Debug, Deserialize)]
pub struct UpdateRateRequest {
    pub rate: Decimal,
}

/// Replace a rate value, making the row effective immediately
///
/// PUT /api/v1/rates/{rate_id}
pub async fn update_rate(
    State(state): State<Arc<AppState>>,
    Path(rate_id): Path<String>,
    Json(request): Json<UpdateRateRequest>,
) -> ApiResult<Rate> {
    let id = rate_id
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid rate id: {rate_id}")))?;
    let updated = state.rates.update(id, request.rate).await?;
    ok(updated)
}
