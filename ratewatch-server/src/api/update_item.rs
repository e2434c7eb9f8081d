use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use ratewatch_core::entities::rate_records::{GetRateById, UpdateRateValue};
use ratewatch_core::events::{ChangeEvent, RateTransition};
use ratewatch_core::framework::DatabaseProcessor;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{ApiError, to_response};
use crate::state::AppState;

/// Request body for `PATCH /items/{id}`. Only the rate can change.
#[derive(Debug, Deserialize)]
pub(super) struct UpdateRateRequest {
    pub rate: Option<Decimal>,
}

/// `PATCH /items/{id}` — replace a record's rate.
///
/// A body without a rate leaves the record untouched and announces
/// nothing. Otherwise announces an `updated` event carrying both the old
/// and the new rate.
pub(super) async fn update_item(
    state: State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetRateById { id })
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let Some(new_rate) = body.rate else {
        return Ok(Json(to_response(&record)));
    };

    let old_rate = record.rate;
    let updated = processor
        .process(UpdateRateValue { id, new_rate })
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    state
        .notifier
        .announce(&ChangeEvent::updated(RateTransition {
            id: updated.id,
            base_currency: updated.base_currency.clone(),
            target_currency: updated.target_currency.clone(),
            old_rate,
            new_rate: updated.rate,
        }))
        .await;

    Ok(Json(to_response(&updated)))
}
