use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use kanau::processor::Processor;
use ratewatch_core::entities::rate_records::{DeleteRateById, GetRateById};
use ratewatch_core::events::{ChangeEvent, RateItem};
use ratewatch_core::framework::DatabaseProcessor;

use super::ApiError;
use crate::state::AppState;

/// `DELETE /items/{id}` — remove a rate record.
///
/// The record's fields are captured before the delete so the `deleted`
/// event can carry them.
pub(super) async fn delete_item(
    state: State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetRateById { id })
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    processor
        .process(DeleteRateById { id })
        .await
        .map_err(ApiError::Database)?;

    state
        .notifier
        .announce(&ChangeEvent::deleted(RateItem::from(&record)))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
