use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use ratewatch_core::entities::rate_records::GetRateById;
use ratewatch_core::framework::DatabaseProcessor;

use super::{ApiError, to_response};
use crate::state::AppState;

/// `GET /items/{id}` — fetch a single rate record.
pub(super) async fn get_item(
    state: State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetRateById { id })
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(to_response(&record)))
}
