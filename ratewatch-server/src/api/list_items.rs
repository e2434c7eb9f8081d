use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use ratewatch_core::entities::rate_records::GetAllRates;
use ratewatch_core::framework::DatabaseProcessor;

use super::{ApiError, to_response};
use crate::state::AppState;

/// `GET /items` — list every rate record.
pub(super) async fn list_items(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(GetAllRates)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(
        records.iter().map(to_response).collect::<Vec<_>>(),
    ))
}
