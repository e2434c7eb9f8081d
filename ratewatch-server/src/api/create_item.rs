use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use ratewatch_core::entities::rate_records::InsertRate;
use ratewatch_core::events::{ChangeEvent, RateItem};
use ratewatch_core::framework::DatabaseProcessor;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{ApiError, to_response};
use crate::state::AppState;

/// Request body for `POST /items`.
#[derive(Debug, Deserialize)]
pub(super) struct CreateRateRequest {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

/// `POST /items` — create a rate record.
///
/// Announces a `created` event after the insert commits.
pub(super) async fn create_item(
    state: State<AppState>,
    Json(body): Json<CreateRateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(InsertRate {
            base_currency: body.base_currency,
            target_currency: body.target_currency,
            rate: body.rate,
        })
        .await
        .map_err(ApiError::Database)?;

    state
        .notifier
        .announce(&ChangeEvent::created(RateItem::from(&record)))
        .await;

    Ok((StatusCode::CREATED, Json(to_response(&record))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_currency_defaults_to_usd() {
        let body: CreateRateRequest =
            serde_json::from_str(r#"{"target_currency": "EUR", "rate": 0.9}"#).unwrap();
        assert_eq!(body.base_currency, "USD");
        assert_eq!(body.rate, Decimal::new(9, 1));
    }
}
