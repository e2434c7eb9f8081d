//! Rate API handlers.
//!
//! # Endpoints
//!
//! - `GET    /items`       – list all rate records
//! - `GET    /items/{id}`  – fetch one record
//! - `POST   /items`       – create a record
//! - `PATCH  /items/{id}`  – replace a record's rate
//! - `DELETE /items/{id}`  – delete a record
//! - `POST   /tasks/run`   – run one refresh cycle
//! - `GET    /ws/items`    – WebSocket change-event stream
//!
//! Every mutating endpoint announces a change event through the fan-out
//! after its store write succeeds; announcement failures never fail the
//! request.

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use ratewatch_core::entities::RateRecord;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::state::AppState;

mod create_item;
mod delete_item;
mod get_item;
mod list_items;
mod run_refresh;
mod update_item;
mod ws;

/// Build the rate API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(list_items::list_items).post(create_item::create_item),
        )
        .route(
            "/items/{id}",
            get(get_item::get_item)
                .patch(update_item::update_item)
                .delete(delete_item::delete_item),
        )
        .route("/tasks/run", post(run_refresh::run_refresh))
        .route("/ws/items", get(ws::items_ws))
}

/// API model of a rate record. Timestamps are unix seconds.
#[derive(Debug, Clone, Serialize)]
pub struct RateResponse {
    pub id: i64,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Convert a `RateRecord` (DB model) into a `RateResponse` (API model).
fn to_response(record: &RateRecord) -> RateResponse {
    RateResponse {
        id: record.id,
        base_currency: record.base_currency.clone(),
        target_currency: record.target_currency.clone(),
        rate: record.rate,
        created_at: record.created_at.assume_utc().unix_timestamp(),
        updated_at: record.updated_at.assume_utc().unix_timestamp(),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in rate API handlers.
#[derive(Debug)]
enum ApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// The requested record was not found.
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "rate API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "item not found").into_response(),
        }
    }
}
