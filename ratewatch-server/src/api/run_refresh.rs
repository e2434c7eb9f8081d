use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct RunRefreshResponse {
    message: &'static str,
    timestamp: i64,
}

/// `POST /tasks/run` — run one refresh cycle inline.
///
/// Shares the refresh unit with the periodic scheduler, so a manual run
/// behaves exactly like a scheduled one (including the cycle-skip and
/// rollback rules). Always answers 200; cycle failures are logged, not
/// surfaced.
pub(super) async fn run_refresh(state: State<AppState>) -> impl IntoResponse {
    state.refresh.run_cycle().await;

    Json(RunRefreshResponse {
        message: "refresh cycle completed",
        timestamp: time::OffsetDateTime::now_utc().unix_timestamp(),
    })
}
