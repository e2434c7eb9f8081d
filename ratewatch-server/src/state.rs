//! Application state shared across all request handlers.

use ratewatch_core::notify::{ConnectionRegistry, Notifier};
use ratewatch_core::processors::RefreshTask;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
/// All four pieces are constructed once in `main` and injected here; there
/// is no module-level mutable state anywhere in the process.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Live WebSocket subscriber handles.
    pub registry: Arc<ConnectionRegistry>,
    /// Change-event fan-out (bus + WebSocket), shared with the scheduler.
    pub notifier: Notifier,
    /// Refresh unit backing both the scheduler loop and `POST /tasks/run`.
    pub refresh: Arc<RefreshTask>,
}
