//! Long-running background work.
//!
//! The refresh task pulls a snapshot through the source chain, reconciles
//! it against the rate store in one transaction, and announces a
//! `refresh_completed` event through the notification fan-out.

pub mod refresh;

pub use refresh::{CycleOutcome, RefreshTask};
