use crate::entities::RateRecord;
use crate::events::ChangeEvent;
use crate::notify::Notifier;
use crate::sources::{RateSnapshot, SourceChain};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// What reconciliation does with one fetched `(base, target)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairAction {
    /// No record for the pair yet.
    Create,
    /// The stored rate differs from the fetched one.
    Update { id: i64 },
    /// The stored rate already matches; no write.
    Unchanged,
}

fn classify_pair(existing: Option<&RateRecord>, fetched: Decimal) -> PairAction {
    match existing {
        None => PairAction::Create,
        Some(record) if record.rate != fetched => PairAction::Update { id: record.id },
        Some(_) => PairAction::Unchanged,
    }
}

/// Per-pair counters for one committed reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Fetch-and-reconcile unit shared by the periodic scheduler and the
/// manual `POST /tasks/run` trigger.
pub struct RefreshTask {
    pool: PgPool,
    chain: SourceChain,
    notifier: Notifier,
}

impl RefreshTask {
    pub fn new(pool: PgPool, chain: SourceChain, notifier: Notifier) -> Self {
        Self {
            pool,
            chain,
            notifier,
        }
    }

    /// Run one cycle: fetch a snapshot, reconcile it, announce the result.
    ///
    /// A failed fetch skips the cycle (no writes, no event). A failed
    /// commit rolls the whole cycle back and is logged; neither failure
    /// reaches the caller.
    pub async fn run_cycle(&self) {
        let Some(snapshot) = self.chain.fetch().await else {
            warn!("refresh cycle skipped: no snapshot available");
            return;
        };

        let base_currency = snapshot.base_currency.clone();
        let rates_count = snapshot.rates.len();

        match self.reconcile(&snapshot).await {
            Ok(outcome) => {
                info!(
                    base = %base_currency,
                    created = outcome.created,
                    updated = outcome.updated,
                    unchanged = outcome.unchanged,
                    "refresh cycle committed"
                );
                self.notifier
                    .announce(&ChangeEvent::refresh_completed(base_currency, rates_count))
                    .await;
            }
            Err(e) => {
                error!(error = %e, base = %base_currency, "refresh cycle rolled back");
            }
        }
    }

    /// Upsert the snapshot into the store, all pairs in one transaction.
    ///
    /// Pairs quoting the base against itself are skipped. Pairs absent from
    /// the snapshot are left untouched; reconciliation never deletes.
    async fn reconcile(&self, snapshot: &RateSnapshot) -> Result<CycleOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = CycleOutcome::default();

        for (target, rate) in &snapshot.rates {
            if *target == snapshot.base_currency {
                continue;
            }

            let existing =
                RateRecord::get_by_pair_tx(&mut tx, &snapshot.base_currency, target).await?;
            match classify_pair(existing.as_ref(), *rate) {
                PairAction::Create => {
                    RateRecord::insert_tx(&mut tx, &snapshot.base_currency, target, *rate).await?;
                    outcome.created += 1;
                }
                PairAction::Update { id } => {
                    RateRecord::update_rate_tx(&mut tx, id, *rate).await?;
                    outcome.updated += 1;
                }
                PairAction::Unchanged => {
                    outcome.unchanged += 1;
                }
            }
        }

        tx.commit().await?;
        Ok(outcome)
    }

    /// Run cycles on a fixed interval until the shutdown flag flips.
    ///
    /// Stopping interrupts a pending sleep immediately; a cycle already in
    /// flight finishes before the flag is observed at the top of the loop.
    /// Cycle failures never end the loop.
    pub async fn run_periodic(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!(interval_secs = interval.as_secs(), "refresh scheduler started");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("refresh scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn record(id: i64, rate: Decimal) -> RateRecord {
        RateRecord {
            id,
            base_currency: "USD".to_string(),
            target_currency: "EUR".to_string(),
            rate,
            created_at: datetime!(2026-01-01 00:00),
            updated_at: datetime!(2026-01-01 00:00),
        }
    }

    #[test]
    fn missing_pair_is_created() {
        assert_eq!(
            classify_pair(None, Decimal::new(90, 2)),
            PairAction::Create
        );
    }

    #[test]
    fn differing_rate_is_updated() {
        let existing = record(3, Decimal::new(90, 2));
        assert_eq!(
            classify_pair(Some(&existing), Decimal::new(95, 2)),
            PairAction::Update { id: 3 }
        );
    }

    #[test]
    fn equal_rate_is_left_alone() {
        let existing = record(3, Decimal::new(95, 2));
        assert_eq!(
            classify_pair(Some(&existing), Decimal::new(95, 2)),
            PairAction::Unchanged
        );
    }

    #[test]
    fn rate_equality_ignores_trailing_zeros() {
        // NUMERIC columns may round-trip with a different scale.
        let existing = record(3, Decimal::new(9000, 4));
        assert_eq!(
            classify_pair(Some(&existing), Decimal::new(90, 2)),
            PairAction::Unchanged
        );
    }
}
