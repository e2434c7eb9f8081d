//! Change events broadcast on every mutation of the rate store.
//!
//! The same JSON shape is published to the message bus and pushed to
//! WebSocket subscribers. Events carry the affected record's public fields
//! and the emission time, not the record's own mutation time.

use crate::entities::RateRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Public fields of a rate record as carried in change events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateItem {
    pub id: i64,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
}

impl From<&RateRecord> for RateItem {
    fn from(record: &RateRecord) -> Self {
        Self {
            id: record.id,
            base_currency: record.base_currency.clone(),
            target_currency: record.target_currency.clone(),
            rate: record.rate,
        }
    }
}

/// A rate change carried by [`ChangeEvent::Updated`]: both the old and the
/// new quote, so subscribers can diff without a read-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTransition {
    pub id: i64,
    pub base_currency: String,
    pub target_currency: String,
    pub old_rate: Decimal,
    pub new_rate: Decimal,
}

/// Event announced after every successful store mutation.
///
/// Serialized as an internally-tagged JSON object so subscribers can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"created","item":{...},"timestamp":1767225600}
/// {"type":"refresh_completed","base_currency":"USD","rates_count":16,"timestamp":1767225600}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A record was inserted, via the API or by reconciliation.
    Created { item: RateItem, timestamp: i64 },
    /// A record's rate was replaced.
    Updated { item: RateTransition, timestamp: i64 },
    /// A record was removed. Only the API deletes; reconciliation never does.
    Deleted { item: RateItem, timestamp: i64 },
    /// A refresh cycle committed its snapshot.
    RefreshCompleted {
        base_currency: String,
        rates_count: usize,
        timestamp: i64,
    },
}

impl ChangeEvent {
    pub fn created(item: RateItem) -> Self {
        Self::Created {
            item,
            timestamp: now_unix(),
        }
    }

    pub fn updated(item: RateTransition) -> Self {
        Self::Updated {
            item,
            timestamp: now_unix(),
        }
    }

    pub fn deleted(item: RateItem) -> Self {
        Self::Deleted {
            item,
            timestamp: now_unix(),
        }
    }

    pub fn refresh_completed(base_currency: String, rates_count: usize) -> Self {
        Self::RefreshCompleted {
            base_currency,
            rates_count,
            timestamp: now_unix(),
        }
    }
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn eur_item() -> RateItem {
        RateItem {
            id: 7,
            base_currency: "USD".to_string(),
            target_currency: "EUR".to_string(),
            rate: Decimal::new(90, 2),
        }
    }

    #[test]
    fn created_event_is_tagged_by_type() {
        let event = ChangeEvent::created(eur_item());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "created");
        assert_eq!(json["item"]["id"], 7);
        assert_eq!(json["item"]["base_currency"], "USD");
        assert_eq!(json["item"]["target_currency"], "EUR");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn updated_event_carries_old_and_new_rate() {
        let event = ChangeEvent::updated(RateTransition {
            id: 7,
            base_currency: "USD".to_string(),
            target_currency: "EUR".to_string(),
            old_rate: Decimal::new(90, 2),
            new_rate: Decimal::new(95, 2),
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "updated");
        assert_eq!(json["item"]["old_rate"], "0.90");
        assert_eq!(json["item"]["new_rate"], "0.95");
    }

    #[test]
    fn refresh_completed_event_shape() {
        let event = ChangeEvent::refresh_completed("USD".to_string(), 16);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "refresh_completed");
        assert_eq!(json["base_currency"], "USD");
        assert_eq!(json["rates_count"], 16);
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = ChangeEvent::deleted(eur_item());
        let json = serde_json::to_string(&event).unwrap();
        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
