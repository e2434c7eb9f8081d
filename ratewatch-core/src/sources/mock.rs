use super::{RateSnapshot, RateSource, SourceError};
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;

/// Maximum relative drift applied to each baseline rate.
const MAX_DRIFT: f64 = 0.05;

/// Baseline USD quotes the mock source perturbs.
const BASELINE: [(&str, f64); 16] = [
    ("EUR", 0.85),
    ("GBP", 0.73),
    ("JPY", 110.0),
    ("CNY", 7.2),
    ("RUB", 75.0),
    ("INR", 83.0),
    ("KRW", 1300.0),
    ("BRL", 5.0),
    ("CAD", 1.35),
    ("AUD", 1.50),
    ("CHF", 0.92),
    ("SGD", 1.35),
    ("HKD", 7.8),
    ("NZD", 1.65),
    ("MXN", 20.0),
    ("ZAR", 18.0),
];

/// Synthetic rate source for demonstration and testing: each baseline rate
/// is perturbed by a uniform ±5% and rounded to 4 decimal places. Never
/// touches the network and never fails.
#[derive(Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RateSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self) -> Result<RateSnapshot, SourceError> {
        let mut rng = rand::rng();
        let rates = BASELINE
            .iter()
            .filter_map(|(code, baseline)| {
                let drift: f64 = rng.random_range(-MAX_DRIFT..=MAX_DRIFT);
                Decimal::try_from(baseline * (1.0 + drift))
                    .ok()
                    .map(|rate| (code.to_string(), rate.round_dp(4)))
            })
            .collect();

        Ok(RateSnapshot {
            base_currency: "USD".to_string(),
            rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_snapshot_covers_every_baseline_code() {
        let snapshot = MockSource::new().fetch().await.unwrap();

        assert_eq!(snapshot.base_currency, "USD");
        assert_eq!(snapshot.rates.len(), BASELINE.len());
        for ((code, _), (generated_code, _)) in BASELINE.iter().zip(&snapshot.rates) {
            assert_eq!(code, generated_code);
        }
    }

    #[tokio::test]
    async fn mock_rates_stay_within_five_percent_of_baseline() {
        let snapshot = MockSource::new().fetch().await.unwrap();

        for ((_, baseline), (code, rate)) in BASELINE.iter().zip(&snapshot.rates) {
            let value: f64 = rate.to_string().parse().unwrap();
            let lower = baseline * (1.0 - MAX_DRIFT) - 1e-4;
            let upper = baseline * (1.0 + MAX_DRIFT) + 1e-4;
            assert!(
                value >= lower && value <= upper,
                "{code}: {value} outside [{lower}, {upper}]"
            );
            assert!(*rate > Decimal::ZERO);
            assert!(rate.scale() <= 4, "{code}: more than 4 decimal places");
        }
    }
}
