//! Pluggable rate sources and the ordered fallback chain over them.
//!
//! Each strategy yields a [`RateSnapshot`] for one base currency. Network
//! and parse failures are never fatal: [`SourceChain::fetch`] tries each
//! strategy in order and reports `None` when all of them fail.

pub mod chain;
pub mod crypto;
pub mod fiat;
pub mod mock;

pub use chain::SourceChain;
pub use crypto::BinanceTickerSource;
pub use fiat::{ExchangeHostSource, FiatApiSource};
pub use mock::MockSource;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// One base currency and its quotes, as pulled from a single source.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub base_currency: String,
    pub rates: Vec<(String, Decimal)>,
}

/// Errors raised by a single source strategy. These are logged by the
/// chain and never propagated past it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("upstream reported failure")]
    UpstreamFailure,

    #[error("empty snapshot")]
    EmptySnapshot,
}

/// A single interchangeable rate-source strategy.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<RateSnapshot, SourceError>;
}

/// Which strategy chain the refresh scheduler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Live fiat-rate API with a fixed alternative endpoint as fallback.
    #[default]
    Fiat,
    /// Cryptocurrency ticker quoted against a stablecoin.
    Crypto,
    /// Synthetic rates, no network dependency.
    Mock,
}

/// Shared HTTP client for the network-backed sources.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
