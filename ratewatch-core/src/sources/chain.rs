use super::{
    BinanceTickerSource, ExchangeHostSource, FiatApiSource, MockSource, RateSnapshot, RateSource,
    SourceMode, http_client,
};
use tracing::{info, warn};

/// Ordered fallback chain over interchangeable rate sources.
///
/// `fetch` tries each source in order and stops at the first success. A
/// source failure is logged and never propagated; when every source fails
/// the chain reports `None` and the caller skips its cycle.
pub struct SourceChain {
    sources: Vec<Box<dyn RateSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn RateSource>>) -> Self {
        Self { sources }
    }

    /// Build the chain for a configured mode: fiat gets the one fallback
    /// hop to the alternative endpoint, crypto and mock stand alone.
    pub fn for_mode(mode: SourceMode, fiat_api_url: &str) -> Self {
        let client = http_client();
        match mode {
            SourceMode::Fiat => Self::new(vec![
                Box::new(FiatApiSource::new(fiat_api_url, client.clone())),
                Box::new(ExchangeHostSource::new(client)),
            ]),
            SourceMode::Crypto => Self::new(vec![Box::new(BinanceTickerSource::new(client))]),
            SourceMode::Mock => Self::new(vec![Box::new(MockSource::new())]),
        }
    }

    pub async fn fetch(&self) -> Option<RateSnapshot> {
        for source in &self.sources {
            match source.fetch().await {
                Ok(snapshot) => {
                    info!(
                        source = source.name(),
                        base = %snapshot.base_currency,
                        rates = snapshot.rates.len(),
                        "rate snapshot fetched"
                    );
                    return Some(snapshot);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "rate source failed");
                }
            }
        }
        warn!("every rate source failed, no snapshot available");
        None
    }
}
