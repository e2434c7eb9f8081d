use super::{RateSnapshot, RateSource, SourceError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

const TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/price";

/// All crypto quotes are taken against this stablecoin, which becomes the
/// snapshot's base currency.
const QUOTE_ASSET: &str = "USDT";

/// Trading pairs kept from the full ticker listing.
const ALLOWED_SYMBOLS: [&str; 15] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "ADAUSDT", "XRPUSDT", "DOTUSDT", "DOGEUSDT",
    "AVAXUSDT", "MATICUSDT", "LINKUSDT", "UNIUSDT", "LTCUSDT", "ATOMUSDT", "ETCUSDT",
];

/// One entry of the ticker listing. Binance quotes prices as strings.
#[derive(Debug, Clone, Deserialize)]
struct TickerPrice {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    price: Decimal,
}

/// Keep allow-listed pairs with positive prices, keyed by the asset name
/// with the quote suffix stripped.
fn filter_tickers(tickers: Vec<TickerPrice>) -> Vec<(String, Decimal)> {
    tickers
        .into_iter()
        .filter(|ticker| ALLOWED_SYMBOLS.contains(&ticker.symbol.as_str()))
        .filter(|ticker| ticker.price > Decimal::ZERO)
        .filter_map(|ticker| {
            ticker
                .symbol
                .strip_suffix(QUOTE_ASSET)
                .map(|asset| (asset.to_string(), ticker.price))
        })
        .collect()
}

/// Cryptocurrency ticker source. Queries the full price listing and keeps
/// a fixed allow-list of pairs quoted against [`QUOTE_ASSET`].
pub struct BinanceTickerSource {
    url: String,
    client: reqwest::Client,
}

impl BinanceTickerSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(TICKER_URL, client)
    }

    /// Point the source at a different endpoint. Used by tests.
    pub fn with_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl RateSource for BinanceTickerSource {
    fn name(&self) -> &'static str {
        "binance-ticker"
    }

    async fn fetch(&self) -> Result<RateSnapshot, SourceError> {
        tracing::debug!(pairs = ALLOWED_SYMBOLS.len(), "fetching crypto ticker prices");
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let tickers: Vec<TickerPrice> = response.json().await?;
        let rates = filter_tickers(tickers);
        if rates.is_empty() {
            return Err(SourceError::EmptySnapshot);
        }

        Ok(RateSnapshot {
            base_currency: QUOTE_ASSET.to_string(),
            rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, price: &str) -> TickerPrice {
        TickerPrice {
            symbol: symbol.to_string(),
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn filter_keeps_only_allow_listed_pairs() {
        let rates = filter_tickers(vec![
            ticker("BTCUSDT", "43000.5"),
            ticker("SHIBUSDT", "0.00001"),
            ticker("ETHBTC", "0.05"),
            ticker("ETHUSDT", "2500"),
        ]);

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].0, "BTC");
        assert_eq!(rates[1], ("ETH".to_string(), Decimal::new(2500, 0)));
    }

    #[test]
    fn filter_discards_non_positive_prices() {
        let rates = filter_tickers(vec![
            ticker("BTCUSDT", "0"),
            ticker("ETHUSDT", "-1"),
            ticker("SOLUSDT", "150.25"),
        ]);

        assert_eq!(rates, vec![("SOL".to_string(), Decimal::new(15025, 2))]);
    }

    #[test]
    fn binance_prices_deserialize_from_strings() {
        let listing: Vec<TickerPrice> =
            serde_json::from_str(r#"[{"symbol":"BTCUSDT","price":"43000.12345678"}]"#).unwrap();
        assert_eq!(listing[0].price.to_string(), "43000.12345678");
    }
}
