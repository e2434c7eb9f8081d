use super::{RateSnapshot, RateSource, SourceError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

const USER_AGENT_VALUE: &str = concat!("ratewatch/", env!("CARGO_PKG_VERSION"));

/// Fixed alternative endpoint used when the primary fiat API fails.
const EXCHANGE_HOST_URL: &str = "https://api.exchangerate.host/latest?base=USD";

fn default_base() -> String {
    "USD".to_string()
}

/// Primary fiat endpoint, `{base, rates}` schema.
#[derive(Debug, Deserialize)]
struct FiatRatesResponse {
    #[serde(default = "default_base")]
    base: String,
    #[serde(default)]
    rates: BTreeMap<String, Decimal>,
}

/// Primary fiat-rate API. The endpoint URL comes from configuration.
pub struct FiatApiSource {
    url: String,
    client: reqwest::Client,
}

impl FiatApiSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl RateSource for FiatApiSource {
    fn name(&self) -> &'static str {
        "fiat-api"
    }

    async fn fetch(&self) -> Result<RateSnapshot, SourceError> {
        tracing::debug!(url = %self.url, "fetching fiat rates");
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body: FiatRatesResponse = response.json().await?;
        if body.rates.is_empty() {
            return Err(SourceError::EmptySnapshot);
        }

        Ok(RateSnapshot {
            base_currency: body.base,
            rates: body.rates.into_iter().collect(),
        })
    }
}

/// Alternative endpoint schema: success flag plus `{base, rates}`.
#[derive(Debug, Deserialize)]
struct ExchangeHostResponse {
    #[serde(default)]
    success: bool,
    #[serde(default = "default_base")]
    base: String,
    #[serde(default)]
    rates: BTreeMap<String, Decimal>,
}

/// Fallback fiat source (exchangerate.host). Tried only after the primary
/// endpoint fails; there is no further fallback after this one.
pub struct ExchangeHostSource {
    url: String,
    client: reqwest::Client,
}

impl ExchangeHostSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(EXCHANGE_HOST_URL, client)
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
impl RateSource for ExchangeHostSource {
    fn name(&self) -> &'static str {
        "exchangerate-host"
    }

    async fn fetch(&self) -> Result<RateSnapshot, SourceError> {
        tracing::debug!(url = %self.url, "fetching alternative fiat rates");
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body: ExchangeHostResponse = response.json().await?;
        if !body.success {
            return Err(SourceError::UpstreamFailure);
        }
        if body.rates.is_empty() {
            return Err(SourceError::EmptySnapshot);
        }

        Ok(RateSnapshot {
            base_currency: body.base,
            rates: body.rates.into_iter().collect(),
        })
    }
}
