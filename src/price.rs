//! USD quotes for displaying costs
//!
//! Quotes are decoration only: a failing source never fails a preparation.

use crate::error::{ErrorCode, MintError, Result};
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::HashMap;

const COINBASE_API: &str = "https://api.coinbase.com";

/// Supplies the USD price of one whole unit of a currency
pub trait UsdRateSource: Send + Sync {
    fn usd_rate<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<f64>>;
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    amount: String,
}

/// Spot prices from a Coinbase-style `/v2/prices/{SYMBOL}-USD/spot` endpoint
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINBASE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("mint-sdk/0.1.0")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| MintError::new(ErrorCode::NetworkError, "Failed to create HTTP client").with_original(e))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/v2/prices/{}-USD/spot", self.base_url, quote_symbol(symbol));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MintError::new(ErrorCode::NetworkError, "Failed to fetch price").with_original(e))?;

        let text = response
            .text()
            .await
            .map_err(|e| MintError::new(ErrorCode::NetworkError, "Failed to read response body").with_original(e))?;
        parse_spot(&text)
    }
}

impl UsdRateSource for HttpRateSource {
    fn usd_rate<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<f64>> {
        Box::pin(self.fetch(symbol))
    }
}

/// Fixed quotes, e.g. for stablecoins or tests
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: HashMap<String, f64>,
}

impl StaticRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, symbol: impl Into<String>, usd: f64) -> Self {
        self.rates.insert(symbol.into().to_uppercase(), usd);
        self
    }
}

impl UsdRateSource for StaticRateSource {
    fn usd_rate<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<f64>> {
        let rate = self.rates.get(&symbol.to_uppercase()).copied();
        Box::pin(async move {
            rate.ok_or_else(|| {
                MintError::new(ErrorCode::NetworkError, format!("No USD rate for {}", symbol))
            })
        })
    }
}

/// Wrapped tokens are quoted as their underlying asset
fn quote_symbol(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "WETH" => "ETH".to_string(),
        other => other.to_string(),
    }
}

fn parse_spot(text: &str) -> Result<f64> {
    let spot: SpotResponse = serde_json::from_str(text).map_err(|e| {
        MintError::new(
            ErrorCode::NetworkError,
            format!(
                "Failed to parse price response: {}",
                text.chars().take(200).collect::<String>()
            ),
        )
        .with_original(e)
    })?;
    spot.data.amount.parse().map_err(|_| {
        MintError::new(
            ErrorCode::NetworkError,
            format!("Invalid price amount: {}", spot.data.amount),
        )
    })
}
