//! Gold and silver spot prices in USD, with fixed fallback constants.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::rate::{MetalPrices, MetalsSource};

fn fallback_prices() -> MetalPrices {
    MetalPrices {
        xau_usd: Decimal::from(2400),
        xag_usd: Decimal::from(30),
    }
}

pub struct GoldApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct MetalPriceDto {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

impl GoldApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("kursy/0.1").build()?;
        Ok(GoldApiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn try_fetch(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/api/{}/USD", self.base_url, symbol);
        debug!("Requesting metal price from {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for metal {}",
                response.status(),
                symbol
            ));
        }

        let dto = response.json::<MetalPriceDto>().await?;
        if let Some(error) = dto.error {
            return Err(anyhow!("Metal source error for {}: {}", symbol, error));
        }
        dto.price
            .and_then(Decimal::from_f64)
            .ok_or_else(|| anyhow!("No price in response for metal {}", symbol))
    }

    async fn fetch_or_fallback(&self, symbol: &str, fallback: Decimal) -> Decimal {
        match self.try_fetch(symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!("Using fallback price for {symbol}: {e}");
                fallback
            }
        }
    }
}

#[async_trait]
impl MetalsSource for GoldApiProvider {
    /// Best effort: each symbol independently falls back to a hardcoded
    /// constant; an empty API key skips the network entirely.
    #[instrument(name = "MetalsFetch", skip(self))]
    async fn fetch_usd_prices(&self) -> MetalPrices {
        let fallback = fallback_prices();
        if self.api_key.is_empty() {
            debug!("No metals API key configured, using fallback prices");
            return fallback;
        }

        let (xau_usd, xag_usd) = tokio::join!(
            self.fetch_or_fallback("XAU", fallback.xau_usd),
            self.fetch_or_fallback("XAG", fallback.xag_usd)
        );
        MetalPrices { xau_usd, xag_usd }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_empty_api_key_uses_fallbacks() {
        let provider = GoldApiProvider::new("http://localhost:1", "").unwrap();
        let prices = provider.fetch_usd_prices().await;
        assert_eq!(prices.xau_usd, Decimal::from(2400));
        assert_eq!(prices.xag_usd, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/XAU/USD"))
            .and(header("x-access-token", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"price": 2501.5}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/XAG/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"price": 31.25}"#))
            .mount(&server)
            .await;

        let provider = GoldApiProvider::new(&server.uri(), "test-key").unwrap();
        let prices = provider.fetch_usd_prices().await;
        assert_eq!(prices.xau_usd, "2501.5".parse().unwrap());
        assert_eq!(prices.xag_usd, "31.25".parse().unwrap());
    }

    #[tokio::test]
    async fn test_error_body_falls_back_per_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/XAU/USD"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"error": "quota exceeded"}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/XAG/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"price": 31.25}"#))
            .mount(&server)
            .await;

        let provider = GoldApiProvider::new(&server.uri(), "test-key").unwrap();
        let prices = provider.fetch_usd_prices().await;
        assert_eq!(prices.xau_usd, Decimal::from(2400));
        assert_eq!(prices.xag_usd, "31.25".parse().unwrap());
    }
}
