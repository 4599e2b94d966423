//! Top crypto market rates (priced in USD) from a CoinGecko-style API.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::metadata;
use crate::core::rate::{CryptoRateSource, Rate};
use crate::providers::util::with_retry;

pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct MarketDto {
    symbol: String,
    current_price: f64,
    price_change_percentage_24h: Option<f64>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("kursy/0.1").build()?;
        Ok(CoinGeckoProvider {
            base_url: base_url.to_string(),
            client,
        })
    }

    async fn try_fetch(&self, count: usize) -> Result<Vec<Rate>> {
        let url = format!("{}/api/v3/coins/markets", self.base_url);
        let per_page = count.to_string();
        debug!("Requesting crypto markets from {}", url);

        let response = with_retry(
            || {
                self.client
                    .get(&url)
                    .query(&[
                        ("vs_currency", "usd"),
                        ("order", "market_cap_desc"),
                        ("per_page", per_page.as_str()),
                        ("page", "1"),
                        ("sparkline", "false"),
                    ])
                    .send()
            },
            2,
            250,
        )
        .await?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} from crypto source", response.status()));
        }

        let markets = response.json::<Vec<MarketDto>>().await?;
        let rates = markets
            .into_iter()
            .map(|m| Rate {
                currency: m.symbol.to_uppercase(),
                value: Decimal::from_f64(m.current_price).unwrap_or_default(),
                change: m.price_change_percentage_24h.unwrap_or(0.0),
                flag: metadata::CRYPTO_GLYPH.to_string(),
            })
            .collect();
        Ok(rates)
    }
}

#[async_trait]
impl CryptoRateSource for CoinGeckoProvider {
    /// Soft failure: any transport or decode problem yields an empty list
    /// so the rest of the refresh can proceed without crypto rows.
    #[instrument(name = "CryptoFetch", skip(self))]
    async fn fetch_top(&self, count: usize) -> Vec<Rate> {
        match self.try_fetch(count).await {
            Ok(rates) => rates,
            Err(e) => {
                warn!("Crypto rates unavailable: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_markets(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/markets"))
            .and(query_param("vs_currency", "usd"))
            .and(query_param("order", "market_cap_desc"))
            .and(query_param("per_page", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let server = MockServer::start().await;
        mount_markets(
            &server,
            r#"[
                {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                 "current_price": 65000.0, "price_change_percentage_24h": -2.1},
                {"id": "ethereum", "symbol": "eth", "name": "Ethereum",
                 "current_price": 3200.5, "price_change_percentage_24h": null}
            ]"#,
        )
        .await;

        let provider = CoinGeckoProvider::new(&server.uri()).unwrap();
        let rates = provider.fetch_top(10).await;

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].currency, "BTC");
        assert_eq!(rates[0].value, Decimal::from(65000));
        assert!((rates[0].change + 2.1).abs() < 1e-9);

        // Null 24h change degrades to zero.
        assert_eq!(rates[1].currency, "ETH");
        assert_eq!(rates[1].change, 0.0);
    }

    #[tokio::test]
    async fn test_server_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/markets"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::new(&server.uri()).unwrap();
        assert!(provider.fetch_top(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_empty_list() {
        let server = MockServer::start().await;
        mount_markets(&server, r#"{"unexpected": "shape"}"#).await;

        let provider = CoinGeckoProvider::new(&server.uri()).unwrap();
        assert!(provider.fetch_top(10).await.is_empty());
    }
}
