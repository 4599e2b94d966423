//! Official fiat rates from the National Bank (NBRB-style) API.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::core::metadata;
use crate::core::pivot::SETTLEMENT;
use crate::core::rate::{FiatRateSource, FiatSnapshot, Rate, change_percent};
use crate::providers::util::with_retry;

pub struct NbrbProvider {
    base_url: String,
    client: reqwest::Client,
    wanted_fiat: Vec<String>,
    top_fiat: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct NbrbRateDto {
    #[serde(rename = "Cur_Abbreviation")]
    abbreviation: String,
    #[serde(rename = "Cur_Scale")]
    scale: u32,
    #[serde(rename = "Cur_OfficialRate")]
    official_rate: f64,
}

impl NbrbProvider {
    pub fn new(base_url: &str, wanted_fiat: &[String], top_fiat: &[String]) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("kursy/0.1").build()?;
        Ok(NbrbProvider {
            base_url: base_url.to_string(),
            client,
            wanted_fiat: wanted_fiat.to_vec(),
            top_fiat: top_fiat.to_vec(),
        })
    }

    fn tracked_codes(&self) -> impl Iterator<Item = &String> {
        self.wanted_fiat.iter().chain(self.top_fiat.iter())
    }

    /// Unit values (official rate divided by scale) for every currency the
    /// source quotes on the given date.
    #[instrument(name = "NbrbFetch", skip(self), fields(date = %date))]
    async fn fetch_units(&self, date: NaiveDate) -> Result<HashMap<String, Decimal>> {
        let url = format!("{}/exrates/rates", self.base_url);
        let ondate = date.format("%Y-%m-%d").to_string();
        debug!("Requesting official rates from {}", url);

        let response = with_retry(
            || {
                self.client
                    .get(&url)
                    .query(&[("periodicity", "0"), ("ondate", ondate.as_str())])
                    .send()
            },
            2,
            250,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for date {} URL: {}", e, ondate, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for rates on {}",
                response.status(),
                ondate
            ));
        }

        let entries = response.json::<Vec<NbrbRateDto>>().await?;
        let mut units = HashMap::new();
        for entry in entries {
            if entry.scale == 0 {
                continue;
            }
            let official = Decimal::from_f64(entry.official_rate).unwrap_or_default();
            units.insert(entry.abbreviation, official / Decimal::from(entry.scale));
        }
        Ok(units)
    }
}

#[async_trait]
impl FiatRateSource for NbrbProvider {
    async fn fetch_snapshot(&self) -> Result<FiatSnapshot> {
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap_or(today);

        let (today_result, yesterday_result) =
            tokio::join!(self.fetch_units(today), self.fetch_units(yesterday));

        // Today failing means no rates at all; yesterday failing only
        // disables change computation.
        let today_units = today_result?;
        let (yesterday_units, change_available) = match yesterday_result {
            Ok(units) => (units, true),
            Err(e) => {
                warn!("Previous-day rates unavailable: {e}");
                (HashMap::new(), false)
            }
        };

        let usd_unit = today_units.get("USD").copied();

        let mut rates = HashMap::new();
        rates.insert(
            SETTLEMENT.to_string(),
            Rate {
                currency: SETTLEMENT.to_string(),
                value: Decimal::ONE,
                change: 0.0,
                flag: metadata::flag(SETTLEMENT),
            },
        );
        for code in self.tracked_codes() {
            if rates.contains_key(code) {
                continue;
            }
            let Some(&value) = today_units.get(code) else {
                continue;
            };
            let yesterday_value = yesterday_units.get(code).copied().unwrap_or(value);
            rates.insert(
                code.clone(),
                Rate {
                    currency: code.clone(),
                    value,
                    change: change_percent(value, yesterday_value),
                    flag: metadata::flag(code),
                },
            );
        }

        Ok(FiatSnapshot {
            rates,
            usd_unit,
            fetched_at: Utc::now(),
            change_available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn provider(base_url: &str) -> NbrbProvider {
        NbrbProvider::new(base_url, &codes(&["USD", "EUR"]), &codes(&["USD"])).unwrap()
    }

    async fn mount_rates(server: &MockServer, date: NaiveDate, body: &str) {
        Mock::given(method("GET"))
            .and(path("/exrates/rates"))
            .and(query_param("periodicity", "0"))
            .and(query_param("ondate", date.format("%Y-%m-%d").to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_snapshot_with_change() {
        let server = MockServer::start().await;
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        mount_rates(
            &server,
            today,
            r#"[
                {"Cur_Abbreviation": "USD", "Cur_Scale": 1, "Cur_OfficialRate": 3.30},
                {"Cur_Abbreviation": "EUR", "Cur_Scale": 1, "Cur_OfficialRate": 3.55},
                {"Cur_Abbreviation": "JPY", "Cur_Scale": 100, "Cur_OfficialRate": 2.15}
            ]"#,
        )
        .await;
        mount_rates(
            &server,
            yesterday,
            r#"[
                {"Cur_Abbreviation": "USD", "Cur_Scale": 1, "Cur_OfficialRate": 3.00}
            ]"#,
        )
        .await;

        let snapshot = provider(&server.uri()).fetch_snapshot().await.unwrap();

        assert!(snapshot.change_available);
        assert_eq!(snapshot.usd_unit, Some("3.30".parse().unwrap()));

        let usd = &snapshot.rates["USD"];
        assert_eq!(usd.value, "3.30".parse::<Decimal>().unwrap());
        assert!((usd.change - 10.0).abs() < 1e-9);

        // Absent from yesterday: value present, change degrades to zero.
        let eur = &snapshot.rates["EUR"];
        assert_eq!(eur.value, "3.55".parse::<Decimal>().unwrap());
        assert_eq!(eur.change, 0.0);

        // Settlement row is synthesized, untracked codes are dropped.
        assert_eq!(snapshot.rates["BYN"].value, Decimal::ONE);
        assert!(!snapshot.rates.contains_key("JPY"));
    }

    #[tokio::test]
    async fn test_scale_divides_official_rate() {
        let server = MockServer::start().await;
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        let body = r#"[{"Cur_Abbreviation": "USD", "Cur_Scale": 100, "Cur_OfficialRate": 320.0}]"#;
        mount_rates(&server, today, body).await;
        mount_rates(&server, yesterday, body).await;

        let snapshot = provider(&server.uri()).fetch_snapshot().await.unwrap();
        assert_eq!(
            snapshot.rates["USD"].value,
            "3.20".parse::<Decimal>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_yesterday_failure_is_soft() {
        let server = MockServer::start().await;
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        mount_rates(
            &server,
            today,
            r#"[{"Cur_Abbreviation": "USD", "Cur_Scale": 1, "Cur_OfficialRate": 3.30}]"#,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/exrates/rates"))
            .and(query_param("ondate", yesterday.format("%Y-%m-%d").to_string()))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let snapshot = provider(&server.uri()).fetch_snapshot().await.unwrap();
        assert!(!snapshot.change_available);
        assert_eq!(snapshot.rates["USD"].change, 0.0);
        assert_eq!(snapshot.usd_unit, Some("3.30".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_today_failure_is_hard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exrates/rates"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).fetch_snapshot().await;
        assert!(result.is_err());
    }
}
