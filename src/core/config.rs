use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NbrbProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldApiProviderConfig {
    pub base_url: String,
    /// Empty key disables the metals call entirely; fallback constants are
    /// used instead.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub nbrb: Option<NbrbProviderConfig>,
    pub coingecko: Option<CoinGeckoProviderConfig>,
    pub goldapi: Option<GoldApiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            nbrb: Some(NbrbProviderConfig {
                base_url: "https://api.nbrb.by".to_string(),
            }),
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: "https://api.coingecko.com".to_string(),
            }),
            goldapi: Some(GoldApiProviderConfig {
                base_url: "https://www.goldapi.io".to_string(),
                api_key: String::new(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrenciesConfig {
    /// Fiat codes shown in the rates table and offered in the converter.
    pub wanted_fiat: Vec<String>,
    /// Subset highlighted as "top" rates alongside the metals.
    pub top_fiat: Vec<String>,
}

impl Default for CurrenciesConfig {
    fn default() -> Self {
        let codes = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        CurrenciesConfig {
            wanted_fiat: codes(&[
                "USD", "EUR", "RUB", "GBP", "JPY", "CHF", "CNY", "PLN", "KZT", "TRY",
            ]),
            top_fiat: codes(&["USD", "EUR", "RUB"]),
        }
    }
}

fn default_crypto_count() -> usize {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub currencies: CurrenciesConfig,
    #[serde(default = "default_crypto_count")]
    pub crypto_count: usize,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currencies: CurrenciesConfig::default(),
            crypto_count: default_crypto_count(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file; a missing file means defaults, not
    /// an error, so the app works out of the box.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "kursy", "kursy")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "kursy", "kursy")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.crypto_count, 10);
        assert_eq!(config.currencies.wanted_fiat.len(), 10);
        assert_eq!(config.currencies.top_fiat, vec!["USD", "EUR", "RUB"]);
        assert_eq!(
            config.providers.nbrb.unwrap().base_url,
            "https://api.nbrb.by"
        );
        assert!(config.providers.goldapi.unwrap().api_key.is_empty());
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  nbrb:
    base_url: "http://example.com/nbrb"
  coingecko:
    base_url: "http://example.com/gecko"
  goldapi:
    base_url: "http://example.com/gold"
    api_key: "secret"
currencies:
  wanted_fiat: [USD, EUR]
  top_fiat: [USD]
crypto_count: 5
data_path: "/tmp/kursy-data"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.nbrb.as_ref().unwrap().base_url,
            "http://example.com/nbrb"
        );
        assert_eq!(
            config.providers.goldapi.as_ref().unwrap().api_key,
            "secret"
        );
        assert_eq!(config.currencies.wanted_fiat, vec!["USD", "EUR"]);
        assert_eq!(config.crypto_count, 5);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/kursy-data")
        );
    }
}
