//! Import configuration.
//!
//! Every field has a default, so an empty (or absent) TOML file imports
//! everything into `./assets` from the public endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default location of the keyed store.
pub const DATA_STORE: &str = "assets";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("parse config TOML: {0}")]
    Parse(String),
}

/// Where the equity metadata table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquitiesSource {
    /// `us_equities_meta_data.csv` in the input directory.
    Local,
    /// The legacy exchange-listing download, one request per exchange.
    ExchangeListing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub store_path: PathBuf,
    /// Directory holding the local CSV inputs.
    pub input_dir: PathBuf,
    pub wiki_prices_file: String,
    pub wiki_stocks_file: String,
    pub us_equities_file: String,
    pub us_equities_source: EquitiesSource,

    pub fred_base_url: String,
    pub sp500_start: NaiveDate,
    pub fred_assets_start: NaiveDate,

    pub wikipedia_url: String,

    /// Must contain `{exchange}`.
    pub listing_url_template: String,
    pub listing_exchanges: Vec<String>,

    pub openml_base_url: String,

    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DATA_STORE),
            input_dir: PathBuf::from("."),
            wiki_prices_file: "wiki_prices.csv".into(),
            wiki_stocks_file: "wiki_stocks.csv".into(),
            us_equities_file: "us_equities_meta_data.csv".into(),
            us_equities_source: EquitiesSource::Local,
            fred_base_url: "https://fred.stlouisfed.org".into(),
            sp500_start: NaiveDate::from_ymd_opt(2009, 1, 1).unwrap_or_default(),
            fred_assets_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            wikipedia_url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".into(),
            listing_url_template: "https://old.nasdaq.com/screening/companies-by-name.aspx?letter=0&exchange={exchange}&render=download".into(),
            listing_exchanges: vec!["NASDAQ".into(), "AMEX".into(), "NYSE".into()],
            openml_base_url: "https://www.openml.org".into(),
            timeout_secs: 300,
            user_agent: concat!("assetlab/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ImportConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn input(&self, file: &str) -> PathBuf {
        self.input_dir.join(file)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
