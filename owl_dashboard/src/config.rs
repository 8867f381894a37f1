//! Dashboard settings: defaults, then `OWL_*` environment overrides.
//!
//! Command-line flags are applied on top in `main`.

use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Tickers offered by the dashboard
pub const TICKER_MENU: [&str; 4] = ["BTC-USD", "ETH-USD", "DOT-USD", "LINK-USD"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub tickers: Vec<String>,
    /// First day of fetched history
    pub start_date: NaiveDate,
    pub horizon_days: usize,
    pub lag_count: usize,
    pub path_count: usize,
    /// Seed for the forest and the simulator; unset draws from entropy
    pub seed: Option<u64>,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    /// Read `<dir>/<TICKER>.csv` instead of calling the chart API
    pub csv_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tickers: TICKER_MENU.iter().map(|t| t.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
            horizon_days: 60,
            lag_count: 5,
            path_count: 100,
            seed: None,
            cache_ttl_secs: 300,
            http_timeout_secs: 10,
            csv_dir: None,
        }
    }
}

fn lookup_str<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn lookup_parsed<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup_str(lookup, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| DashboardError::Config(format!("{}={}: {}", name, raw, e)))
        })
        .transpose()
}

impl DashboardConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `OWL_*` name
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup_str(&lookup, "OWL_TICKERS") {
            config.tickers = raw
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(start) = lookup_parsed(&lookup, "OWL_START_DATE")? {
            config.start_date = start;
        }
        if let Some(horizon) = lookup_parsed(&lookup, "OWL_HORIZON_DAYS")? {
            config.horizon_days = horizon;
        }
        if let Some(lags) = lookup_parsed(&lookup, "OWL_LAG_COUNT")? {
            config.lag_count = lags;
        }
        if let Some(paths) = lookup_parsed(&lookup, "OWL_PATH_COUNT")? {
            config.path_count = paths;
        }
        if let Some(seed) = lookup_parsed(&lookup, "OWL_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(ttl) = lookup_parsed(&lookup, "OWL_CACHE_TTL_SECS")? {
            config.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = lookup_parsed(&lookup, "OWL_HTTP_TIMEOUT_SECS")? {
            config.http_timeout_secs = timeout;
        }
        if let Some(dir) = lookup_str(&lookup, "OWL_CSV_DIR") {
            config.csv_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(DashboardError::Config(
                "ticker menu must not be empty".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "HTTP timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a ticker against the menu, case-insensitively
    pub fn resolve_ticker(&self, requested: Option<&str>) -> Result<String> {
        let Some(requested) = requested else {
            return self
                .tickers
                .first()
                .cloned()
                .ok_or_else(|| DashboardError::Config("ticker menu is empty".to_string()));
        };

        self.tickers
            .iter()
            .find(|t| t.eq_ignore_ascii_case(requested.trim()))
            .cloned()
            .ok_or_else(|| {
                DashboardError::Config(format!(
                    "ticker {} is not offered; choose one of {}",
                    requested,
                    self.tickers.join(", ")
                ))
            })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.tickers, vec!["BTC-USD", "ETH-USD", "DOT-USD", "LINK-USD"]);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(config.horizon_days, 60);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("OWL_TICKERS", "btc-usd, sol-usd"),
            ("OWL_HORIZON_DAYS", "30"),
            ("OWL_SEED", " 7 "),
            ("OWL_START_DATE", "2021-06-01"),
            ("OWL_CSV_DIR", "/tmp/prices"),
            ("OWL_PATH_COUNT", ""),
        ]))
        .unwrap();

        assert_eq!(config.tickers, vec!["BTC-USD", "SOL-USD"]);
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(config.csv_dir, Some(PathBuf::from("/tmp/prices")));
        assert_eq!(config.path_count, 100);
    }

    #[test]
    fn malformed_env_value_is_an_error() {
        let result = DashboardConfig::from_lookup(lookup_from(&[("OWL_HORIZON_DAYS", "soon")]));
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn tickers_resolve_case_insensitively() {
        let config = DashboardConfig::default();

        assert_eq!(config.resolve_ticker(None).unwrap(), "BTC-USD");
        assert_eq!(config.resolve_ticker(Some("eth-usd")).unwrap(), "ETH-USD");
        assert!(config.resolve_ticker(Some("DOGE-USD")).is_err());
    }
}
