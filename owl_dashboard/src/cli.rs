//! Command-line flags.
//!
//! Every flag that mirrors a [`DashboardConfig`] field is optional and, when
//! given, wins over both the defaults and the `OWL_*` environment.
//!
//! ```bash
//! # Two-month decomposition forecast for bitcoin
//! owl_dashboard --ticker BTC-USD
//!
//! # 500 seeded Monte Carlo paths from local CSV files, as JSON
//! owl_dashboard -m monte-carlo --paths 500 --seed 7 --csv-dir ./data --format json
//! ```

use crate::config::DashboardConfig;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use price_forecast::ForecastMethod;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "owl_dashboard",
    version,
    about = "Short-horizon crypto price forecasts in the terminal",
    after_help = "For experimentation only. Not investment advice."
)]
pub struct Cli {
    /// Ticker from the menu; defaults to the first entry
    #[arg(long, short)]
    pub ticker: Option<String>,

    /// Forecasting method
    #[arg(long, short, value_enum, default_value_t = MethodArg::Decomposition)]
    pub method: MethodArg,

    /// Days to forecast past the last observation
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Lagged closes per feature row (lag-regression)
    #[arg(long)]
    pub lags: Option<usize>,

    /// Number of simulated paths (monte-carlo)
    #[arg(long)]
    pub paths: Option<usize>,

    /// Seed for reproducible forests and simulations
    #[arg(long)]
    pub seed: Option<u64>,

    /// First day of history (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of history (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Read `<dir>/<TICKER>.csv` instead of the chart API
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Rows shown from the end of each table
    #[arg(long, default_value_t = 5)]
    pub tail: usize,

    /// Also show trend and seasonal components; decomposition only
    #[arg(long)]
    pub components: bool,

    /// Print the ticker menu and exit
    #[arg(long)]
    pub list_tickers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Decomposition,
    LagRegression,
    MonteCarlo,
}

impl From<MethodArg> for ForecastMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Decomposition => ForecastMethod::Decomposition,
            MethodArg::LagRegression => ForecastMethod::LagRegression,
            MethodArg::MonteCarlo => ForecastMethod::MonteCarlo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Overlay explicitly given flags on `config`
    pub fn apply(&self, config: &mut DashboardConfig) {
        if let Some(horizon) = self.horizon {
            config.horizon_days = horizon;
        }
        if let Some(lags) = self.lags {
            config.lag_count = lags;
        }
        if let Some(paths) = self.paths {
            config.path_count = paths;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(start) = self.start {
            config.start_date = start;
        }
        if let Some(dir) = &self.csv_dir {
            config.csv_dir = Some(dir.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.http_timeout_secs = timeout;
        }
    }
}
