//! # Price Forecast
//!
//! Short-horizon price forecasting over daily close prices.
//!
//! ## Features
//!
//! - Price series handling (date, open, close) with strict date ordering
//! - Three interchangeable engines behind one [`Forecaster`] selector:
//!   - **Decomposition**: piecewise-linear trend plus yearly/weekly Fourier
//!     seasonality, with uncertainty intervals over history and horizon
//!   - **Lag regression**: random forest on lagged closes, predicted
//!     recursively one day at a time
//!   - **Monte Carlo**: normal-shock price paths from historical drift and
//!     volatility
//! - Price providers (CSV files, Yahoo chart API) and a TTL cache
//!
//! Every engine is a pure function of its input series and parameters: no
//! global state, no I/O, a fresh model per call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use price_forecast::models::lag_regression::LagRegressionForecaster;
//! use price_forecast::models::ForecastModel;
//! use price_forecast::provider::{CachedProvider, CsvPriceProvider, PriceCache, PriceSeriesProvider};
//!
//! # fn main() -> price_forecast::Result<()> {
//! let provider = CachedProvider::new(CsvPriceProvider::new("data"), PriceCache::with_default_ttl());
//! let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let series = provider.fetch("BTC-USD", start, end)?;
//!
//! let forecast = LagRegressionForecaster::with_lags(5)?.fit_predict(&series, 30)?;
//! for point in forecast.points() {
//!     println!("{} {:.2}", point.date, point.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod provider;

// Re-export commonly used types
pub use crate::data::{PricePoint, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{ForecastMethod, ForecastOutput, Forecaster};
pub use crate::models::decomposition::DecompositionForecaster;
pub use crate::models::lag_regression::LagRegressionForecaster;
pub use crate::models::monte_carlo::{MonteCarloSimulator, SimulationBundle};
pub use crate::models::{FittedModel, ForecastModel, ForecastPoint, ForecastResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
