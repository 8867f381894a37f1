//! # Owl Forecast
//!
//! `owl_forecast` bundles the workspace crates behind one dependency:
//!
//! - [`price_forecast`]: price series, the three forecasting engines and
//!   the price providers with their TTL cache
//! - [`trade_math`]: the statistics and least-squares helpers they share
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use owl_forecast::price_forecast::models::monte_carlo::ScriptedShocks;
//! use owl_forecast::price_forecast::{MonteCarloSimulator, PriceSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series =
//!     PriceSeries::daily(start, vec![100.0, 102.0, 101.0, 105.0, 103.0, 107.0]).unwrap();
//!
//! let mut shocks = ScriptedShocks::new(vec![0.01, -0.02, 0.0]);
//! let bundle = MonteCarloSimulator::new()
//!     .simulate_with(&series, 3, 1, &mut shocks)
//!     .unwrap();
//!
//! let path = bundle.path(1).unwrap();
//! assert_eq!(path.len(), 4);
//! assert!((path[2] - 105.9086).abs() < 1e-9);
//! ```

pub use price_forecast;
pub use trade_math;

/// Forecast engines and data types most callers need
pub mod prelude {
    pub use price_forecast::provider::{CachedProvider, PriceCache, PriceSeriesProvider};
    pub use price_forecast::{
        DecompositionForecaster, FittedModel, ForecastError, ForecastMethod, ForecastModel,
        ForecastOutput, ForecastPoint, ForecastResult, Forecaster, LagRegressionForecaster,
        MonteCarloSimulator, PricePoint, PriceSeries, SimulationBundle,
    };
}
