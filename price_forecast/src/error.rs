//! Error types for the price_forecast crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few observations or distinct values for the requested model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Upstream fetch failed or returned no usable rows
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Non-positive horizon, lag count, path count or similar
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical failure while fitting or evaluating a model
    #[error("Forecasting error: {0}")]
    Forecasting(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientData(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::CalculationError(msg) => ForecastError::Forecasting(msg),
        }
    }
}

/// Reject zero-valued counts such as horizons, lags and path counts
pub(crate) fn ensure_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ForecastError::InvalidParameter(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}
