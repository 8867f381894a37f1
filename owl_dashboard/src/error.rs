use price_forecast::ForecastError;
use thiserror::Error;

/// Dashboard error categories mapped to exit codes
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Forecast(ForecastError::InvalidParameter(_)) => 2,
            Self::Forecast(ForecastError::DataUnavailable(_)) => 3,
            Self::Forecast(ForecastError::InsufficientData(_)) => 4,
            Self::Forecast(ForecastError::Forecasting(_)) => 5,
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_errors_get_distinct_codes() {
        let unavailable = DashboardError::from(ForecastError::DataUnavailable("x".into()));
        let insufficient = DashboardError::from(ForecastError::InsufficientData("x".into()));

        assert_eq!(unavailable.exit_code(), 3);
        assert_eq!(insufficient.exit_code(), 4);
        assert_eq!(DashboardError::Config("bad".into()).exit_code(), 2);
        assert_eq!(unavailable.to_string(), "Data unavailable: x");
    }
}
