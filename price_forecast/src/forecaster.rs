//! Explicit selection between the forecasting engines

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::decomposition::DecompositionForecaster;
use crate::models::lag_regression::LagRegressionForecaster;
use crate::models::monte_carlo::{MonteCarloSimulator, SimulationBundle};
use crate::models::{ForecastModel, ForecastResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// The available forecasting methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    Decomposition,
    LagRegression,
    MonteCarlo,
}

impl ForecastMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decomposition => "decomposition",
            Self::LagRegression => "lag-regression",
            Self::MonteCarlo => "monte-carlo",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "decomposition" => Ok(Self::Decomposition),
            "lag-regression" | "lag_regression" => Ok(Self::LagRegression),
            "monte-carlo" | "monte_carlo" => Ok(Self::MonteCarlo),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown forecast method: {}",
                other
            ))),
        }
    }
}

/// A configured forecasting engine chosen by the caller
#[derive(Debug, Clone)]
pub enum Forecaster {
    Decomposition(DecompositionForecaster),
    LagRegression(LagRegressionForecaster),
    MonteCarlo {
        simulator: MonteCarloSimulator,
        path_count: usize,
    },
}

/// What a forecaster run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ForecastOutput {
    Forecast(ForecastResult),
    Simulation(SimulationBundle),
}

impl Forecaster {
    /// Which method this forecaster implements
    pub fn method(&self) -> ForecastMethod {
        match self {
            Self::Decomposition(_) => ForecastMethod::Decomposition,
            Self::LagRegression(_) => ForecastMethod::LagRegression,
            Self::MonteCarlo { .. } => ForecastMethod::MonteCarlo,
        }
    }

    /// Display name of the underlying model
    pub fn name(&self) -> &str {
        match self {
            Self::Decomposition(model) => model.name(),
            Self::LagRegression(model) => model.name(),
            Self::MonteCarlo { simulator, .. } => simulator.name(),
        }
    }

    /// Run the engine on a series for `horizon_days` future steps.
    ///
    /// Every call fits a fresh model; nothing is retained between calls.
    pub fn run(&self, series: &PriceSeries, horizon_days: usize) -> Result<ForecastOutput> {
        info!(
            method = %self.method(),
            observations = series.len(),
            horizon = horizon_days,
            "running forecaster"
        );

        match self {
            Self::Decomposition(model) => model
                .fit_predict(series, horizon_days)
                .map(ForecastOutput::Forecast),
            Self::LagRegression(model) => model
                .fit_predict(series, horizon_days)
                .map(ForecastOutput::Forecast),
            Self::MonteCarlo {
                simulator,
                path_count,
            } => simulator
                .simulate(series, horizon_days, *path_count)
                .map(ForecastOutput::Simulation),
        }
    }
}
