//! Lag-feature regression with recursive multi-step prediction

use crate::data::{calendar_days_after, PriceSeries};
use crate::error::{ensure_positive, ForecastError, Result};
use crate::models::forest::{ForestConfig, RandomForest};
use crate::models::{FittedModel, ForecastModel, ForecastPoint, ForecastResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Default number of lagged closes per feature vector
pub const DEFAULT_LAG_COUNT: usize = 5;

/// One supervised training row built from the close history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagRow {
    /// `[close(t-1), ..., close(t-lag_count)]`, most recent first
    pub features: Vec<f64>,
    /// `close(t)`
    pub label: f64,
}

/// Build one row per date that has `lag_count` predecessors.
///
/// The first `lag_count` closes have insufficient history and produce no row.
pub fn build_lag_rows(closes: &[f64], lag_count: usize) -> Vec<LagRow> {
    if lag_count == 0 {
        return Vec::new();
    }

    (lag_count..closes.len())
        .map(|t| LagRow {
            features: closes[t - lag_count..t].iter().rev().copied().collect(),
            label: closes[t],
        })
        .collect()
}

/// `lag_count` history rows plus one label
fn required_observations(lag_count: usize) -> Result<usize> {
    lag_count.checked_add(1).ok_or_else(|| {
        ForecastError::InvalidParameter(format!("lag_count {} is too large", lag_count))
    })
}

/// Random forest on lagged closes, applied iteratively
#[derive(Debug, Clone)]
pub struct LagRegressionForecaster {
    /// Name of the model
    name: String,
    /// Number of lagged closes per feature vector
    lag_count: usize,
    /// Forest tunables, including the seed
    forest: ForestConfig,
}

impl LagRegressionForecaster {
    /// Create a forecaster with the default lag count and forest settings
    pub fn new() -> Self {
        Self {
            name: format!("Lag Regression (lags={})", DEFAULT_LAG_COUNT),
            lag_count: DEFAULT_LAG_COUNT,
            forest: ForestConfig::default(),
        }
    }

    /// Create a forecaster with a custom lag count
    pub fn with_lags(lag_count: usize) -> Result<Self> {
        ensure_positive("lag_count", lag_count)?;
        required_observations(lag_count)?;

        Ok(Self {
            name: format!("Lag Regression (lags={})", lag_count),
            lag_count,
            forest: ForestConfig::default(),
        })
    }

    /// Replace the forest settings
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Replace only the forest seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest.seed = seed;
        self
    }

    /// Number of lagged closes per feature vector
    pub fn lag_count(&self) -> usize {
        self.lag_count
    }
}

impl Default for LagRegressionForecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Lag regression fitted to one price series
#[derive(Debug, Clone)]
pub struct FittedLagRegression {
    name: String,
    lag_count: usize,
    forest: RandomForest,
    /// The last `lag_count` observed closes, oldest first
    seed_window: Vec<f64>,
    last_date: NaiveDate,
    training_rows: Vec<LagRow>,
}

impl ForecastModel for LagRegressionForecaster {
    type Fitted = FittedLagRegression;

    fn fit(&self, series: &PriceSeries) -> Result<FittedLagRegression> {
        let required = required_observations(self.lag_count)?;
        if series.len() < required {
            return Err(ForecastError::InsufficientData(format!(
                "Lag regression with {} lags needs at least {} observations, got {}",
                self.lag_count,
                required,
                series.len()
            )));
        }

        let closes = series.closes();
        let training_rows = build_lag_rows(&closes, self.lag_count);
        let features: Vec<Vec<f64>> = training_rows.iter().map(|r| r.features.clone()).collect();
        let labels: Vec<f64> = training_rows.iter().map(|r| r.label).collect();

        let forest = RandomForest::fit(&self.forest, &features, &labels)?;

        debug!(
            rows = training_rows.len(),
            lags = self.lag_count,
            trees = forest.n_trees(),
            seed = self.forest.seed,
            "fitted lag regression forest"
        );

        Ok(FittedLagRegression {
            name: self.name.clone(),
            lag_count: self.lag_count,
            forest,
            seed_window: closes[closes.len() - self.lag_count..].to_vec(),
            last_date: series.last().date,
            training_rows,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedLagRegression {
    /// Rows the forest was trained on, in date order
    pub fn training_rows(&self) -> &[LagRow] {
        &self.training_rows
    }
}

impl FittedModel for FittedLagRegression {
    /// Recursive forecast: each prediction is fed back as the newest lag.
    ///
    /// Once the horizon exceeds the lag count the window holds only
    /// predicted values, so model error compounds with the horizon.
    fn predict(&self, horizon_days: usize) -> Result<ForecastResult> {
        ensure_positive("horizon_days", horizon_days)?;

        let mut window: VecDeque<f64> = self.seed_window.iter().copied().collect();
        let dates = calendar_days_after(self.last_date, horizon_days)?;
        let mut points = Vec::with_capacity(horizon_days);

        for date in dates {
            let features: Vec<f64> = window.iter().rev().copied().collect();
            let next = self.forest.predict(&features)?;

            window.push_back(next);
            if window.len() > self.lag_count {
                window.pop_front();
            }
            points.push(ForecastPoint::new(date, next));
        }

        ForecastResult::new(self.name.clone(), points)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
