//! Forecasting models for price series

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A single predicted value, optionally with an uncertainty interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Date the prediction refers to
    pub date: NaiveDate,
    /// Point prediction
    pub value: f64,
    /// Lower end of the uncertainty interval
    pub lower_bound: Option<f64>,
    /// Upper end of the uncertainty interval
    pub upper_bound: Option<f64>,
}

impl ForecastPoint {
    /// Point prediction without bounds
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// Point prediction with a symmetric interval of the given half width
    pub fn with_interval(date: NaiveDate, value: f64, half_width: f64) -> Self {
        Self {
            date,
            value,
            lower_bound: Some(value - half_width),
            upper_bound: Some(value + half_width),
        }
    }

    /// Width of the interval, if bounds are present
    pub fn interval_width(&self) -> Option<f64> {
        match (self.lower_bound, self.upper_bound) {
            (Some(lower), Some(upper)) => Some(upper - lower),
            _ => None,
        }
    }
}

/// Ordered sequence of forecast points produced by one model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Name of the model that produced the points
    model: String,
    /// Predictions in strictly increasing date order
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(model: impl Into<String>, points: Vec<ForecastPoint>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::Forecasting(format!(
                "Forecast dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            model: model.into(),
            points,
        })
    }

    /// Name of the producing model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// All forecast points
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of forecast points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the result holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Predicted values in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Forecast dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Points dated strictly after `date`, i.e. the future horizon
    pub fn after(&self, date: NaiveDate) -> &[ForecastPoint] {
        let start = self.points.partition_point(|p| p.date <= date);
        &self.points[start..]
    }

    /// The last `n` points
    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForecastError::Forecasting(format!("Serialization failed: {}", e)))
    }
}

/// A model fitted to one price series, ready to extrapolate
pub trait FittedModel: Debug {
    /// Produce the forecast for `horizon_days` future steps
    fn predict(&self, horizon_days: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to a price series.
///
/// Implementations hold configuration only; fitting returns a fresh
/// fitted model, so one configuration can serve many requests.
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to a price series
    fn fit(&self, series: &PriceSeries) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Fit and forecast in one call
    fn fit_predict(&self, series: &PriceSeries, horizon_days: usize) -> Result<ForecastResult> {
        crate::error::ensure_positive("horizon_days", horizon_days)?;
        self.fit(series)?.predict(horizon_days)
    }
}

pub mod decomposition;
pub mod forest;
pub mod lag_regression;
pub mod monte_carlo;
