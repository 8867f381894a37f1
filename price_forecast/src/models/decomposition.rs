//! Additive trend + seasonality decomposition model
//!
//! The close price is modelled as
//! `y(t) = trend(t) + yearly(t) + weekly(t)` where the trend is piecewise
//! linear with hinge terms at evenly spaced changepoints and each seasonal
//! component is a truncated Fourier series. Coefficients are the MAP
//! estimate under zero-mean Gaussian priors, which reduces to a penalized
//! least-squares problem.

use crate::data::{calendar_days_after, PriceSeries};
use crate::error::{ensure_positive, ForecastError, Result};
use crate::models::{FittedModel, ForecastModel, ForecastPoint, ForecastResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;
use trade_math::{normal_quantile, penalized_least_squares, root_mean_square};

const YEAR_DAYS: f64 = 365.25;
const WEEK_DAYS: f64 = 7.0;
/// Scales prior precisions against the per-observation squared error
const PRIOR_STRENGTH: f64 = 0.01;
/// History span needed before a seasonal component is switched on in auto mode
const YEARLY_MIN_SPAN_DAYS: i64 = 730;
const WEEKLY_MIN_SPAN_DAYS: i64 = 14;

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    /// Enabled when the history is long enough to observe a full cycle twice
    Auto,
    /// Always fitted
    On,
    /// Never fitted
    Off,
}

impl SeasonalityMode {
    fn resolve(self, span_days: i64, min_span_days: i64) -> bool {
        match self {
            SeasonalityMode::Auto => span_days >= min_span_days,
            SeasonalityMode::On => true,
            SeasonalityMode::Off => false,
        }
    }
}

/// Tunables for the decomposition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Maximum number of trend changepoints
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Prior scale of the trend rate changes; smaller is stiffer
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Fourier order of the yearly component
    pub yearly_order: usize,
    /// Fourier order of the weekly component
    pub weekly_order: usize,
    /// Yearly component switch
    pub yearly_seasonality: SeasonalityMode,
    /// Weekly component switch
    pub weekly_seasonality: SeasonalityMode,
    /// Central coverage of the uncertainty interval
    pub interval_width: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_order: 10,
            weekly_order: 3,
            yearly_seasonality: SeasonalityMode::Auto,
            weekly_seasonality: SeasonalityMode::Auto,
            interval_width: 0.80,
        }
    }
}

/// Decomposition forecaster (trend + yearly/weekly seasonality)
#[derive(Debug, Clone)]
pub struct DecompositionForecaster {
    /// Name of the model
    name: String,
    /// Model tunables
    config: DecompositionConfig,
}

impl DecompositionForecaster {
    /// Create a forecaster with default tunables
    pub fn new() -> Self {
        Self {
            name: "Decomposition".to_string(),
            config: DecompositionConfig::default(),
        }
    }

    /// Create a forecaster with custom tunables
    pub fn with_config(config: DecompositionConfig) -> Result<Self> {
        if !(config.changepoint_range > 0.0 && config.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Changepoint range must be within (0, 1], got {}",
                config.changepoint_range
            )));
        }
        if config.changepoint_prior_scale <= 0.0 || config.seasonality_prior_scale <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Prior scales must be positive".to_string(),
            ));
        }
        if config.interval_width <= 0.0 || config.interval_width >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval width must be between 0 and 1, got {}",
                config.interval_width
            )));
        }

        Ok(Self {
            name: "Decomposition".to_string(),
            config,
        })
    }

    /// Model tunables
    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }
}

impl Default for DecompositionForecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Design-matrix layout shared by fitting and extrapolation
#[derive(Debug, Clone)]
struct Basis {
    start: NaiveDate,
    span_days: f64,
    /// Changepoint locations on the scaled time axis
    changepoints: Vec<f64>,
    yearly_order: usize,
    weekly_order: usize,
}

impl Basis {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn trend_columns(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn width(&self) -> usize {
        self.trend_columns() + 2 * self.yearly_order + 2 * self.weekly_order
    }

    fn row(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        // Absolute day number keeps seasonal phase independent of the history start
        let day = date.num_days_from_ce() as f64;

        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&s| (t - s).max(0.0)));
        push_fourier(&mut row, day, YEAR_DAYS, self.yearly_order);
        push_fourier(&mut row, day, WEEK_DAYS, self.weekly_order);
        row
    }
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

/// Evenly spaced changepoint dates over the first part of the history
fn place_changepoints(dates: &[NaiveDate], config: &DecompositionConfig) -> Vec<NaiveDate> {
    let hist_size = (dates.len() as f64 * config.changepoint_range).floor() as usize;
    let count = config.n_changepoints.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last_index = (hist_size - 1) as f64;
    let mut picked: Vec<NaiveDate> = (1..=count)
        .map(|i| {
            let index = (i as f64 * last_index / count as f64).round() as usize;
            dates[index]
        })
        .collect();
    picked.dedup();
    picked
}

/// Decomposition model fitted to one price series
#[derive(Debug, Clone)]
pub struct FittedDecomposition {
    name: String,
    basis: Basis,
    coefficients: Vec<f64>,
    y_scale: f64,
    history: Vec<NaiveDate>,
    changepoint_dates: Vec<NaiveDate>,
    residual_sigma: f64,
    changepoint_spacing_days: f64,
    z_score: f64,
}

/// Per-date breakdown of a decomposition prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentPoint {
    pub date: NaiveDate,
    pub trend: f64,
    pub yearly: f64,
    pub weekly: f64,
}

impl ForecastModel for DecompositionForecaster {
    type Fitted = FittedDecomposition;

    fn fit(&self, series: &PriceSeries) -> Result<FittedDecomposition> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Decomposition needs at least 2 distinct dates, got {}",
                series.len()
            )));
        }

        let dates = series.dates();
        let closes = series.closes();

        let (min, max) = closes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if max == min {
            return Err(ForecastError::InsufficientData(
                "All close prices are identical; the decomposition is degenerate".to_string(),
            ));
        }

        let y_scale = closes.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let span = series.span_days();
        let changepoint_dates = place_changepoints(&dates, &self.config);

        let mut basis = Basis {
            start: dates[0],
            span_days: span as f64,
            changepoints: Vec::new(),
            yearly_order: if self
                .config
                .yearly_seasonality
                .resolve(span, YEARLY_MIN_SPAN_DAYS)
            {
                self.config.yearly_order
            } else {
                0
            },
            weekly_order: if self
                .config
                .weekly_seasonality
                .resolve(span, WEEKLY_MIN_SPAN_DAYS)
            {
                self.config.weekly_order
            } else {
                0
            },
        };
        basis.changepoints = changepoint_dates
            .iter()
            .map(|&d| basis.scaled_time(d))
            .collect();

        let design: Vec<Vec<f64>> = dates.iter().map(|&d| basis.row(d)).collect();
        let target: Vec<f64> = closes.iter().map(|v| v / y_scale).collect();

        let changepoint_penalty = PRIOR_STRENGTH / self.config.changepoint_prior_scale.powi(2);
        let seasonal_penalty = PRIOR_STRENGTH / self.config.seasonality_prior_scale.powi(2);
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(changepoint_penalty).take(basis.changepoints.len()));
        penalties.extend(
            std::iter::repeat(seasonal_penalty).take(basis.width() - basis.trend_columns()),
        );

        let coefficients = penalized_least_squares(&design, &target, &penalties)?;

        let residuals: Vec<f64> = design
            .iter()
            .zip(&closes)
            .map(|(row, &y)| y - dot(row, &coefficients) * y_scale)
            .collect();
        let residual_sigma = root_mean_square(&residuals)?;

        let changepoint_spacing_days = (span as f64 * self.config.changepoint_range
            / (changepoint_dates.len() + 1) as f64)
            .max(1.0);

        debug!(
            observations = series.len(),
            changepoints = changepoint_dates.len(),
            yearly_order = basis.yearly_order,
            weekly_order = basis.weekly_order,
            residual_sigma,
            "fitted decomposition model"
        );

        Ok(FittedDecomposition {
            name: self.name.clone(),
            basis,
            coefficients,
            y_scale,
            history: dates,
            changepoint_dates,
            residual_sigma,
            changepoint_spacing_days,
            z_score: normal_quantile(self.config.interval_width)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn dot(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(x, b)| x * b).sum()
}

impl FittedDecomposition {
    fn last_observed(&self) -> NaiveDate {
        self.history[self.history.len() - 1]
    }

    /// History dates followed by `horizon_days` calendar days
    fn combined_index(&self, horizon_days: usize) -> Result<Vec<NaiveDate>> {
        let mut dates = self.history.clone();
        dates.extend(calendar_days_after(self.last_observed(), horizon_days)?);
        Ok(dates)
    }

    /// Interval half width at `date`; grows with distance past the history
    fn half_width(&self, date: NaiveDate) -> f64 {
        let ahead = (date - self.last_observed()).num_days().max(0) as f64;
        self.z_score * self.residual_sigma * (1.0 + ahead / self.changepoint_spacing_days).sqrt()
    }

    /// Trend and seasonal contributions for history plus horizon
    pub fn components(&self, horizon_days: usize) -> Result<Vec<ComponentPoint>> {
        let trend_end = self.basis.trend_columns();
        let yearly_end = trend_end + 2 * self.basis.yearly_order;

        Ok(self
            .combined_index(horizon_days)?
            .into_iter()
            .map(|date| {
                let row = self.basis.row(date);
                let part = |range: std::ops::Range<usize>| {
                    dot(&row[range.clone()], &self.coefficients[range]) * self.y_scale
                };
                ComponentPoint {
                    date,
                    trend: part(0..trend_end),
                    yearly: part(trend_end..yearly_end),
                    weekly: part(yearly_end..row.len()),
                }
            })
            .collect())
    }

    /// Dates at which the trend may change slope
    pub fn changepoints(&self) -> &[NaiveDate] {
        &self.changepoint_dates
    }

    /// Root mean square of the in-sample residuals, in price units
    pub fn residual_sigma(&self) -> f64 {
        self.residual_sigma
    }
}

impl FittedModel for FittedDecomposition {
    fn predict(&self, horizon_days: usize) -> Result<ForecastResult> {
        ensure_positive("horizon_days", horizon_days)?;

        let points = self
            .combined_index(horizon_days)?
            .into_iter()
            .map(|date| {
                let value = dot(&self.basis.row(date), &self.coefficients) * self.y_scale;
                ForecastPoint::with_interval(date, value, self.half_width(date))
            })
            .collect();

        ForecastResult::new(self.name.clone(), points)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
