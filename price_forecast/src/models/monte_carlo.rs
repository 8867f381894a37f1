//! Monte Carlo price-path simulation
//!
//! Drift and volatility are estimated from simple daily returns (mean and
//! sample standard deviation). Each path starts at the last observed close
//! and compounds one normal shock per day:
//! `next = current * (1 + shock)`, `shock ~ Normal(drift, volatility)`.
//!
//! Prices are not floored at zero. With a large enough volatility a path
//! can go negative; that is a known property of the normal-shock model.

use crate::data::{calendar_days_after, PriceSeries};
use crate::error::{ensure_positive, ForecastError, Result};
use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use trade_math::{mean, quantile, ReturnStats};

/// Source of per-step return shocks
pub trait ShockSampler {
    /// Draw one shock for the given drift and volatility
    fn draw(&mut self, drift: f64, volatility: f64) -> Result<f64>;
}

/// Normally distributed shocks from any random number generator
#[derive(Debug, Clone)]
pub struct NormalShocks<R: Rng> {
    rng: R,
}

impl<R: Rng> NormalShocks<R> {
    /// Wrap a random number generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl NormalShocks<ChaCha8Rng> {
    /// Reproducible shocks from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Shocks seeded from operating-system entropy
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> ShockSampler for NormalShocks<R> {
    fn draw(&mut self, drift: f64, volatility: f64) -> Result<f64> {
        let normal = Normal::new(drift, volatility).map_err(|e| {
            ForecastError::Forecasting(format!(
                "Invalid shock distribution N({}, {}): {}",
                drift, volatility, e
            ))
        })?;
        Ok(normal.sample(&mut self.rng))
    }
}

/// Replays a fixed shock sequence, ignoring drift and volatility.
///
/// Useful for scenario analysis ("what if the next days return exactly
/// these amounts") and for deterministic tests.
#[derive(Debug, Clone)]
pub struct ScriptedShocks {
    shocks: Vec<f64>,
    position: usize,
}

impl ScriptedShocks {
    /// Create a replay of `shocks`, consumed in order across all paths
    pub fn new(shocks: Vec<f64>) -> Self {
        Self {
            shocks,
            position: 0,
        }
    }
}

impl ShockSampler for ScriptedShocks {
    fn draw(&mut self, _drift: f64, _volatility: f64) -> Result<f64> {
        let shock = self.shocks.get(self.position).copied().ok_or_else(|| {
            ForecastError::Forecasting(format!(
                "Shock script exhausted after {} draws",
                self.shocks.len()
            ))
        })?;
        self.position += 1;
        Ok(shock)
    }
}

/// Simulated price paths sharing one forecast date index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBundle {
    /// `horizon + 1` dates; index 0 is the last observed date
    dates: Vec<NaiveDate>,
    /// Run identifier (1..=K) to simulated prices
    paths: BTreeMap<usize, Vec<f64>>,
    /// Return statistics the paths were drawn from
    stats: ReturnStats,
}

impl SimulationBundle {
    /// Shared date index
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// All paths keyed by run identifier
    pub fn paths(&self) -> &BTreeMap<usize, Vec<f64>> {
        &self.paths
    }

    /// One path by run identifier (1-based)
    pub fn path(&self, run: usize) -> Option<&[f64]> {
        self.paths.get(&run).map(Vec::as_slice)
    }

    /// Number of simulated paths
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of simulated future steps
    pub fn horizon(&self) -> usize {
        self.dates.len() - 1
    }

    /// Estimated per-step drift
    pub fn drift(&self) -> f64 {
        self.stats.drift
    }

    /// Estimated per-step volatility
    pub fn volatility(&self) -> f64 {
        self.stats.volatility
    }

    /// Full return statistics
    pub fn stats(&self) -> &ReturnStats {
        &self.stats
    }

    /// Prices of every path at one step
    pub fn step(&self, index: usize) -> Vec<f64> {
        self.paths
            .values()
            .filter_map(|path| path.get(index).copied())
            .collect()
    }

    /// Final simulated price of every path
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.step(self.horizon())
    }

    /// Cross-path mean at every step
    pub fn mean_path(&self) -> Result<Vec<f64>> {
        (0..self.dates.len())
            .map(|i| mean(&self.step(i)).map_err(ForecastError::from))
            .collect()
    }

    /// Cross-path empirical quantile at every step
    pub fn quantile_path(&self, q: f64) -> Result<Vec<f64>> {
        (0..self.dates.len())
            .map(|i| quantile(&self.step(i), q).map_err(ForecastError::from))
            .collect()
    }
}

/// Monte Carlo simulator of future price paths
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    /// Seed for the shock generator; `None` draws from entropy
    seed: Option<u64>,
}

impl MonteCarloSimulator {
    /// Simulator seeded from entropy on every call
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Reproducible simulator
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Configured seed, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        "Monte Carlo"
    }

    /// Simulate `path_count` paths of `horizon_days` steps
    pub fn simulate(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
        path_count: usize,
    ) -> Result<SimulationBundle> {
        match self.seed {
            Some(seed) => self.simulate_with(
                series,
                horizon_days,
                path_count,
                &mut NormalShocks::seeded(seed),
            ),
            None => self.simulate_with(
                series,
                horizon_days,
                path_count,
                &mut NormalShocks::from_entropy(),
            ),
        }
    }

    /// Simulate with an explicit shock source
    pub fn simulate_with<S: ShockSampler>(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
        path_count: usize,
        sampler: &mut S,
    ) -> Result<SimulationBundle> {
        ensure_positive("horizon_days", horizon_days)?;
        ensure_positive("path_count", path_count)?;

        let stats = ReturnStats::from_prices(&series.closes())?;
        let start = series.last();

        debug!(
            drift = stats.drift,
            volatility = stats.volatility,
            returns = stats.observations,
            paths = path_count,
            horizon = horizon_days,
            "simulating price paths"
        );

        let mut paths = BTreeMap::new();
        for run in 1..=path_count {
            let mut path = Vec::with_capacity(horizon_days + 1);
            let mut price = start.close;
            path.push(price);

            for _ in 0..horizon_days {
                let shock = sampler.draw(stats.drift, stats.volatility)?;
                price *= 1.0 + shock;
                path.push(price);
            }

            paths.insert(run, path);
        }

        let mut dates = Vec::with_capacity(horizon_days + 1);
        dates.push(start.date);
        dates.extend(calendar_days_after(start.date, horizon_days)?);

        Ok(SimulationBundle {
            dates,
            paths,
            stats,
        })
    }
}
