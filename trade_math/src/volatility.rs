//! Return series and volatility estimation
//!
//! Drift is the mean of simple daily returns and volatility is their
//! sample standard deviation (n - 1 denominator). Both are per-step
//! quantities; nothing here annualizes.

use crate::statistics::{mean, sample_std_dev};
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Simple returns `p[t] / p[t - 1] - 1` for every consecutive pair.
///
/// The first observation has no predecessor, so the output is one
/// element shorter than the input.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices.windows(2).map(|w| (w[1] / w[0]) - 1.0).collect()
}

/// Drift and volatility estimated from a return sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    /// Mean per-step return
    pub drift: f64,
    /// Sample standard deviation of per-step returns
    pub volatility: f64,
    /// Number of returns the estimate is based on
    pub observations: usize,
}

impl ReturnStats {
    /// Minimum number of finite returns needed for an estimate
    pub const MIN_RETURNS: usize = 2;

    /// Estimate from a return sample, ignoring non-finite entries
    pub fn from_returns(returns: &[f64]) -> Result<Self> {
        let valid: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();

        if valid.len() < Self::MIN_RETURNS {
            return Err(MathError::InsufficientData(format!(
                "Need at least {} valid returns, got {}",
                Self::MIN_RETURNS,
                valid.len()
            )));
        }

        Ok(Self {
            drift: mean(&valid)?,
            volatility: sample_std_dev(&valid)?,
            observations: valid.len(),
        })
    }

    /// Estimate from a price path
    pub fn from_prices(prices: &[f64]) -> Result<Self> {
        Self::from_returns(&simple_returns(prices))
    }
}
