//! # Trade Math
//!
//! Numeric building blocks for the price forecasters.
//! This crate provides sample statistics, return series, drift and
//! volatility estimation, and penalized least-squares fitting.

use thiserror::Error;

pub mod regression;
pub mod statistics;
pub mod volatility;

pub use regression::{penalized_least_squares, solve_linear_system};
pub use statistics::{mean, normal_quantile, quantile, root_mean_square, sample_std_dev};
pub use volatility::{simple_returns, ReturnStats};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 returns".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 returns"
        );
    }
}
