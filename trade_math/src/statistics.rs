//! Descriptive statistics over price and residual samples

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean of a non-empty sample
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty sample".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance using the n - 1 denominator
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Sample variance needs at least 2 observations, got {}",
            values.len()
        )));
    }

    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();

    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation using the n - 1 denominator
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    Ok(sample_variance(values)?.sqrt())
}

/// Root mean square of a sample, e.g. the scale of fit residuals
pub fn root_mean_square(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the root mean square of an empty sample".to_string(),
        ));
    }

    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    Ok((sum_sq / values.len() as f64).sqrt())
}

/// Empirical quantile with linear interpolation between order statistics
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take a quantile of an empty sample".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be within [0, 1], got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Two-sided standard normal critical value for a central interval width.
///
/// An `interval_width` of 0.95 returns roughly 1.96.
pub fn normal_quantile(interval_width: f64) -> Result<f64> {
    if interval_width <= 0.0 || interval_width >= 1.0 {
        return Err(MathError::InvalidInput(format!(
            "Interval width must be between 0 and 1, got {}",
            interval_width
        )));
    }

    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal: {}", e)))?;

    Ok(standard.inverse_cdf(0.5 + interval_width / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_sample_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        // Sample (n - 1) estimator, not the population one
        assert_relative_eq!(
            sample_std_dev(&values).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_constant_sample_has_zero_spread() {
        let values = [0.0; 6];
        assert_eq!(sample_std_dev(&values).unwrap(), 0.0);
        assert_eq!(root_mean_square(&values).unwrap(), 0.0);
    }

    #[test]
    fn test_short_samples_are_rejected() {
        assert!(matches!(mean(&[]), Err(MathError::InsufficientData(_))));
        assert!(matches!(
            sample_std_dev(&[1.0]),
            Err(MathError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];

        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert!(quantile(&values, 1.5).is_err());
    }

    #[test]
    fn test_normal_quantile() {
        assert_relative_eq!(normal_quantile(0.95).unwrap(), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(normal_quantile(0.80).unwrap(), 1.281552, epsilon = 1e-5);
        assert!(normal_quantile(1.0).is_err());
    }
}
