//! Linear systems and penalized least squares

use crate::{MathError, Result};

const PIVOT_EPSILON: f64 = 1e-12;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {n}x{n} system matrix"
        )));
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);

        if a[pivot_row][col].abs() < PIVOT_EPSILON {
            return Err(MathError::CalculationError(format!(
                "Singular system: no usable pivot in column {}",
                col
            )));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

/// Minimize `(1/n)·||y - Xβ||² + Σ penalties[j]·β[j]²`.
///
/// Each penalty is the precision of a zero-mean Gaussian prior on the
/// matching coefficient, so this is the MAP estimate of a Bayesian linear
/// model. A zero penalty leaves the coefficient unregularized.
pub fn penalized_least_squares(
    design: &[Vec<f64>],
    target: &[f64],
    penalties: &[f64],
) -> Result<Vec<f64>> {
    if design.is_empty() || design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }

    let p = penalties.len();
    if design.iter().any(|row| row.len() != p) {
        return Err(MathError::InvalidInput(format!(
            "Every design row must have {} columns",
            p
        )));
    }

    let n = design.len() as f64;
    let mut gram = vec![vec![0.0; p]; p];
    let mut moment = vec![0.0; p];

    for (row, &y) in design.iter().zip(target) {
        for i in 0..p {
            moment[i] += row[i] * y / n;
            for j in i..p {
                gram[i][j] += row[i] * row[j] / n;
            }
        }
    }

    for i in 0..p {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    solve_linear_system(gram, moment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_linear_system() {
        let a = vec![
            vec![2.0, 1.0, -1.0],
            vec![-3.0, -1.0, 2.0],
            vec![-2.0, 1.0, 2.0],
        ];
        let b = vec![8.0, -11.0, -3.0];

        let x = solve_linear_system(a, b).unwrap();

        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-10);
        assert_relative_eq!(x[2], -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_singular_system_is_an_error() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let result = solve_linear_system(a, vec![1.0, 2.0]);

        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }

    #[test]
    fn test_unpenalized_fit_recovers_line() {
        let design: Vec<Vec<f64>> = (0..10).map(|x| vec![1.0, x as f64]).collect();
        let target: Vec<f64> = (0..10).map(|x| 3.0 + 0.5 * x as f64).collect();

        let beta = penalized_least_squares(&design, &target, &[0.0, 0.0]).unwrap();

        assert_relative_eq!(beta[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(beta[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_penalty_shrinks_coefficient() {
        let design: Vec<Vec<f64>> = (0..10).map(|x| vec![1.0, x as f64]).collect();
        let target: Vec<f64> = (0..10).map(|x| 3.0 + 0.5 * x as f64).collect();

        let free = penalized_least_squares(&design, &target, &[0.0, 0.0]).unwrap();
        let shrunk = penalized_least_squares(&design, &target, &[0.0, 10.0]).unwrap();

        assert!(shrunk[1].abs() < free[1].abs());
    }
}
