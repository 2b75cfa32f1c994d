//! Least-squares fitting

use super::forecast::ForecastError;
use nalgebra::{DMatrix, DVector};

/// Degree-2 polynomial expansion without a bias term.
///
/// Output order: the inputs, then every product `x_i * x_j` with `i <= j`.
pub fn polynomial_features(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut out = Vec::with_capacity(n + n * (n + 1) / 2);
    out.extend_from_slice(x);
    for i in 0..n {
        for j in i..n {
            out.push(x[i] * x[j]);
        }
    }
    out
}

/// Ordinary least squares with an intercept
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fit `targets ~ rows`.
    ///
    /// Columns are centred (and scaled where they vary) before an SVD solve;
    /// singular values below `max_sv * max(rows, cols) * EPSILON` are
    /// discarded, giving the minimum-norm solution on rank-deficient input.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64]) -> Result<Self, ForecastError> {
        let n = rows.len();
        let Some(p) = rows.first().map(Vec::len) else {
            return Err(ForecastError::Solver("no rows to fit".to_string()));
        };
        if targets.len() != n || rows.iter().any(|r| r.len() != p) {
            return Err(ForecastError::Solver("ragged design matrix".to_string()));
        }

        let mut means = vec![0.0; p];
        let mut scales = vec![0.0; p];
        for j in 0..p {
            let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n as f64;
            let var = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n as f64;
            means[j] = mean;
            scales[j] = var.sqrt();
        }
        let y_mean = targets.iter().sum::<f64>() / n as f64;

        let x = DMatrix::from_fn(n, p, |i, j| {
            if scales[j] > 0.0 {
                (rows[i][j] - means[j]) / scales[j]
            } else {
                0.0
            }
        });
        let y = DVector::from_iterator(n, targets.iter().map(|t| t - y_mean));

        let svd = x.svd(true, true);
        let max_sv = svd.singular_values.max();
        let eps = max_sv * n.max(p) as f64 * f64::EPSILON;
        let beta = svd
            .solve(&y, eps)
            .map_err(|e| ForecastError::Solver(e.to_string()))?;

        let coefficients: Vec<f64> = (0..p)
            .map(|j| if scales[j] > 0.0 { beta[j] / scales[j] } else { 0.0 })
            .collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::NonFinite);
        }

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Degree-1 least squares through `(x, y)` points, as `(slope, intercept)`.
///
/// `None` with fewer than two points or when every `x` is equal.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;
    let y_mean = ys[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some((slope, y_mean - slope * x_mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_features_layout() {
        let out = polynomial_features(&[2.0, 3.0]);
        assert_eq!(out, vec![2.0, 3.0, 4.0, 6.0, 9.0]);
        assert_eq!(polynomial_features(&[1.0; 4]).len(), 14);
    }

    #[test]
    fn test_fit_recovers_exact_plane() {
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![f64::from(i), f64::from((i * 7) % 5)])
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();

        let model = LinearModel::fit(&rows, &targets).unwrap();
        assert!((model.intercept - 3.0).abs() < 1e-9);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients[1] + 0.5).abs() < 1e-9);
        assert!((model.predict(&[100.0, 1.0]) - 202.5).abs() < 1e-7);
    }

    #[test]
    fn test_fit_tolerates_collinear_columns() {
        // Second column duplicates the first; third is constant.
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![f64::from(i), f64::from(i), 4.0])
            .collect();
        let targets: Vec<f64> = (0..10).map(|i| 1.0 + f64::from(i)).collect();

        let model = LinearModel::fit(&rows, &targets).unwrap();
        // Minimum-norm split of the slope across the duplicated columns.
        assert!((model.coefficients[0] - 0.5).abs() < 1e-9);
        assert!((model.coefficients[1] - 0.5).abs() < 1e-9);
        assert_eq!(model.coefficients[2], 0.0);
        assert!((model.predict(&[12.0, 12.0, 4.0]) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_empty_and_ragged_input() {
        assert!(LinearModel::fit(&[], &[]).is_err());
        assert!(LinearModel::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_err());
        assert!(LinearModel::fit(&[vec![1.0]], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_linear_fit() {
        let (slope, intercept) = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);

        assert!(linear_fit(&[1.0], &[1.0]).is_none());
        assert!(linear_fit(&[2.0, 2.0], &[1.0, 5.0]).is_none());
    }
}
