//! Per-column standardization of numeric feature matrices.

use serde::{Deserialize, Serialize};

/// Column-wise `(x - mean) / std` scaler. Zero-variance columns are scaled
/// by 1 so constant features map to zero instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit column statistics over `rows`, each of width `n_cols`.
    pub fn fit(rows: &[Vec<f64>], n_cols: usize) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = vec![0.0; n_cols];
        for row in rows {
            for (col, value) in row.iter().enumerate() {
                means[col] += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; n_cols];
        for row in rows {
            for (col, value) in row.iter().enumerate() {
                let delta = value - means[col];
                stds[col] += delta * delta;
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        Self { means, stds }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect()
    }

    pub fn n_cols(&self) -> usize {
        self.means.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_and_scales_columns() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let scaler = StandardScaler::fit(&rows, 2);

        let transformed: Vec<Vec<f64>> =
            rows.iter().map(|row| scaler.transform_row(row)).collect();

        // First column: mean 3, population std sqrt(8/3).
        let expected = (8.0f64 / 3.0).sqrt();
        assert!((transformed[0][0] + 2.0 / expected).abs() < 1e-12);
        assert!((transformed[1][0]).abs() < 1e-12);
        assert!((transformed[2][0] - 2.0 / expected).abs() < 1e-12);

        // Constant column maps to zero rather than NaN.
        for row in &transformed {
            assert_eq!(row[1], 0.0);
        }
    }

    #[test]
    fn transformed_training_columns_have_zero_mean() {
        let rows = vec![vec![2.0], vec![4.0], vec![9.0], vec![1.0]];
        let scaler = StandardScaler::fit(&rows, 1);
        let sum: f64 = rows.iter().map(|row| scaler.transform_row(row)[0]).sum();
        assert!(sum.abs() < 1e-12);
    }
}
