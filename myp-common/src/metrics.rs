//! Regression evaluation metrics

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Held-out evaluation numbers computed once at training time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    pub n_train: usize,
    pub n_test: usize,
}

impl ModelMetrics {
    /// Evaluate predictions against ground truth
    pub fn evaluate(y_true: &[f64], y_pred: &[f64], n_train: usize) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::InvalidInput(format!(
                "length mismatch: {} targets vs {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(Error::InvalidInput("cannot evaluate an empty test set".to_string()));
        }

        Ok(Self {
            r2_score: r2_score(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            rmse: mean_squared_error(y_true, y_pred).sqrt(),
            n_train,
            n_test: y_true.len(),
        })
    }

    /// Half width of the confidence band in whole years
    pub fn band_years(&self) -> i32 {
        self.rmse.round() as i32
    }
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let total: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    total / y_true.len() as f64
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let total: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    total / y_true.len() as f64
}

/// Coefficient of determination
///
/// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let y = [1970.0, 1980.0, 1990.0];
        let m = ModelMetrics::evaluate(&y, &y, 10).unwrap();
        assert_eq!(m.r2_score, 1.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.n_test, 3);
        assert_eq!(m.n_train, 10);
    }

    #[test]
    fn test_known_errors() {
        let y_true = [2000.0, 2010.0];
        let y_pred = [2003.0, 2006.0];
        let m = ModelMetrics::evaluate(&y_true, &y_pred, 0).unwrap();
        assert!((m.mae - 3.5).abs() < 1e-12);
        assert!((m.rmse - 12.5f64.sqrt()).abs() < 1e-12);
        // ss_tot = 50, ss_res = 25
        assert!((m.r2_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_band_rounds_to_whole_years() {
        let m = ModelMetrics { r2_score: 0.68, mae: 10.72, rmse: 14.69, n_train: 0, n_test: 0 };
        assert_eq!(m.band_years(), 15);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        assert!(ModelMetrics::evaluate(&[1.0, 2.0], &[1.0], 0).is_err());
        assert!(ModelMetrics::evaluate(&[], &[], 0).is_err());
    }
}
