//! Inverse volatility weighting.
//!
//! Allocates capital inversely proportional to each asset's variance so
//! every position contributes roughly equal risk. eta = 1 is standard
//! inverse-variance; eta = 0.5 is inverse-vol.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Result from inverse volatility allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverseVolResult {
    /// Ticker to weight; weights sum to 1.
    pub weights: HashMap<String, f64>,
    /// Ticker to annualized volatility.
    pub volatilities: HashMap<String, f64>,
    pub eta: f64,
    pub n_assets: usize,
}

impl InverseVolResult {
    fn empty(eta: f64) -> Self {
        Self {
            weights: HashMap::new(),
            volatilities: HashMap::new(),
            eta,
            n_assets: 0,
        }
    }
}

/// Inverse volatility portfolio weighter.
#[derive(Debug, Clone, Copy)]
pub struct InverseVolWeighter {
    pub eta: f64,
    pub window: usize,
    pub min_periods: usize,
    pub annualization_factor: f64,
}

impl Default for InverseVolWeighter {
    fn default() -> Self {
        Self {
            eta: 1.0,
            window: 120,
            min_periods: 60,
            annualization_factor: 252.0,
        }
    }
}

impl InverseVolWeighter {
    pub fn new(eta: f64, window: usize, min_periods: usize) -> Self {
        Self {
            eta,
            window,
            min_periods,
            annualization_factor: 252.0,
        }
    }

    fn annualized_vol(&self, returns: &[f64]) -> f64 {
        let tail = if returns.len() > self.window {
            &returns[returns.len() - self.window..]
        } else {
            returns
        };
        let n = tail.len() as f64;
        if n < 2.0 {
            return 0.0;
        }
        let mean = tail.iter().sum::<f64>() / n;
        let variance = tail.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt() * self.annualization_factor.sqrt()
    }

    /// Compute weights w_i proportional to (1/sigma_i^2)^eta, normalized
    /// to sum to 1. Assets with fewer than `min_periods` observations
    /// are dropped; volatility is floored to avoid division by zero.
    pub fn compute_weights(
        &self,
        returns: &[(String, Vec<f64>)],
        exclude: &[String],
    ) -> InverseVolResult {
        let valid: Vec<(&String, &Vec<f64>)> = returns
            .iter()
            .filter(|(name, series)| {
                !exclude.contains(name) && series.len() >= self.min_periods
            })
            .map(|(name, series)| (name, series))
            .collect();

        if valid.is_empty() {
            return InverseVolResult::empty(self.eta);
        }

        let vol_floor = 1e-6;
        let vols: Vec<f64> = valid
            .iter()
            .map(|(_, series)| self.annualized_vol(series).max(vol_floor))
            .collect();

        let inv_var: Vec<f64> = vols.iter().map(|v| (1.0 / (v * v)).powf(self.eta)).collect();
        let total: f64 = inv_var.iter().sum();

        let weights: HashMap<String, f64> = if total <= 0.0 {
            let equal = 1.0 / valid.len() as f64;
            valid.iter().map(|(name, _)| ((*name).clone(), equal)).collect()
        } else {
            valid
                .iter()
                .zip(inv_var.iter())
                .map(|((name, _), iv)| ((*name).clone(), iv / total))
                .collect()
        };

        let volatilities: HashMap<String, f64> = valid
            .iter()
            .zip(vols.iter())
            .map(|((name, _), v)| ((*name).clone(), *v))
            .collect();

        InverseVolResult {
            n_assets: weights.len(),
            weights,
            volatilities,
            eta: self.eta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(vol_scale: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| vol_scale * if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect()
    }

    #[test]
    fn test_weights_sum_to_one_and_positive() {
        let ivw = InverseVolWeighter::default();
        let returns = vec![
            ("A".to_string(), series(1.0, 200)),
            ("B".to_string(), series(2.0, 200)),
            ("C".to_string(), series(0.5, 200)),
        ];
        let result = ivw.compute_weights(&returns, &[]);
        let total: f64 = result.weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
        assert!(result.weights.values().all(|&w| w > 0.0));
        assert_eq!(result.n_assets, 3);
    }

    #[test]
    fn test_low_vol_gets_higher_weight() {
        let ivw = InverseVolWeighter::default();
        let returns = vec![
            ("calm".to_string(), series(0.5, 200)),
            ("wild".to_string(), series(3.0, 200)),
        ];
        let result = ivw.compute_weights(&returns, &[]);
        assert!(result.weights["calm"] > result.weights["wild"]);
    }

    #[test]
    fn test_equal_vol_gives_equal_weight() {
        let ivw = InverseVolWeighter::default();
        let returns = vec![
            ("A".to_string(), series(1.0, 200)),
            ("B".to_string(), series(1.0, 200)),
        ];
        let result = ivw.compute_weights(&returns, &[]);
        assert_relative_eq!(result.weights["A"], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_min_periods_drops_thin_series() {
        let ivw = InverseVolWeighter::default();
        let returns = vec![
            ("full".to_string(), series(1.0, 200)),
            ("thin".to_string(), series(1.0, 10)),
        ];
        let result = ivw.compute_weights(&returns, &[]);
        assert_eq!(result.n_assets, 1);
        assert!(!result.weights.contains_key("thin"));
    }

    #[test]
    fn test_exclusions_respected() {
        let ivw = InverseVolWeighter::default();
        let returns = vec![
            ("A".to_string(), series(1.0, 200)),
            ("B".to_string(), series(1.0, 200)),
        ];
        let result = ivw.compute_weights(&returns, &["B".to_string()]);
        assert_eq!(result.n_assets, 1);
        assert!(result.weights.contains_key("A"));
    }

    #[test]
    fn test_empty_input() {
        let ivw = InverseVolWeighter::default();
        let result = ivw.compute_weights(&[], &[]);
        assert_eq!(result.n_assets, 0);
        assert!(result.weights.is_empty());
    }
}
