//! Financial turbulence index.
//!
//! Measures the statistical unusualness of multi-asset returns with the
//! Mahalanobis distance against a rolling mean/covariance window. When
//! returns deviate from their historical correlation structure,
//! turbulence rises.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::stats::{mean, percentile_rank};

/// Turbulence regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbulenceRegime {
    #[serde(rename = "CALM")]
    Calm,
    #[serde(rename = "ELEVATED")]
    Elevated,
    #[serde(rename = "TURBULENT")]
    Turbulent,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
}

/// Result from turbulence analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurbulenceSignal {
    pub turbulence_value: Option<f64>,
    pub turbulence_percentile: Option<f64>,
    pub is_turbulent: bool,
    pub turbulence_regime: TurbulenceRegime,
    /// Mean distance over the last 21 computed days.
    pub rolling_mean: Option<f64>,
}

impl TurbulenceSignal {
    fn unavailable() -> Self {
        Self {
            turbulence_value: None,
            turbulence_percentile: None,
            is_turbulent: false,
            turbulence_regime: TurbulenceRegime::Unavailable,
            rolling_mean: None,
        }
    }
}

/// Mahalanobis turbulence index over a multi-asset price panel.
#[derive(Debug, Clone, Copy)]
pub struct TurbulenceIndex {
    pub window: usize,
    pub threshold_pctl: f64,
    pub min_assets: usize,
}

impl Default for TurbulenceIndex {
    fn default() -> Self {
        Self {
            window: 252,
            threshold_pctl: 0.75,
            min_assets: 3,
        }
    }
}

impl TurbulenceIndex {
    pub fn new(window: usize, threshold_pctl: f64, min_assets: usize) -> Self {
        Self {
            window,
            threshold_pctl,
            min_assets,
        }
    }

    /// Compute the turbulence signal from per-asset price series.
    ///
    /// Series are aligned by truncating to the shortest length. Fewer
    /// than `min_assets` series, or too little history for the rolling
    /// window, yields the unavailable sentinel.
    pub fn compute(&self, price_series: &[Vec<f64>]) -> TurbulenceSignal {
        let n_assets = price_series.len();
        if n_assets < self.min_assets {
            return TurbulenceSignal::unavailable();
        }

        let t = price_series.iter().map(|s| s.len()).min().unwrap_or(0);
        if t < 2 {
            return TurbulenceSignal::unavailable();
        }

        // Log returns, row-major: returns[day][asset]
        let n_rets = t - 1;
        let mut returns = vec![vec![0.0; n_assets]; n_rets];
        for (a, series) in price_series.iter().enumerate() {
            let tail = &series[series.len() - t..];
            for i in 1..t {
                returns[i - 1][a] = (tail[i] / tail[i - 1]).ln();
            }
        }

        if n_rets < self.window + 1 {
            return TurbulenceSignal::unavailable();
        }

        let mut distances = Vec::with_capacity(n_rets - self.window);
        for i in self.window..n_rets {
            let window_rows = &returns[i - self.window..i];
            distances.push(self.mahalanobis_distance(window_rows, &returns[i], n_assets));
        }

        if distances.is_empty() {
            return TurbulenceSignal::unavailable();
        }

        let current = distances[distances.len() - 1];
        let pctl = percentile_rank(&distances, current);

        let lookback = distances.len().min(21);
        let rolling_mean = mean(&distances[distances.len() - lookback..]);

        let is_turbulent = pctl >= self.threshold_pctl;
        let regime = if pctl >= 0.90 {
            TurbulenceRegime::Turbulent
        } else if pctl >= self.threshold_pctl {
            TurbulenceRegime::Elevated
        } else {
            TurbulenceRegime::Calm
        };

        TurbulenceSignal {
            turbulence_value: Some(current),
            turbulence_percentile: Some(pctl),
            is_turbulent,
            turbulence_regime: regime,
            rolling_mean: Some(rolling_mean),
        }
    }

    /// d = (y - mu)' inv(Sigma + eps I) (y - mu) over the estimation window.
    fn mahalanobis_distance(&self, window_rows: &[Vec<f64>], current: &[f64], k: usize) -> f64 {
        let n = window_rows.len() as f64;

        let mut mu = vec![0.0; k];
        for row in window_rows {
            for (j, v) in row.iter().enumerate() {
                mu[j] += v;
            }
        }
        for m in mu.iter_mut() {
            *m /= n;
        }

        // Sample covariance with the ridge term for near-singular windows
        let mut cov = DMatrix::zeros(k, k);
        for row in window_rows {
            for a in 0..k {
                for b in 0..k {
                    cov[(a, b)] += (row[a] - mu[a]) * (row[b] - mu[b]);
                }
            }
        }
        cov /= n - 1.0;
        for d in 0..k {
            cov[(d, d)] += 1e-8;
        }

        let diff = DVector::from_iterator(k, current.iter().zip(mu.iter()).map(|(c, m)| c - m));
        match cov.try_inverse() {
            Some(inv) => (diff.transpose() * inv * diff)[(0, 0)],
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_walk_panel(n_assets: usize, n_days: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n_assets)
            .map(|_| {
                let mut price = 100.0;
                (0..n_days)
                    .map(|_| {
                        price *= 1.0 + rng.gen_range(-0.01..0.011);
                        price
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_too_few_assets_unavailable() {
        let ti = TurbulenceIndex::default();
        let panel = random_walk_panel(2, 400, 1);
        let signal = ti.compute(&panel);
        assert_eq!(signal.turbulence_regime, TurbulenceRegime::Unavailable);
    }

    #[test]
    fn test_short_history_unavailable() {
        let ti = TurbulenceIndex::default();
        let panel = random_walk_panel(4, 100, 2);
        let signal = ti.compute(&panel);
        assert_eq!(signal.turbulence_regime, TurbulenceRegime::Unavailable);
    }

    #[test]
    fn test_calm_panel_produces_distance_and_percentile() {
        let ti = TurbulenceIndex::new(60, 0.75, 3);
        let panel = random_walk_panel(4, 260, 3);
        let signal = ti.compute(&panel);
        assert!(signal.turbulence_value.is_some());
        let pctl = signal.turbulence_percentile.unwrap();
        assert!((0.0..=1.0).contains(&pctl));
        assert!(signal.rolling_mean.unwrap() >= 0.0);
    }

    #[test]
    fn test_shock_day_ranks_high() {
        let ti = TurbulenceIndex::new(60, 0.75, 3);
        let mut panel = random_walk_panel(4, 260, 4);
        // Slam a correlated 10% crash onto the final day
        for series in panel.iter_mut() {
            let last = *series.last().unwrap();
            *series.last_mut().unwrap() = last * 0.90;
        }
        let signal = ti.compute(&panel);
        assert!(signal.turbulence_percentile.unwrap() >= 0.90);
        assert_eq!(signal.turbulence_regime, TurbulenceRegime::Turbulent);
        assert!(signal.is_turbulent);
    }
}
