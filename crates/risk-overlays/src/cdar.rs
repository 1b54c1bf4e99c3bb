//! Conditional Drawdown at Risk.
//!
//! CVaR's analogue on the drawdown distribution: the expected severity
//! of drawdowns beyond the alpha percentile. As alpha approaches 1 it
//! converges to the maximum drawdown; toward 0, the average drawdown.

use scoring_core::ScoringError;
use serde::{Deserialize, Serialize};

use crate::stats::{mean, percentile};

/// Result from a CDaR calculation. All drawdowns are positive magnitudes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdarResult {
    pub cdar: f64,
    /// Drawdown-at-Risk threshold.
    pub dar: f64,
    pub alpha: f64,
    pub max_drawdown: f64,
    pub avg_drawdown: f64,
    pub current_drawdown: f64,
    pub n_observations: usize,
    pub n_drawdown_periods: usize,
}

/// Conditional Drawdown at Risk calculator.
///
/// Construction fails on an alpha outside (0, 1).
#[derive(Debug, Clone, Copy)]
pub struct CdarCalculator {
    alpha: f64,
}

impl CdarCalculator {
    pub fn new(alpha: f64) -> Result<Self, ScoringError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ScoringError::InvalidConfiguration(format!(
                "CDaR alpha must be in (0, 1), got {alpha}"
            )));
        }
        Ok(Self { alpha })
    }

    /// Drawdown series from returns: running-max shortfall of the
    /// cumulative wealth curve, as positive fractions.
    pub fn compute_drawdowns(&self, returns: &[f64]) -> Vec<f64> {
        let clean: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        if clean.len() < 2 {
            return vec![0.0];
        }

        let mut drawdowns = Vec::with_capacity(clean.len());
        let mut wealth = 1.0;
        let mut peak = f64::MIN;
        for r in clean {
            wealth *= 1.0 + r;
            if wealth > peak {
                peak = wealth;
            }
            drawdowns.push((peak - wealth) / peak);
        }
        drawdowns
    }

    fn count_drawdown_periods(&self, drawdowns: &[f64]) -> usize {
        let mut periods = 0;
        let mut in_dd = false;
        for &dd in drawdowns {
            let now_in = dd > 1e-8;
            if now_in && !in_dd {
                periods += 1;
            }
            in_dd = now_in;
        }
        periods
    }

    /// Historical CDaR: E[DD | DD >= DaR].
    pub fn historical_cdar(&self, drawdowns: &[f64]) -> f64 {
        if drawdowns.len() < 2 {
            return 0.0;
        }

        let dar = percentile(drawdowns, self.alpha * 100.0);
        let tail: Vec<f64> = drawdowns.iter().copied().filter(|&d| d >= dar).collect();

        if tail.is_empty() {
            dar
        } else {
            mean(&tail)
        }
    }

    /// Compute CDaR from a return series.
    pub fn compute(&self, returns: &[f64]) -> CdarResult {
        let clean: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        let n = clean.len();

        if n < 10 {
            return CdarResult {
                cdar: 0.0,
                dar: 0.0,
                alpha: self.alpha,
                max_drawdown: 0.0,
                avg_drawdown: 0.0,
                current_drawdown: 0.0,
                n_observations: n,
                n_drawdown_periods: 0,
            };
        }

        let drawdowns = self.compute_drawdowns(&clean);
        let cdar = self.historical_cdar(&drawdowns);
        let dar = percentile(&drawdowns, self.alpha * 100.0);
        let max_dd = drawdowns.iter().copied().fold(0.0, f64::max);
        let avg_dd = mean(&drawdowns);
        let current_dd = drawdowns[drawdowns.len() - 1];

        CdarResult {
            cdar,
            dar,
            alpha: self.alpha,
            max_drawdown: max_dd,
            avg_drawdown: avg_dd,
            current_drawdown: current_dd,
            n_observations: n,
            n_drawdown_periods: self.count_drawdown_periods(&drawdowns),
        }
    }
}
