//! Conditional Value at Risk (expected shortfall).
//!
//! Historical CVaR is the mean loss beyond the VaR percentile of the
//! observed return distribution; the parametric variant assumes normal
//! returns. Both report losses as positive magnitudes.

use scoring_core::{CvarMethod, ScoringError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::stats::{mean, percentile, sample_std};

/// Result from a CVaR calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvarResult {
    /// Expected shortfall as a positive loss.
    pub cvar: f64,
    /// Value-at-Risk threshold as a positive loss.
    pub var: f64,
    pub alpha: f64,
    pub method: CvarMethod,
    pub n_observations: usize,
    pub worst_loss: f64,
    pub mean_return: f64,
    pub volatility: f64,
}

/// Conditional Value at Risk calculator.
///
/// Construction fails on an alpha outside (0.5, 1.0).
#[derive(Debug, Clone)]
pub struct CvarCalculator {
    alpha: f64,
    method: CvarMethod,
    annualize: bool,
    /// Density of the standard normal at the (1 - alpha) quantile,
    /// fixed at construction for the parametric path.
    phi_z: f64,
}

impl CvarCalculator {
    pub fn new(alpha: f64, method: CvarMethod) -> Result<Self, ScoringError> {
        if !(alpha > 0.5 && alpha < 1.0) {
            return Err(ScoringError::InvalidConfiguration(format!(
                "CVaR alpha must be in (0.5, 1.0), got {alpha}"
            )));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ScoringError::Calculation(format!("standard normal: {e}")))?;
        let z = normal.inverse_cdf(1.0 - alpha);
        let phi_z = normal.pdf(z);
        Ok(Self {
            alpha,
            method,
            annualize: false,
            phi_z,
        })
    }

    pub fn with_annualize(mut self, annualize: bool) -> Self {
        self.annualize = annualize;
        self
    }

    /// Historical (non-parametric) CVaR: -E[R | R <= VaR].
    pub fn historical_cvar(&self, returns: &[f64]) -> f64 {
        let clean = clean(returns);
        if clean.len() < 10 {
            return 0.0;
        }

        let var_threshold = percentile(&clean, (1.0 - self.alpha) * 100.0);
        let tail: Vec<f64> = clean
            .iter()
            .copied()
            .filter(|&r| r <= var_threshold)
            .collect();

        if tail.is_empty() {
            -var_threshold
        } else {
            -mean(&tail)
        }
    }

    /// Parametric CVaR under normality: -mu + sigma * phi(z) / (1 - alpha).
    pub fn parametric_cvar(&self, returns: &[f64]) -> f64 {
        let clean = clean(returns);
        if clean.len() < 10 {
            return 0.0;
        }

        let mu = mean(&clean);
        let sigma = sample_std(&clean);
        if sigma < 1e-10 {
            return 0.0;
        }

        let cvar = -mu + sigma * self.phi_z / (1.0 - self.alpha);
        cvar.max(0.0)
    }

    /// Compute CVaR using the configured method.
    pub fn compute(&self, returns: &[f64]) -> CvarResult {
        let clean = clean(returns);
        let n = clean.len();

        if n < 10 {
            return CvarResult {
                cvar: 0.0,
                var: 0.0,
                alpha: self.alpha,
                method: self.method,
                n_observations: n,
                worst_loss: 0.0,
                mean_return: 0.0,
                volatility: 0.0,
            };
        }

        let mut cvar = match self.method {
            CvarMethod::Historical => self.historical_cvar(&clean),
            CvarMethod::Parametric => self.parametric_cvar(&clean),
        };

        let mut var = -percentile(&clean, (1.0 - self.alpha) * 100.0);
        let worst_loss = -clean.iter().copied().fold(f64::INFINITY, f64::min);
        let mean_ret = mean(&clean);
        let mut vol = sample_std(&clean);

        if self.annualize {
            let factor = 252.0_f64.sqrt();
            cvar *= factor;
            var *= factor;
            vol *= factor;
        }

        CvarResult {
            cvar,
            var,
            alpha: self.alpha,
            method: self.method,
            n_observations: n,
            worst_loss,
            mean_return: mean_ret,
            volatility: vol,
        }
    }
}

fn clean(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|r| r.is_finite()).collect()
}
