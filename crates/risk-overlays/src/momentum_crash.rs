//! Momentum crash protection.
//!
//! When the cumulative 24-month market return is negative, momentum
//! strategies face elevated crash risk; exposure is scaled down in
//! proportion to the forecast crash probability.

use serde::{Deserialize, Serialize};

use crate::stats::sample_var;

/// Momentum crash regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashRegime {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
}

/// Result from momentum crash analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumCrashSignal {
    pub is_bear_market: bool,
    pub bear_indicator: f64,
    pub cumulative_24m_return: Option<f64>,
    /// Dynamic momentum weight multiplier in [min_weight, 1].
    pub momentum_weight: f64,
    /// Winners-minus-losers return variance estimate.
    pub wml_variance: Option<f64>,
    pub crash_probability: f64,
    pub regime: CrashRegime,
}

/// Conditional momentum crash protection.
#[derive(Debug, Clone, Copy)]
pub struct MomentumCrashProtection {
    pub lookback_months: usize,
    pub crash_threshold: f64,
    pub min_weight: f64,
}

impl Default for MomentumCrashProtection {
    fn default() -> Self {
        Self {
            lookback_months: 24,
            crash_threshold: 0.02,
            min_weight: 0.25,
        }
    }
}

impl MomentumCrashProtection {
    pub fn new(lookback_months: usize, crash_threshold: f64, min_weight: f64) -> Self {
        Self {
            lookback_months,
            crash_threshold,
            min_weight,
        }
    }

    /// Bear indicator: cumulative return over the lookback window < 0.
    fn bear_indicator(&self, market_returns: &[f64]) -> (bool, Option<f64>) {
        if market_returns.len() < self.lookback_months {
            return (false, None);
        }
        let recent = &market_returns[market_returns.len() - self.lookback_months..];
        let cum: f64 = recent.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
        (cum < 0.0, Some(cum))
    }

    /// WML variance over the last 126 observations.
    fn estimate_wml_variance(&self, wml_returns: &[f64]) -> Option<f64> {
        if wml_returns.len() < 60 {
            return None;
        }
        let lookback = wml_returns.len().min(126);
        Some(sample_var(&wml_returns[wml_returns.len() - lookback..]))
    }

    /// Crash probability: low baseline in bull markets; in bears, scales
    /// with the variance level against the crash threshold.
    fn forecast_crash_probability(&self, is_bear: bool, wml_variance: Option<f64>) -> f64 {
        if !is_bear {
            return 0.05;
        }
        match wml_variance {
            None => 0.30,
            Some(var) => {
                let base = 0.20;
                let variance_contrib = (var / self.crash_threshold).min(1.0) * 0.60;
                (base + variance_contrib).min(0.95)
            }
        }
    }

    fn dynamic_weight(&self, is_bear: bool, crash_probability: f64) -> f64 {
        if !is_bear {
            return 1.0;
        }
        (1.0 - crash_probability * 0.75).max(self.min_weight)
    }

    /// Compute the crash-protection signal from monthly market returns
    /// and, when available, winners-minus-losers factor returns (market
    /// variance proxies for WML otherwise).
    pub fn compute_dynamic_weight(
        &self,
        market_returns: &[f64],
        wml_returns: Option<&[f64]>,
    ) -> MomentumCrashSignal {
        if market_returns.len() < 6 {
            return MomentumCrashSignal {
                is_bear_market: false,
                bear_indicator: 0.0,
                cumulative_24m_return: None,
                momentum_weight: 1.0,
                wml_variance: None,
                crash_probability: 0.05,
                regime: CrashRegime::Unavailable,
            };
        }

        let (is_bear, cum_return) = self.bear_indicator(market_returns);

        let wml_var = match wml_returns {
            Some(wml) if wml.len() >= 60 => self.estimate_wml_variance(wml),
            _ => self.estimate_wml_variance(market_returns),
        };

        let crash_prob = self.forecast_crash_probability(is_bear, wml_var);
        let weight = self.dynamic_weight(is_bear, crash_prob);

        let regime = if crash_prob >= 0.50 {
            CrashRegime::HighRisk
        } else if crash_prob >= 0.20 {
            CrashRegime::Caution
        } else {
            CrashRegime::Normal
        };

        MomentumCrashSignal {
            is_bear_market: is_bear,
            bear_indicator: if is_bear { 1.0 } else { 0.0 },
            cumulative_24m_return: cum_return,
            momentum_weight: weight,
            wml_variance: wml_var,
            crash_probability: crash_prob,
            regime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_on_short_series() {
        let mcp = MomentumCrashProtection::default();
        let signal = mcp.compute_dynamic_weight(&[0.01, 0.02], None);
        assert_eq!(signal.regime, CrashRegime::Unavailable);
        assert_eq!(signal.momentum_weight, 1.0);
    }

    #[test]
    fn test_bull_market_full_weight() {
        let mcp = MomentumCrashProtection::default();
        let returns = vec![0.01; 120];
        let signal = mcp.compute_dynamic_weight(&returns, None);
        assert!(!signal.is_bear_market);
        assert_eq!(signal.momentum_weight, 1.0);
        assert_eq!(signal.crash_probability, 0.05);
        assert_eq!(signal.regime, CrashRegime::Normal);
    }

    #[test]
    fn test_bear_market_reduces_weight() {
        let mcp = MomentumCrashProtection::default();
        // Alternating but net-negative months keep variance positive
        let returns: Vec<f64> = (0..120)
            .map(|i| if i % 2 == 0 { -0.06 } else { 0.02 })
            .collect();
        let signal = mcp.compute_dynamic_weight(&returns, None);
        assert!(signal.is_bear_market);
        assert_eq!(signal.bear_indicator, 1.0);
        assert!(signal.crash_probability >= 0.20);
        assert!(signal.momentum_weight < 1.0);
        assert!(signal.momentum_weight >= mcp.min_weight);
    }

    #[test]
    fn test_crash_probability_capped() {
        let mcp = MomentumCrashProtection::new(24, 1e-9, 0.25);
        let returns: Vec<f64> = (0..120)
            .map(|i| if i % 2 == 0 { -0.10 } else { 0.05 })
            .collect();
        let signal = mcp.compute_dynamic_weight(&returns, None);
        assert!(signal.crash_probability <= 0.95);
        assert_eq!(signal.regime, CrashRegime::HighRisk);
    }

    #[test]
    fn test_wml_series_preferred_over_market() {
        let mcp = MomentumCrashProtection::default();
        let market: Vec<f64> = (0..120)
            .map(|i| if i % 2 == 0 { -0.05 } else { 0.01 })
            .collect();
        let wml = vec![0.001; 120];
        let with_wml = mcp.compute_dynamic_weight(&market, Some(&wml));
        let without = mcp.compute_dynamic_weight(&market, None);
        assert!(with_wml.wml_variance.unwrap() < without.wml_variance.unwrap());
    }
}
