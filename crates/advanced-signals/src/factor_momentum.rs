//! Factor momentum signal.
//!
//! Measures the breadth and strength of positive trailing factor
//! returns across non-momentum factors. Broadly positive factors mean
//! supportive conditions; mixed or negative factors mean momentum
//! strategies face elevated crash risk. Informational overlay only,
//! never modifies DCS.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Factor momentum regime from breadth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorRegime {
    #[serde(rename = "BROAD_POSITIVE")]
    BroadPositive,
    #[serde(rename = "MIXED")]
    Mixed,
    #[serde(rename = "BROAD_NEGATIVE")]
    BroadNegative,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
}

/// Result from factor momentum analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorMomentumResult {
    /// Fraction of factors with a positive trailing return, in [0, 1].
    pub breadth: f64,
    /// Mean(positive) - mean(negative) cumulative return spread.
    pub momentum_strength: f64,
    pub long_factors: Vec<String>,
    pub short_factors: Vec<String>,
    pub regime: FactorRegime,
    pub n_factors: usize,
}

impl FactorMomentumResult {
    fn unavailable() -> Self {
        Self {
            breadth: 0.5,
            momentum_strength: 0.0,
            long_factors: Vec::new(),
            short_factors: Vec::new(),
            regime: FactorRegime::Unavailable,
            n_factors: 0,
        }
    }
}

/// Factor momentum signal over monthly factor returns.
#[derive(Debug, Clone, Copy)]
pub struct FactorMomentumSignal {
    pub lookback_months: usize,
    pub breadth_threshold_high: f64,
    pub breadth_threshold_low: f64,
}

impl Default for FactorMomentumSignal {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            breadth_threshold_high: 0.65,
            breadth_threshold_low: 0.35,
        }
    }
}

impl FactorMomentumSignal {
    pub fn new(
        lookback_months: usize,
        breadth_threshold_high: f64,
        breadth_threshold_low: f64,
    ) -> Self {
        Self {
            lookback_months,
            breadth_threshold_high,
            breadth_threshold_low,
        }
    }

    fn cumulative_return(&self, monthly: &[f64]) -> f64 {
        let tail = if monthly.len() > self.lookback_months {
            &monthly[monthly.len() - self.lookback_months..]
        } else {
            monthly
        };
        tail.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
    }

    fn classify_regime(&self, breadth: f64) -> FactorRegime {
        if breadth >= self.breadth_threshold_high {
            FactorRegime::BroadPositive
        } else if breadth <= self.breadth_threshold_low {
            FactorRegime::BroadNegative
        } else {
            FactorRegime::Mixed
        }
    }

    /// Compute the signal from named monthly factor return series.
    pub fn compute_signal(&self, factor_returns: &[(String, Vec<f64>)]) -> FactorMomentumResult {
        if factor_returns.len() < 2 {
            return FactorMomentumResult::unavailable();
        }

        let cum: Vec<(String, f64)> = factor_returns
            .iter()
            .map(|(name, series)| (name.clone(), self.cumulative_return(series)))
            .collect();
        let n_factors = cum.len();

        let mut long_factors = Vec::new();
        let mut short_factors = Vec::new();
        let mut pos_returns = Vec::new();
        let mut neg_returns = Vec::new();
        for (name, r) in cum {
            if r > 0.0 {
                long_factors.push(name);
                pos_returns.push(r);
            } else {
                short_factors.push(name);
                neg_returns.push(r);
            }
        }

        let breadth = pos_returns.len() as f64 / n_factors as f64;
        let mean_pos = if pos_returns.is_empty() {
            0.0
        } else {
            pos_returns.iter().sum::<f64>() / pos_returns.len() as f64
        };
        let mean_neg = if neg_returns.is_empty() {
            0.0
        } else {
            neg_returns.iter().sum::<f64>() / neg_returns.len() as f64
        };

        FactorMomentumResult {
            breadth,
            momentum_strength: mean_pos - mean_neg,
            long_factors,
            short_factors,
            regime: self.classify_regime(breadth),
            n_factors,
        }
    }

    /// Proxy factor returns from cross-asset ETF monthly returns, for
    /// when academic factor data is unavailable: value, safe-haven,
    /// duration, and commodity spreads against the equity benchmark.
    pub fn compute_proxy_factors(
        etf_monthly_returns: &HashMap<String, Vec<f64>>,
    ) -> Vec<(String, Vec<f64>)> {
        let spy = match etf_monthly_returns.get("SPY") {
            Some(s) => s,
            None => return Vec::new(),
        };

        let mut factors = vec![("equity_risk".to_string(), spy.clone())];

        for (etf, factor_name) in [
            ("EFA", "value_proxy"),
            ("GLD", "safe_haven"),
            ("BND", "duration"),
            ("GSG", "commodity"),
        ] {
            if let Some(series) = etf_monthly_returns.get(etf) {
                let n = series.len().min(spy.len());
                let spread: Vec<f64> = (0..n)
                    .map(|i| series[series.len() - n + i] - spy[spy.len() - n + i])
                    .collect();
                factors.push((factor_name.to_string(), spread));
            }
        }

        factors
    }
}
