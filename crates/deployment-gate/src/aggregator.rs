//! Composite risk overlay.
//!
//! Folds the independent risk detectors (EBP, turbulence, momentum
//! crash) into one composite risk score, classified into a regime that
//! maps to an optional DCS penalty. Disabled by default; when disabled
//! the DCS is untouched.

use std::fmt;

use risk_overlays::{EbpRegime, EbpSignal, MomentumCrashSignal, TurbulenceRegime, TurbulenceSignal};
use scoring_core::AggregatorConfig;
use serde::{Deserialize, Serialize};

/// Aggregated risk regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRegime {
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "ELEVATED")]
    Elevated,
    #[serde(rename = "NORMAL")]
    Normal,
}

impl RiskRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskRegime::HighRisk => "HIGH_RISK",
            RiskRegime::Elevated => "ELEVATED",
            RiskRegime::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for RiskRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result from composite risk aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeRisk {
    /// Aggregated risk score in [0, 1].
    pub composite_score: f64,
    pub regime: RiskRegime,
    pub ebp_contrib: f64,
    pub turbulence_contrib: f64,
    pub crash_contrib: f64,
    /// Points subtracted from DCS, non-negative.
    pub dcs_penalty: f64,
}

/// Aggregates risk module signals into a composite risk overlay.
#[derive(Debug, Clone, Copy)]
pub struct SignalAggregator {
    config: AggregatorConfig,
}

impl SignalAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    fn normalize_ebp(&self, signal: Option<&EbpSignal>) -> f64 {
        match signal {
            None => 0.0,
            Some(s) => match s.ebp_regime {
                EbpRegime::HighRisk => 1.0,
                EbpRegime::Elevated => 0.6,
                EbpRegime::Normal => 0.3,
                EbpRegime::Accommodative | EbpRegime::Unavailable => 0.0,
            },
        }
    }

    fn normalize_turbulence(&self, signal: Option<&TurbulenceSignal>) -> f64 {
        let signal = match signal {
            None => return 0.0,
            Some(s) => s,
        };

        // Prefer the raw percentile when available
        if let Some(pctl) = signal.turbulence_percentile {
            return pctl.clamp(0.0, 1.0);
        }

        match signal.turbulence_regime {
            TurbulenceRegime::Turbulent => 0.9,
            TurbulenceRegime::Elevated => 0.6,
            TurbulenceRegime::Calm => 0.1,
            TurbulenceRegime::Unavailable => 0.0,
        }
    }

    fn normalize_crash(&self, signal: Option<&MomentumCrashSignal>) -> f64 {
        match signal {
            None => 0.0,
            Some(s) => s.crash_probability.clamp(0.0, 1.0),
        }
    }

    fn classify_regime(&self, composite: f64) -> RiskRegime {
        if composite >= self.config.high_risk_threshold {
            RiskRegime::HighRisk
        } else if composite >= self.config.elevated_threshold {
            RiskRegime::Elevated
        } else {
            RiskRegime::Normal
        }
    }

    fn penalty(&self, regime: RiskRegime) -> f64 {
        match regime {
            RiskRegime::HighRisk => self.config.high_risk_penalty,
            RiskRegime::Elevated => self.config.elevated_penalty,
            RiskRegime::Normal => 0.0,
        }
    }

    /// Weighted composite of the normalized risk signals, clamped to
    /// [0, 1], with regime and DCS penalty.
    pub fn compute_composite_risk(
        &self,
        ebp: Option<&EbpSignal>,
        turbulence: Option<&TurbulenceSignal>,
        crash: Option<&MomentumCrashSignal>,
    ) -> CompositeRisk {
        let ebp_contrib = self.config.ebp_weight * self.normalize_ebp(ebp);
        let turbulence_contrib = self.config.turbulence_weight * self.normalize_turbulence(turbulence);
        let crash_contrib = self.config.crash_weight * self.normalize_crash(crash);

        let composite = (ebp_contrib + turbulence_contrib + crash_contrib).clamp(0.0, 1.0);
        let regime = self.classify_regime(composite);

        CompositeRisk {
            composite_score: composite,
            regime,
            ebp_contrib,
            turbulence_contrib,
            crash_contrib,
            dcs_penalty: self.penalty(regime),
        }
    }

    /// Apply the risk overlay penalty to a DCS score, clamped to [0, 100].
    pub fn apply_risk_overlay(&self, dcs: f64, composite: &CompositeRisk) -> f64 {
        (dcs - composite.dcs_penalty).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use risk_overlays::{CrashRegime, EbpTrend};

    fn aggregator() -> SignalAggregator {
        SignalAggregator::new(AggregatorConfig::default())
    }

    fn ebp(regime: EbpRegime) -> EbpSignal {
        EbpSignal {
            ebp_value: Some(0.5),
            ebp_regime: regime,
            ebp_percentile: Some(0.5),
            ebp_3m_change: None,
            ebp_trend: EbpTrend::Unknown,
        }
    }

    fn turbulence(percentile: Option<f64>, regime: TurbulenceRegime) -> TurbulenceSignal {
        TurbulenceSignal {
            turbulence_value: Some(10.0),
            turbulence_percentile: percentile,
            is_turbulent: false,
            turbulence_regime: regime,
            rolling_mean: None,
        }
    }

    fn crash(probability: f64) -> MomentumCrashSignal {
        MomentumCrashSignal {
            is_bear_market: probability > 0.5,
            bear_indicator: 0.0,
            cumulative_24m_return: None,
            momentum_weight: 1.0,
            wml_variance: None,
            crash_probability: probability,
            regime: CrashRegime::Normal,
        }
    }

    #[test]
    fn test_all_none_is_normal_with_zero_penalty() {
        let result = aggregator().compute_composite_risk(None, None, None);
        assert_eq!(result.regime, RiskRegime::Normal);
        assert_relative_eq!(result.composite_score, 0.0);
        assert_relative_eq!(result.dcs_penalty, 0.0);
        assert_relative_eq!(aggregator().apply_risk_overlay(72.0, &result), 72.0);
    }

    #[test]
    fn test_high_risk_scenario() {
        let agg = aggregator();
        let result = agg.compute_composite_risk(
            Some(&ebp(EbpRegime::HighRisk)),
            Some(&turbulence(Some(0.92), TurbulenceRegime::Turbulent)),
            Some(&crash(0.85)),
        );
        assert!(result.composite_score >= 0.70);
        assert_eq!(result.regime, RiskRegime::HighRisk);
        assert_relative_eq!(result.dcs_penalty, 10.0);
        assert_relative_eq!(agg.apply_risk_overlay(72.0, &result), 62.0);
    }

    #[test]
    fn test_elevated_band() {
        let agg = aggregator();
        let result = agg.compute_composite_risk(
            Some(&ebp(EbpRegime::Elevated)),
            Some(&turbulence(Some(0.60), TurbulenceRegime::Elevated)),
            Some(&crash(0.10)),
        );
        assert!(result.composite_score >= 0.40);
        assert!(result.composite_score < 0.70);
        assert_eq!(result.regime, RiskRegime::Elevated);
        assert_relative_eq!(result.dcs_penalty, 5.0);
    }

    #[test]
    fn test_turbulence_percentile_preferred_over_regime() {
        let agg = aggregator();
        let with_pctl = agg.compute_composite_risk(
            None,
            Some(&turbulence(Some(0.2), TurbulenceRegime::Turbulent)),
            None,
        );
        assert_relative_eq!(with_pctl.turbulence_contrib, 0.30 * 0.2);

        let regime_only = agg.compute_composite_risk(
            None,
            Some(&turbulence(None, TurbulenceRegime::Turbulent)),
            None,
        );
        assert_relative_eq!(regime_only.turbulence_contrib, 0.30 * 0.9);
    }

    #[test]
    fn test_overlay_floors_at_zero() {
        let agg = aggregator();
        let result = agg.compute_composite_risk(
            Some(&ebp(EbpRegime::HighRisk)),
            Some(&turbulence(Some(1.0), TurbulenceRegime::Turbulent)),
            Some(&crash(1.0)),
        );
        assert_relative_eq!(agg.apply_risk_overlay(4.0, &result), 0.0);
    }
}
