//! Scoring configuration with calibrated defaults.
//!
//! Every threshold and weight the engine reads lives here, captured by value
//! at the start of a run. `ThresholdConfig::validate()` rejects contract
//! violations before any scoring begins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::types::DefenseClass;

/// Top-level DCS composition weights. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DcsWeights {
    pub mq: u32,
    pub fq: u32,
    pub to: u32,
    pub mr: u32,
    pub vc: u32,
}

impl Default for DcsWeights {
    fn default() -> Self {
        Self {
            mq: 30,
            fq: 25,
            to: 20,
            mr: 15,
            vc: 10,
        }
    }
}

impl DcsWeights {
    pub fn total(&self) -> u32 {
        self.mq + self.fq + self.to + self.mr + self.vc
    }
}

/// Momentum Quality component weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MqWeights {
    pub trend: f64,
    pub vol_adj_momentum: f64,
    pub sa_momentum: f64,
    pub relative_strength: f64,
}

impl Default for MqWeights {
    fn default() -> Self {
        Self {
            trend: 0.30,
            vol_adj_momentum: 0.25,
            sa_momentum: 0.25,
            relative_strength: 0.20,
        }
    }
}

/// FQ weights when both fundamentals and revision momentum are available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FqWithFundamentalsAndRevMom {
    pub quant: f64,
    pub profitability: f64,
    pub fcf_yield: f64,
    pub revision_momentum: f64,
    pub revisions: f64,
    pub growth: f64,
}

impl Default for FqWithFundamentalsAndRevMom {
    fn default() -> Self {
        Self {
            quant: 0.30,
            profitability: 0.22,
            fcf_yield: 0.13,
            revision_momentum: 0.15,
            revisions: 0.10,
            growth: 0.10,
        }
    }
}

/// FQ weights when only fundamentals are available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FqWithFundamentals {
    pub quant: f64,
    pub profitability: f64,
    pub fcf_yield: f64,
    pub revisions: f64,
    pub growth: f64,
}

impl Default for FqWithFundamentals {
    fn default() -> Self {
        Self {
            quant: 0.30,
            profitability: 0.22,
            fcf_yield: 0.13,
            revisions: 0.20,
            growth: 0.15,
        }
    }
}

/// FQ weights when only revision momentum is available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FqWithRevMom {
    pub quant: f64,
    pub profitability: f64,
    pub revision_momentum: f64,
    pub revisions: f64,
    pub growth: f64,
}

impl Default for FqWithRevMom {
    fn default() -> Self {
        Self {
            quant: 0.35,
            profitability: 0.25,
            revision_momentum: 0.15,
            revisions: 0.15,
            growth: 0.10,
        }
    }
}

/// Base FQ weights (ratings only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FqBase {
    pub quant: f64,
    pub profitability: f64,
    pub revisions: f64,
    pub growth: f64,
}

impl Default for FqBase {
    fn default() -> Self {
        Self {
            quant: 0.35,
            profitability: 0.25,
            revisions: 0.25,
            growth: 0.15,
        }
    }
}

/// Fundamental Quality weight schemes, keyed on data availability.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FqWeights {
    pub with_fundamentals_and_revmom: FqWithFundamentalsAndRevMom,
    pub with_fundamentals: FqWithFundamentals,
    pub with_revmom: FqWithRevMom,
    pub base: FqBase,
}

/// Blend of the rated profitability grade with gross profitability percentile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfitabilityBlend {
    pub sa_weight: f64,
    pub novy_marx_weight: f64,
}

impl Default for ProfitabilityBlend {
    fn default() -> Self {
        Self {
            sa_weight: 0.60,
            novy_marx_weight: 0.40,
        }
    }
}

/// Technical Oversold component weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToWeights {
    pub rsi: f64,
    pub sma_distance: f64,
    pub bollinger: f64,
    pub macd: f64,
}

impl Default for ToWeights {
    fn default() -> Self {
        Self {
            rsi: 0.35,
            sma_distance: 0.25,
            bollinger: 0.25,
            macd: 0.15,
        }
    }
}

/// Market Regime component weights (with breadth available).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MrWeights {
    pub vix_contrarian: f64,
    pub spy_trend: f64,
    pub breadth: f64,
}

impl Default for MrWeights {
    fn default() -> Self {
        Self {
            vix_contrarian: 0.50,
            spy_trend: 0.30,
            breadth: 0.20,
        }
    }
}

/// Valuation Context blend weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VcWeights {
    pub sa_value: f64,
    pub ev_ebitda_sector: f64,
}

impl Default for VcWeights {
    fn default() -> Self {
        Self {
            sa_value: 0.65,
            ev_ebitda_sector: 0.35,
        }
    }
}

/// DCS classification thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub strong_buy_dip: f64,
    pub high_conviction: f64,
    pub buy_dip: f64,
    pub watch: f64,
    pub weak: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy_dip: 80.0,
            high_conviction: 70.0,
            buy_dip: 65.0,
            watch: 50.0,
            weak: 35.0,
        }
    }
}

/// Post-composition modifier settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Modifiers {
    pub obv_bullish_max: f64,
    pub rsi_divergence_boost: f64,
    pub rsi_divergence_min_dcs: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            obv_bullish_max: 5.0,
            rsi_divergence_boost: 3.0,
            rsi_divergence_min_dcs: 60.0,
        }
    }
}

/// Cap table keyed by defense class, with a fallback for unclassified tickers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapTable {
    pub hedge: f64,
    pub defensive: f64,
    pub moderate: f64,
    pub cyclical: f64,
    pub amplifier: f64,
    pub unknown: f64,
}

impl CapTable {
    pub fn cap_for(&self, class: Option<DefenseClass>) -> f64 {
        match class {
            Some(DefenseClass::Hedge) => self.hedge,
            Some(DefenseClass::Defensive) => self.defensive,
            Some(DefenseClass::Moderate) => self.moderate,
            Some(DefenseClass::Cyclical) => self.cyclical,
            Some(DefenseClass::Amplifier) => self.amplifier,
            None => self.unknown,
        }
    }
}

/// Falling-knife caps: freefall and downtrend tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FallingKnifeCaps {
    pub freefall: CapTable,
    pub downtrend: CapTable,
}

impl Default for FallingKnifeCaps {
    fn default() -> Self {
        Self {
            freefall: CapTable {
                hedge: 50.0,
                defensive: 45.0,
                moderate: 30.0,
                cyclical: 20.0,
                amplifier: 15.0,
                unknown: 30.0,
            },
            downtrend: CapTable {
                hedge: 70.0,
                defensive: 60.0,
                moderate: 50.0,
                cyclical: 40.0,
                amplifier: 30.0,
                unknown: 50.0,
            },
        }
    }
}

/// Additive D-5 modifiers applied in FEAR/PANIC regimes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DrawdownModifiers {
    pub hedge: f64,
    pub defensive: f64,
    pub moderate: f64,
    pub cyclical: f64,
    pub amplifier: f64,
}

impl Default for DrawdownModifiers {
    fn default() -> Self {
        Self {
            hedge: 5.0,
            defensive: 3.0,
            moderate: 0.0,
            cyclical: -3.0,
            amplifier: -5.0,
        }
    }
}

impl DrawdownModifiers {
    pub fn modifier_for(&self, class: DefenseClass) -> f64 {
        match class {
            DefenseClass::Hedge => self.hedge,
            DefenseClass::Defensive => self.defensive,
            DefenseClass::Moderate => self.moderate,
            DefenseClass::Cyclical => self.cyclical,
            DefenseClass::Amplifier => self.amplifier,
        }
    }
}

/// VIX regime ladder boundaries (half-open upper bounds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VixBoundaries {
    pub complacent_max: f64,
    pub normal_max: f64,
    pub fear_max: f64,
}

impl Default for VixBoundaries {
    fn default() -> Self {
        Self {
            complacent_max: 14.0,
            normal_max: 20.0,
            fear_max: 28.0,
        }
    }
}

/// Revision-momentum computation and sell thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RevisionMomentumConfig {
    pub min_history_weeks: usize,
    pub min_calendar_days: i64,
    pub sell_threshold_subgrades: f64,
    pub warning_threshold_subgrades: f64,
}

impl Default for RevisionMomentumConfig {
    fn default() -> Self {
        Self {
            min_history_weeks: 4,
            min_calendar_days: 21,
            sell_threshold_subgrades: 3.0,
            warning_threshold_subgrades: 2.0,
        }
    }
}

/// Sell criteria thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SellCriteria {
    pub sma_breach_days: usize,
    pub sma_breach_warning_days: usize,
    pub sma_breach_threshold: f64,
    pub quant_drop_threshold: f64,
    pub quant_drop_lookback_days: i64,
}

impl Default for SellCriteria {
    fn default() -> Self {
        Self {
            sma_breach_days: 10,
            sma_breach_warning_days: 7,
            sma_breach_threshold: -0.03,
            quant_drop_threshold: -1.0,
            quant_drop_lookback_days: 30,
        }
    }
}

/// Gate 3 deployment thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub gate3_rsi_max: f64,
    pub gate3_ret_8w_max: f64,
    pub gold_rsi_max_sizing: f64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            gate3_rsi_max: 80.0,
            gate3_ret_8w_max: 0.30,
            gold_rsi_max_sizing: 0.75,
        }
    }
}

/// Composite risk aggregation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub enabled: bool,
    pub ebp_weight: f64,
    pub turbulence_weight: f64,
    pub crash_weight: f64,
    pub high_risk_threshold: f64,
    pub elevated_threshold: f64,
    pub high_risk_penalty: f64,
    pub elevated_penalty: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ebp_weight: 0.40,
            turbulence_weight: 0.30,
            crash_weight: 0.30,
            high_risk_threshold: 0.70,
            elevated_threshold: 0.40,
            high_risk_penalty: 10.0,
            elevated_penalty: 5.0,
        }
    }
}

/// Historical vs parametric-normal CVaR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvarMethod {
    #[serde(rename = "historical")]
    Historical,
    #[serde(rename = "parametric")]
    Parametric,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EbpConfig {
    pub enabled: bool,
    pub high_risk_threshold: f64,
    pub elevated_threshold: f64,
    pub normal_threshold: f64,
    pub lookback_months: usize,
}

impl Default for EbpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            high_risk_threshold: 1.00,
            elevated_threshold: 0.50,
            normal_threshold: 0.0,
            lookback_months: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurbulenceConfig {
    pub enabled: bool,
    pub window: usize,
    pub threshold_pctl: f64,
    pub min_assets: usize,
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: 252,
            threshold_pctl: 0.75,
            min_assets: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MomentumCrashConfig {
    pub enabled: bool,
    pub lookback_months: usize,
    pub crash_threshold: f64,
    pub min_weight: f64,
}

impl Default for MomentumCrashConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lookback_months: 24,
            crash_threshold: 0.02,
            min_weight: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CvarConfig {
    pub enabled: bool,
    pub alpha: f64,
    pub method: CvarMethod,
}

impl Default for CvarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            alpha: 0.95,
            method: CvarMethod::Historical,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CdarConfig {
    pub enabled: bool,
    pub alpha: f64,
}

impl Default for CdarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            alpha: 0.95,
        }
    }
}

/// Risk framework settings, all disabled by default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskConfig {
    pub ebp: EbpConfig,
    pub turbulence: TurbulenceConfig,
    pub momentum_crash: MomentumCrashConfig,
    pub cvar: CvarConfig,
    pub cdar: CdarConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrendFollowingConfig {
    pub enabled: bool,
    pub window: usize,
    pub vol_window: usize,
    pub mq_blend_weight: f64,
}

impl Default for TrendFollowingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: 252,
            vol_window: 60,
            mq_blend_weight: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub enabled: bool,
    pub n_components: usize,
    pub mr_reduction: f64,
    pub overheated_pctl: f64,
    pub depressed_pctl: f64,
    pub min_observations: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            n_components: 1,
            mr_reduction: 0.15,
            overheated_pctl: 0.80,
            depressed_pctl: 0.20,
            min_observations: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorMomentumConfig {
    pub enabled: bool,
    pub lookback_months: usize,
    pub breadth_threshold_high: f64,
    pub breadth_threshold_low: f64,
}

impl Default for FactorMomentumConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lookback_months: 12,
            breadth_threshold_high: 0.65,
            breadth_threshold_low: 0.35,
        }
    }
}

/// Advanced overlay settings, all disabled by default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AdvancedConfig {
    pub trend_following: TrendFollowingConfig,
    pub sentiment: SentimentConfig,
    pub factor_momentum: FactorMomentumConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InverseVolConfig {
    pub enabled: bool,
    pub eta: f64,
    pub window: usize,
    pub min_periods: usize,
}

impl Default for InverseVolConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            eta: 1.0,
            window: 120,
            min_periods: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpConfig {
    pub enabled: bool,
    pub min_periods: usize,
}

impl Default for HrpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_periods: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxConfig {
    pub enabled: bool,
    pub loss_threshold_pct: f64,
    pub wash_sale_window_days: i64,
    pub long_term_days: i64,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            loss_threshold_pct: 0.02,
            wash_sale_window_days: 30,
            long_term_days: 366,
        }
    }
}

/// Portfolio construction settings, all disabled by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub inverse_vol: InverseVolConfig,
    pub hrp: HrpConfig,
    pub tax: TaxConfig,
}

/// Scoring-section settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: DcsWeights,
    pub mq_weights: MqWeights,
    pub fq_weights: FqWeights,
    pub to_weights: ToWeights,
    pub mr_weights: MrWeights,
    pub vc_weights: VcWeights,
    pub profitability_blend: ProfitabilityBlend,
    pub thresholds: SignalThresholds,
    pub modifiers: Modifiers,
    pub falling_knife: FallingKnifeCaps,
    pub drawdown_modifiers: DrawdownModifiers,
    pub vix_regimes: VixBoundaries,
    pub revision_momentum: RevisionMomentumConfig,
    #[serde(default)]
    pub crypto_exempt_expiry: Option<NaiveDate>,
}

/// Root configuration, captured by value at the start of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub scoring: ScoringConfig,
    pub sell_criteria: SellCriteria,
    pub deployment: DeploymentConfig,
    pub aggregator: AggregatorConfig,
    pub risk: RiskConfig,
    pub advanced: AdvancedConfig,
    pub portfolio_construction: PortfolioConfig,
}

impl ThresholdConfig {
    /// Reject contract violations before any scoring begins.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let total = self.scoring.weights.total();
        if total != 100 {
            return Err(ScoringError::InvalidConfiguration(format!(
                "DCS weights must sum to 100, got {total}"
            )));
        }
        let alpha = self.risk.cvar.alpha;
        if !(alpha > 0.5 && alpha < 1.0) {
            return Err(ScoringError::InvalidConfiguration(format!(
                "CVaR alpha must be in (0.5, 1.0), got {alpha}"
            )));
        }
        let alpha = self.risk.cdar.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ScoringError::InvalidConfiguration(format!(
                "CDaR alpha must be in (0, 1), got {alpha}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_weights_rejected() {
        let mut config = ThresholdConfig::default();
        config.scoring.weights.mq = 40;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ScoringError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_bad_cvar_alpha_rejected() {
        let mut config = ThresholdConfig::default();
        config.risk.cvar.alpha = 0.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cap_table_lookup() {
        let caps = FallingKnifeCaps::default();
        assert_eq!(caps.freefall.cap_for(Some(DefenseClass::Hedge)), 50.0);
        assert_eq!(caps.freefall.cap_for(None), 30.0);
        assert_eq!(caps.downtrend.cap_for(Some(DefenseClass::Amplifier)), 30.0);
        assert_eq!(caps.downtrend.cap_for(None), 50.0);
    }
}
