//! DCS composition, post-composition modifiers, and classifiers.
//!
//! Modifier order is part of the contract: OBV boost, then the RSI
//! divergence boost, then the falling-knife cap, then the drawdown
//! defense modifier, then classification.

use scoring_core::{
    DcsSignal, DcsWeights, DefenseClass, Divergence, DrawdownModifiers, FallingKnifeCaps,
    Modifiers, SignalThresholds, SubScores, VixBoundaries, VixRegime,
};
use technical_indicators::ObvSummary;

/// Raw DCS: weighted sum of the five sub-scores, in [0, 100].
pub fn compose_dcs(sub_scores: &SubScores, weights: &DcsWeights) -> f64 {
    sub_scores.mq * weights.mq as f64
        + sub_scores.fq * weights.fq as f64
        + sub_scores.to * weights.to as f64
        + sub_scores.mr * weights.mr as f64
        + sub_scores.vc * weights.vc as f64
}

/// Boost DCS by up to `obv_bullish_max` points for OBV bullish
/// divergence, scaled by divergence strength. Volume precedes price.
pub fn apply_obv_boost(dcs: f64, obv: &ObvSummary, modifiers: &Modifiers) -> f64 {
    if obv.divergence == Divergence::Bullish {
        (dcs + modifiers.obv_bullish_max * obv.strength).min(100.0)
    } else {
        dcs
    }
}

/// Boost DCS for RSI bullish divergence, only at already-elevated DCS.
pub fn apply_rsi_divergence_boost(dcs: f64, has_divergence: bool, modifiers: &Modifiers) -> f64 {
    if has_divergence && dcs >= modifiers.rsi_divergence_min_dcs {
        (dcs + modifiers.rsi_divergence_boost).min(100.0)
    } else {
        dcs
    }
}

/// Cap DCS when the trend context is bearish, defense-aware.
///
/// Hedges and defensives get softer caps; amplifiers and cyclicals get
/// harsher ones. Returns the capped DCS and the cap level when one was
/// in effect. Above trend 0.4 the filter never changes DCS.
pub fn apply_falling_knife_filter(
    dcs_raw: f64,
    trend_score: f64,
    classification: Option<DefenseClass>,
    caps: &FallingKnifeCaps,
) -> (f64, Option<f64>) {
    if trend_score <= 0.1 {
        let cap = caps.freefall.cap_for(classification);
        (dcs_raw.min(cap), Some(cap))
    } else if trend_score <= 0.4 {
        let cap = caps.downtrend.cap_for(classification);
        (dcs_raw.min(cap), Some(cap))
    } else {
        (dcs_raw, None)
    }
}

/// D-5 drawdown defense modifier, active only in FEAR/PANIC.
///
/// Returns the adjusted DCS (clamped to [0, 100]) and the modifier that
/// was applied.
pub fn apply_drawdown_modifier(
    dcs: f64,
    classification: Option<DefenseClass>,
    vix_regime: Option<VixRegime>,
    modifiers: &DrawdownModifiers,
) -> (f64, f64) {
    let stressed = vix_regime.map(|r| r.is_stressed()).unwrap_or(false);
    let class = match (stressed, classification) {
        (true, Some(c)) => c,
        _ => return (dcs, 0.0),
    };

    let modifier = modifiers.modifier_for(class);
    ((dcs + modifier).clamp(0.0, 100.0), modifier)
}

/// Classify DCS into its signal tier.
pub fn classify_dcs(dcs: f64, thresholds: &SignalThresholds) -> DcsSignal {
    if dcs >= thresholds.strong_buy_dip {
        DcsSignal::StrongBuyDip
    } else if dcs >= thresholds.high_conviction {
        DcsSignal::HighConviction
    } else if dcs >= thresholds.buy_dip {
        DcsSignal::BuyDip
    } else if dcs >= thresholds.watch {
        DcsSignal::Watch
    } else if dcs >= thresholds.weak {
        DcsSignal::Weak
    } else {
        DcsSignal::Avoid
    }
}

/// Classify a VIX level into its regime (half-open interval ladder).
pub fn classify_vix(vix: f64, boundaries: &VixBoundaries) -> VixRegime {
    if vix < boundaries.complacent_max {
        VixRegime::Complacent
    } else if vix < boundaries.normal_max {
        VixRegime::Normal
    } else if vix < boundaries.fear_max {
        VixRegime::Fear
    } else {
        VixRegime::Panic
    }
}
