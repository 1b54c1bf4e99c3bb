//! Central orchestrator for scoring one ticker.
//!
//! Sequences the layers for a single ticker: indicators, sub-scores,
//! optional overlay blends, composition, the ordered modifier chain
//! (OBV boost, RSI-divergence boost, falling-knife cap, drawdown
//! defense), the signal board, and classification into the final
//! immutable result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use advanced_signals::{AlignedSentimentIndex, ContinuousTrendFollower, SentimentResult, TrendSignal};
use dcs_composite::{
    apply_drawdown_modifier, apply_falling_knife_filter, apply_obv_boost,
    apply_rsi_divergence_boost, classify_dcs, compose_dcs,
};
use scoring_core::{
    Crossover, DcsSignal, DefenseClass, Divergence, PriceSeries, RatingBundle, RevisionMomentum,
    ScoringContext, SubScores, ThresholdConfig, Trend,
};
use signal_board::{
    amplifier_warning, bottom_turning, defensive_hold, eps_rev_sell, eps_rev_warning,
    quant_drop_sell, quant_freshness_warning, reversal_confirmed, sma_breach_sell,
    sma_breach_warning, SignalBoard,
};
use subscore_engine::{
    fundamental_quality, momentum_quality, revision_momentum, technical_oversold,
    valuation_context,
};
use technical_indicators::{
    consecutive_days_below_sma, obv_divergence, price_acceleration, reversal_signals, rsi_value,
    sma, ObvSummary,
};

/// Derived technical readouts retained in the scoring result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technicals {
    pub rsi_14: f64,
    pub pct_from_200d: f64,
    pub ret_8w: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub macd_crossover: Crossover,
    pub obv_trend: Trend,
    pub obv_divergence: Divergence,
    pub obv_divergence_strength: f64,
    pub bb_pct_b: f64,
    pub bb_lower_breach: bool,
    pub rsi_bullish_divergence: bool,
    pub bottom_turning: bool,
    pub quant_freshness_warning: bool,
    pub reversal_confirmed: bool,
    pub vol_adj_mom: Option<f64>,
    pub rs_vs_spy: Option<f64>,
}

/// Drawdown-defense readout for the result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DrawdownDefense {
    pub classification: DefenseClass,
    pub downside_capture: f64,
    pub dd_modifier_applied: f64,
}

/// Falling-knife cap readout, present only when a cap was in effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FallingKnifeCap {
    pub classification: Option<DefenseClass>,
    pub cap_applied: f64,
    /// Post-boost, pre-cap DCS.
    pub original_dcs: f64,
}

/// Quant deterioration vs the prior snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantDeterioration {
    pub delta: f64,
    pub since: NaiveDate,
}

/// Readouts from the enabled advanced overlays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedReadouts {
    pub trend_following: Option<TrendSignal>,
    pub sentiment: Option<SentimentResult>,
}

impl AdvancedReadouts {
    fn is_empty(&self) -> bool {
        self.trend_following.is_none() && self.sentiment.is_none()
    }
}

/// Immutable scoring result for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    pub ticker: String,
    /// Final DCS in [0, 100].
    pub dcs: f64,
    pub dcs_signal: DcsSignal,
    pub sub_scores: SubScores,
    pub technicals: Technicals,
    pub trend_score: f64,
    pub days_below_sma_3pct: usize,
    /// Legacy flag strings, insertion order.
    pub sell_flags: Vec<String>,
    pub signal_board: SignalBoard,
    pub quant_deterioration: Option<QuantDeterioration>,
    pub revision_momentum: Option<RevisionMomentum>,
    pub reversal_confirmed: bool,
    pub bottom_turning: bool,
    pub rsi_bullish_divergence: bool,
    pub quant_freshness_warning: bool,
    pub drawdown_defense: Option<DrawdownDefense>,
    pub falling_knife_cap: Option<FallingKnifeCap>,
    pub advanced_signals: Option<AdvancedReadouts>,
}

/// Score a single ticker, or None with fewer than 50 bars.
///
/// The config is assumed validated; the run loop rejects contract
/// violations before any scoring begins.
pub fn score_ticker(
    ticker: &str,
    ratings: &RatingBundle,
    prices: &PriceSeries,
    ctx: &ScoringContext,
    config: &ThresholdConfig,
) -> Option<ScoringResult> {
    let closes = prices.closes();
    if closes.len() < 50 {
        return None;
    }
    let n = closes.len();

    // OBV divergence needs a full volume column
    let obv = match prices.volumes() {
        Some(volumes) => obv_divergence(&closes, &volumes, 20),
        None => ObvSummary::flat(),
    };

    let (days_below_sma, _) =
        consecutive_days_below_sma(&closes, config.sell_criteria.sma_breach_threshold);

    // Quant deterioration vs the previous snapshot
    let mut quant_det: Option<QuantDeterioration> = None;
    if let (Some(prev), Some(current_quant)) = (ctx.prev_score_for(ticker), ratings.quant_score) {
        if let Some(prev_quant) = prev.quant_score {
            let delta = current_quant - prev_quant;
            if delta < config.sell_criteria.quant_drop_threshold {
                quant_det = Some(QuantDeterioration {
                    delta,
                    since: prev.date,
                });
            }
        }
    }

    let rev_momentum = revision_momentum(
        ticker,
        ctx.grade_history.as_deref(),
        &config.scoring.revision_momentum,
    );

    let fundamentals = ctx.fundamentals_for(ticker);

    // Sub-scores
    let mq_readout = momentum_quality(
        ratings,
        &closes,
        ctx.spy_close.as_deref(),
        &config.scoring.mq_weights,
    );
    let mut mq = mq_readout.mq;
    let trend_score = mq_readout.trend_score;

    let fq = fundamental_quality(
        ratings,
        rev_momentum.map(|r| r.score),
        fundamentals,
        &config.scoring.fq_weights,
        &config.scoring.profitability_blend,
    );
    let (to, macd_data) = technical_oversold(&closes, &config.scoring.to_weights);
    let mut mr = ctx.market_regime_score;
    let vc = valuation_context(ratings, fundamentals, &config.scoring.vc_weights);

    // Advanced overlays, off by default
    let mut advanced = AdvancedReadouts::default();
    if config.advanced.trend_following.enabled {
        let tf = ContinuousTrendFollower::new(
            config.advanced.trend_following.window,
            config.advanced.trend_following.vol_window,
        );
        if let Some(trend_sig) = tf.compute_signal(&closes) {
            let blend_w = config.advanced.trend_following.mq_blend_weight;
            let trend_norm = (trend_sig.signal + 1.0) / 2.0;
            mq = (1.0 - blend_w) * mq + blend_w * trend_norm;
            advanced.trend_following = Some(trend_sig);
        }
    }
    if config.advanced.sentiment.enabled {
        if let Some(panel) = &ctx.sentiment_proxies {
            let asi = AlignedSentimentIndex::new(
                config.advanced.sentiment.mr_reduction,
                config.advanced.sentiment.overheated_pctl,
                config.advanced.sentiment.depressed_pctl,
                config.advanced.sentiment.min_observations,
            );
            let sent = asi.compute(panel, ctx.market_returns.as_deref());
            if sent.mr_adjustment > 0.0 {
                mr *= 1.0 - sent.mr_adjustment;
            }
            advanced.sentiment = Some(sent);
        }
    }

    let sub_scores = SubScores { mq, fq, to, mr, vc };
    let mut dcs_raw = compose_dcs(&sub_scores, &config.scoring.weights);

    // Modifier chain: OBV boost first
    dcs_raw = apply_obv_boost(dcs_raw, &obv, &config.scoring.modifiers);

    let (_, ret_8w) = price_acceleration(&closes);

    let rsi = rsi_value(&closes, 14);
    let sma_200 = if n >= 200 {
        sma(&closes, 200)[n - 200]
    } else {
        closes.iter().sum::<f64>() / n as f64
    };
    let pct_from_200d = (closes[n - 1] - sma_200) / sma_200;

    let reversal = reversal_signals(&closes, rsi, &macd_data, ratings.quant_score);

    // RSI divergence boost, then the defense-aware cap and D-5 modifier
    dcs_raw = apply_rsi_divergence_boost(
        dcs_raw,
        reversal.rsi_bullish_divergence,
        &config.scoring.modifiers,
    );

    let defense = ctx.defense_for(ticker);
    let classification = defense.map(|d| d.classification);

    let (dcs, fk_cap) = apply_falling_knife_filter(
        dcs_raw,
        trend_score,
        classification,
        &config.scoring.falling_knife,
    );
    let (dcs, dd_modifier) = apply_drawdown_modifier(
        dcs,
        classification,
        ctx.vix_regime,
        &config.scoring.drawdown_modifiers,
    );

    let reversal_is_confirmed = dcs >= 65.0 && reversal.bb_lower_breach;

    let technicals = Technicals {
        rsi_14: rsi,
        pct_from_200d,
        ret_8w,
        macd_line: macd_data.macd,
        macd_signal: macd_data.signal,
        macd_histogram: macd_data.histogram,
        macd_crossover: macd_data.crossover,
        obv_trend: obv.obv_trend,
        obv_divergence: obv.divergence,
        obv_divergence_strength: obv.strength,
        bb_pct_b: reversal.bb_pct_b,
        bb_lower_breach: reversal.bb_lower_breach,
        rsi_bullish_divergence: reversal.rsi_bullish_divergence,
        bottom_turning: reversal.bottom_turning,
        quant_freshness_warning: reversal.quant_freshness_warning,
        reversal_confirmed: reversal_is_confirmed,
        vol_adj_mom: Some(mq_readout.vol_adj_mom),
        rs_vs_spy: mq_readout.rs_vs_spy,
    };

    // Signal board, in criterion order
    let mut board = SignalBoard::new();

    if days_below_sma >= config.sell_criteria.sma_breach_days {
        board.add(sma_breach_sell(days_below_sma));
    } else if days_below_sma >= config.sell_criteria.sma_breach_warning_days {
        board.add(sma_breach_warning(days_below_sma));
    }

    if let Some(det) = &quant_det {
        board.add(quant_drop_sell(det.delta, &det.since.to_string()));
    }

    if let Some(rev) = &rev_momentum {
        let sub_grade = 1.0 / 13.0;
        let steps = rev.delta_4w.abs() / sub_grade;
        if rev.delta_4w <= -config.scoring.revision_momentum.sell_threshold_subgrades * sub_grade {
            board.add(eps_rev_sell(steps, rev.delta_4w));
        } else if rev.delta_4w
            <= -config.scoring.revision_momentum.warning_threshold_subgrades * sub_grade
        {
            board.add(eps_rev_warning(steps, rev.delta_4w));
        }
    }

    if reversal.quant_freshness_warning {
        board.add(quant_freshness_warning());
    }

    // Drawdown-defense hold/trim rules, active only under stress
    if let Some(info) = defense {
        let stressed = ctx.vix_regime.map(|r| r.is_stressed()).unwrap_or(false);
        if stressed {
            let sell_count = board.sells().len();
            match info.classification {
                DefenseClass::Hedge | DefenseClass::Defensive if sell_count == 1 => {
                    board.add(defensive_hold(info.classification, info.downside_capture));
                }
                DefenseClass::Amplifier if sell_count >= 1 => {
                    board.add(amplifier_warning(info.downside_capture));
                }
                _ => {}
            }
        }
    }

    if reversal_is_confirmed {
        board.add(reversal_confirmed());
    }
    if reversal.bottom_turning {
        board.add(bottom_turning());
    }

    let sell_flags = board.to_legacy_flags();
    let dcs_signal = classify_dcs(dcs, &config.scoring.thresholds);

    Some(ScoringResult {
        ticker: ticker.to_string(),
        dcs,
        dcs_signal,
        sub_scores,
        technicals,
        trend_score,
        days_below_sma_3pct: days_below_sma,
        sell_flags,
        signal_board: board,
        quant_deterioration: quant_det,
        revision_momentum: rev_momentum,
        reversal_confirmed: reversal_is_confirmed,
        bottom_turning: reversal.bottom_turning,
        rsi_bullish_divergence: reversal.rsi_bullish_divergence,
        quant_freshness_warning: reversal.quant_freshness_warning,
        drawdown_defense: defense.map(|info| DrawdownDefense {
            classification: info.classification,
            downside_capture: info.downside_capture,
            dd_modifier_applied: dd_modifier,
        }),
        falling_knife_cap: fk_cap.map(|cap| FallingKnifeCap {
            classification,
            cap_applied: cap,
            original_dcs: dcs_raw,
        }),
        advanced_signals: if advanced.is_empty() {
            None
        } else {
            Some(advanced)
        },
    })
}
