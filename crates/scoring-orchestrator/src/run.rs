//! Per-run scoring loop.
//!
//! Computes the shared market context once, scores every ticker in
//! parallel with per-ticker isolation, then runs the correlation and
//! concentration pass over the held book. Results carry no ordering
//! guarantee; consumers sort by their own key.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dcs_composite::{classify_dcs, classify_vix};
use deployment_gate::{check_gate3, CompositeRisk, Gate3Result, SignalAggregator};
use portfolio_construction::{
    check_concentration_risk, compute_correlation_report, ConcentrationWarning, CorrelationReport,
};
use scoring_core::{
    PriceSeries, RatingBundle, ScoringContext, ThresholdConfig, VixRegime,
};
use signal_board::concentration_warning;
use subscore_engine::market_regime;
use technical_indicators::{daily_returns, sma};

use crate::scorer::{score_ticker, ScoringResult};

/// Run-level market context computed once per scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketContext {
    pub spy_above_200d: bool,
    pub spy_pct_from_200d: f64,
    pub vix_current: f64,
    pub vix_percentile: f64,
    pub vix_regime: VixRegime,
    pub breadth_pct: Option<f64>,
    pub market_regime_score: f64,
}

/// Compute the shared market context from benchmark and VIX series.
///
/// Degenerate inputs fall back to a neutral context (benchmark in an
/// uptrend, VIX at 15).
pub fn compute_market_context(
    spy_close: &[f64],
    vix_close: &[f64],
    breadth_pct: Option<f64>,
    config: &ThresholdConfig,
) -> MarketContext {
    let mut spy_above_200d = true;
    let mut spy_pct_from_200d = 0.0;
    if spy_close.len() >= 200 {
        let sma_200 = sma(spy_close, 200)[spy_close.len() - 200];
        let current = spy_close[spy_close.len() - 1];
        spy_above_200d = current > sma_200;
        spy_pct_from_200d = (current - sma_200) / sma_200;
    }

    let mut vix_current = 15.0;
    let mut vix_percentile = 0.5;
    if let Some(&last) = vix_close.last() {
        vix_current = last;
        vix_percentile =
            vix_close.iter().filter(|&&v| v < last).count() as f64 / vix_close.len() as f64;
    }

    let vix_regime = classify_vix(vix_current, &config.scoring.vix_regimes);
    let market_regime_score = market_regime(
        vix_current,
        spy_above_200d,
        breadth_pct,
        &config.scoring.mr_weights,
    );

    MarketContext {
        spy_above_200d,
        spy_pct_from_200d,
        vix_current,
        vix_percentile,
        vix_regime,
        breadth_pct,
        market_regime_score,
    }
}

/// One ticker's inputs for a scoring run.
#[derive(Debug, Clone)]
pub struct TickerInput {
    pub ticker: String,
    pub ratings: RatingBundle,
    pub prices: PriceSeries,
    /// Watchlist entries are scored but excluded from the held book.
    pub is_watchlist: bool,
}

/// Outcome of one scoring run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub scores: Vec<ScoringResult>,
    /// Tickers skipped for insufficient data.
    pub skipped: Vec<String>,
    pub correlation: Option<CorrelationReport>,
    pub concentration_warnings: Vec<ConcentrationWarning>,
}

impl RunResult {
    pub fn n_scored(&self) -> usize {
        self.scores.len()
    }

    /// (ticker, dcs) pairs sorted by DCS descending.
    pub fn top_scores(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .scores
            .iter()
            .map(|r| (r.ticker.clone(), r.dcs))
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }

    pub fn result_for(&self, ticker: &str) -> Option<&ScoringResult> {
        self.scores.iter().find(|r| r.ticker == ticker)
    }
}

/// Score the full universe against a shared context.
///
/// Validates the config up front, fans ticker scoring out with rayon
/// (every call reads only shared-immutable inputs), then runs the
/// correlation pass and, when the aggregator is enabled, applies the
/// composite risk overlay to every DCS.
pub fn score_universe(
    inputs: &[TickerInput],
    ctx: &ScoringContext,
    config: &ThresholdConfig,
    composite_risk: Option<&CompositeRisk>,
) -> Result<RunResult> {
    config.validate()?;

    info!(tickers = inputs.len(), "scoring universe");

    let outcomes: Vec<(String, Option<ScoringResult>)> = inputs
        .par_iter()
        .map(|input| {
            let result = score_ticker(&input.ticker, &input.ratings, &input.prices, ctx, config);
            (input.ticker.clone(), result)
        })
        .collect();

    let mut run = RunResult::default();
    for (ticker, outcome) in outcomes {
        match outcome {
            Some(result) => run.scores.push(result),
            None => {
                debug!(%ticker, "insufficient data, skipped");
                run.skipped.push(ticker);
            }
        }
    }

    info!(
        scored = run.scores.len(),
        skipped = run.skipped.len(),
        "scoring complete"
    );

    // Risk overlay: only the enabled aggregator ever touches DCS
    if config.aggregator.enabled {
        if let Some(composite) = composite_risk {
            let aggregator = SignalAggregator::new(config.aggregator);
            for result in run.scores.iter_mut() {
                result.dcs = aggregator.apply_risk_overlay(result.dcs, composite);
                result.dcs_signal = classify_dcs(result.dcs, &config.scoring.thresholds);
            }
            if composite.dcs_penalty > 0.0 {
                info!(
                    penalty = composite.dcs_penalty,
                    regime = %composite.regime,
                    "risk overlay applied"
                );
            }
        }
    }

    correlation_pass(&mut run, inputs, config);

    Ok(run)
}

/// Correlation and concentration analysis over the held book.
fn correlation_pass(run: &mut RunResult, inputs: &[TickerInput], config: &ThresholdConfig) {
    let scored: HashSet<&str> = run.scores.iter().map(|r| r.ticker.as_str()).collect();
    let held: Vec<&TickerInput> = inputs
        .iter()
        .filter(|i| !i.is_watchlist && scored.contains(i.ticker.as_str()))
        .collect();
    if held.len() < 3 {
        return;
    }

    let returns: Vec<(String, Vec<f64>)> = held
        .iter()
        .filter_map(|input| {
            let closes = input.prices.closes();
            if closes.len() < 90 {
                return None;
            }
            let rets = daily_returns(&closes);
            let tail = rets[rets.len().saturating_sub(90)..].to_vec();
            Some((input.ticker.clone(), tail))
        })
        .collect();
    if returns.is_empty() {
        return;
    }

    let report = compute_correlation_report(&returns, 0.80, 20.0, 30);
    info!(
        effective_bets = report.effective_bets,
        high_corr_pairs = report.high_corr_pairs.len(),
        "correlation analysis"
    );

    let buy_tickers: HashSet<String> = run
        .scores
        .iter()
        .filter(|r| r.dcs >= config.scoring.thresholds.buy_dip)
        .map(|r| r.ticker.clone())
        .collect();
    let held_set: HashSet<String> = held.iter().map(|i| i.ticker.clone()).collect();

    let warnings = check_concentration_risk(
        &report.high_corr_pairs,
        report.effective_bets,
        &buy_tickers,
        &held_set,
        20.0,
        0.70,
    );

    if !warnings.is_empty() {
        warn!(count = warnings.len(), "concentration warnings");

        // Attach one deployment-gate signal per flagged buy candidate
        let mut by_ticker: HashMap<&str, Vec<String>> = HashMap::new();
        for warning in &warnings {
            by_ticker
                .entry(warning.ticker.as_str())
                .or_default()
                .push(warning.correlated_with.clone());
        }
        for result in run.scores.iter_mut() {
            if let Some(correlated) = by_ticker.get(result.ticker.as_str()) {
                result
                    .signal_board
                    .add(concentration_warning(correlated, report.effective_bets));
                result.sell_flags = result.signal_board.to_legacy_flags();
            }
        }
    }

    run.concentration_warnings = warnings;
    run.correlation = Some(report);
}

/// Gate 3 deployment check for a scored result.
pub fn gate3_for_result(
    result: &ScoringResult,
    is_gold: bool,
    config: &ThresholdConfig,
) -> Gate3Result {
    check_gate3(
        result.technicals.rsi_14,
        result.technicals.ret_8w,
        &config.deployment,
        is_gold,
    )
}
