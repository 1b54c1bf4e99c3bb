//! Divergence detection: OBV vs price, RSI bullish divergence, and the
//! composite reversal-signal dispatcher.

use scoring_core::{Divergence, Trend};
use serde::{Deserialize, Serialize};

use crate::indicators::{bb_lower_breach, linreg_slope, rsi, MacdSummary};

/// On-Balance Volume divergence readout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObvSummary {
    pub obv_trend: Trend,
    pub price_trend: Trend,
    pub divergence: Divergence,
    pub strength: f64,
}

impl ObvSummary {
    /// Flat/none sentinel for short series.
    pub fn flat() -> Self {
        Self {
            obv_trend: Trend::Flat,
            price_trend: Trend::Flat,
            divergence: Divergence::None,
            strength: 0.0,
        }
    }
}

fn classify_trend(norm_slope: f64) -> Trend {
    if norm_slope > 0.001 {
        Trend::Rising
    } else if norm_slope < -0.001 {
        Trend::Falling
    } else {
        Trend::Flat
    }
}

/// Cumulative OBV with Granville's accumulation rule, then divergence
/// detection from normalized regression slopes over the last `lookback`
/// bars. Bullish when price falls while OBV rises; bearish vice versa.
pub fn obv_divergence(close: &[f64], volume: &[f64], lookback: usize) -> ObvSummary {
    let n = close.len().min(volume.len());
    if n < lookback + 5 {
        return ObvSummary::flat();
    }

    let mut obv = vec![0.0; n];
    for i in 1..n {
        obv[i] = if close[i] > close[i - 1] {
            obv[i - 1] + volume[i]
        } else if close[i] < close[i - 1] {
            obv[i - 1] - volume[i]
        } else {
            obv[i - 1]
        };
    }

    let recent_close = &close[n - lookback..n];
    let recent_obv = &obv[n - lookback..];

    let price_slope = linreg_slope(recent_close);
    let price_mean = recent_close.iter().sum::<f64>() / lookback as f64;
    let price_norm = price_slope / (price_mean + 1e-10);

    let obv_slope = linreg_slope(recent_obv);
    let obv_mean = recent_obv.iter().sum::<f64>() / lookback as f64;
    let obv_norm = obv_slope / (obv_mean.abs() + 1e-10);

    let price_trend = classify_trend(price_norm);
    let obv_trend = classify_trend(obv_norm);

    let (divergence, strength) = match (price_trend, obv_trend) {
        (Trend::Falling, Trend::Rising) => (Divergence::Bullish, (obv_norm.abs() * 100.0).min(1.0)),
        (Trend::Rising, Trend::Falling) => (Divergence::Bearish, (obv_norm.abs() * 100.0).min(1.0)),
        _ => (Divergence::None, 0.0),
    };

    ObvSummary {
        obv_trend,
        price_trend,
        divergence,
        strength,
    }
}

/// RSI bullish divergence readout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiDivergence {
    pub detected: bool,
    pub price_low_recent: Option<f64>,
    pub rsi_low_recent: Option<f64>,
}

impl RsiDivergence {
    fn none() -> Self {
        Self {
            detected: false,
            price_low_recent: None,
            rsi_low_recent: None,
        }
    }
}

fn slice_min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

/// RSI bullish divergence over two equal windows: the recent window's
/// price low is strictly lower while its RSI low is strictly higher.
pub fn rsi_bullish_divergence(close: &[f64], rsi_period: usize, lookback: usize) -> RsiDivergence {
    let n = close.len();
    if n < lookback {
        return RsiDivergence::none();
    }

    let rsi_series = rsi(close, rsi_period);
    if rsi_series.len() < lookback {
        return RsiDivergence::none();
    }

    let half = lookback / 2;
    let price_w1 = &close[n - lookback..n - half];
    let price_w2 = &close[n - half..];
    let m = rsi_series.len();
    let rsi_w1 = &rsi_series[m - lookback..m - half];
    let rsi_w2 = &rsi_series[m - half..];

    let price_low1 = slice_min(price_w1);
    let price_low2 = slice_min(price_w2);
    let rsi_low1 = slice_min(rsi_w1);
    let rsi_low2 = slice_min(rsi_w2);

    RsiDivergence {
        detected: price_low2 < price_low1 && rsi_low2 > rsi_low1,
        price_low_recent: Some(price_low2),
        rsi_low_recent: Some(rsi_low2),
    }
}

/// Flags from the reversal-signal sweep for one ticker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReversalSignals {
    pub rsi_bullish_divergence: bool,
    pub bb_lower_breach: bool,
    pub bb_pct_b: f64,
    pub bottom_turning: bool,
    pub quant_freshness_warning: bool,
}

/// Compute all reversal signals for a ticker.
///
/// Bottom-turning fires on MACD histogram rising below zero with RSI
/// under 30 on a quant 3+ name; the freshness check flags quant 4+
/// names at RSI under 30 as candidates for a stale rating.
pub fn reversal_signals(
    close: &[f64],
    rsi_value: f64,
    macd: &MacdSummary,
    quant: Option<f64>,
) -> ReversalSignals {
    let div = rsi_bullish_divergence(close, 14, 40);
    let bb = bb_lower_breach(close, 20, 2.0);

    let quant = quant.unwrap_or(0.0);
    let hist_rising_below_zero = macd.hist_rising && macd.below_zero;

    ReversalSignals {
        rsi_bullish_divergence: div.detected,
        bb_lower_breach: bb.breach,
        bb_pct_b: bb.pct_b,
        bottom_turning: hist_rising_below_zero && rsi_value < 30.0 && quant >= 3.0,
        quant_freshness_warning: quant >= 4.0 && rsi_value < 30.0,
    }
}
