use scoring_core::Crossover;
use serde::{Deserialize, Serialize};

/// Return val if it is finite, otherwise return default.
#[inline]
pub fn finite_or(val: f64, default: f64) -> f64 {
    if val.is_finite() {
        val
    } else {
        default
    }
}

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(finite_or(sum / period as f64, 0.0));
    }
    result
}

/// Exponential Moving Average, recursive with alpha = 2/(span+1),
/// seeded at the first element. Output length matches input length.
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    let mut prev = data[0];
    result.push(prev);
    for &x in &data[1..] {
        prev = finite_or(prev + alpha * (x - prev), prev);
        result.push(prev);
    }
    result
}

/// Relative Strength Index series using Wilder's smoothing.
///
/// Output starts at bar `period` (length = input length - period).
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut rsi_values = Vec::with_capacity(data.len() - period);
    rsi_values.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        rsi_values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    rsi_values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    finite_or(100.0 - 100.0 / (1.0 + rs), 50.0)
}

/// Most recent RSI value; 50.0 on insufficient data.
pub fn rsi_value(data: &[f64], period: usize) -> f64 {
    rsi(data, period).last().copied().unwrap_or(50.0)
}

/// MACD scalar readout with crossover state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdSummary {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub crossover: Crossover,
    pub hist_rising: bool,
    pub below_zero: bool,
}

impl MacdSummary {
    /// Neutral zeros, the insufficient-data sentinel.
    pub fn neutral() -> Self {
        Self {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
            crossover: Crossover::Neutral,
            hist_rising: false,
            below_zero: false,
        }
    }
}

/// MACD line, signal line, histogram, and crossover state.
///
/// Crossover scans the last three bars for a sign change of
/// (MACD - signal). Fewer than slow + signal bars returns the neutral
/// sentinel.
pub fn macd(close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSummary {
    if close.len() < slow + signal {
        return MacdSummary::neutral();
    }

    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);

    let n = macd_line.len();
    let macd_now = macd_line[n - 1];
    let signal_now = signal_line[n - 1];
    let hist_now = macd_now - signal_now;
    let hist_prev = if n >= 2 {
        macd_line[n - 2] - signal_line[n - 2]
    } else {
        0.0
    };

    let mut crossover = Crossover::Neutral;
    if n >= 4 {
        for i in n - 3..n {
            let prev = macd_line[i - 1] - signal_line[i - 1];
            let curr = macd_line[i] - signal_line[i];
            if prev <= 0.0 && curr > 0.0 {
                crossover = Crossover::Bullish;
            } else if prev >= 0.0 && curr < 0.0 {
                crossover = Crossover::Bearish;
            }
        }
    }

    MacdSummary {
        macd: macd_now,
        signal: signal_now,
        histogram: hist_now,
        crossover,
        hist_rising: hist_now > hist_prev,
        below_zero: macd_now < 0.0,
    }
}

/// Bollinger lower-band breach readout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BbBreach {
    pub breach: bool,
    pub pct_b: f64,
    pub lower: Option<f64>,
}

/// Bollinger Band lower breach: price below 20d SMA - 2 sigma.
///
/// %B = (close - lower) / (upper - lower). Short series or a flat
/// window return no breach with %B at 0.5.
pub fn bb_lower_breach(close: &[f64], period: usize, k: f64) -> BbBreach {
    let n = close.len();
    if n < period {
        return BbBreach {
            breach: false,
            pct_b: 0.5,
            lower: None,
        };
    }

    let current = close[n - 1];
    let window = &close[n - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance =
        window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
    let std = variance.sqrt();

    if std <= 0.0 {
        return BbBreach {
            breach: false,
            pct_b: 0.5,
            lower: None,
        };
    }

    let upper = mean + k * std;
    let lower = mean - k * std;
    let pct_b = (current - lower) / (upper - lower);

    BbBreach {
        breach: current < lower,
        pct_b,
        lower: Some(lower),
    }
}

/// Count consecutive trading days where price sits more than `threshold`
/// below the 200d SMA, scanning back from the most recent bar.
///
/// Returns (count, current pct-from-SMA). Under 200 bars returns (0, 0.0).
pub fn consecutive_days_below_sma(close: &[f64], threshold: f64) -> (usize, f64) {
    let n = close.len();
    if n < 200 {
        return (0, 0.0);
    }

    let sma_200 = sma(close, 200);
    // sma_200[i] aligns with close[i + 199]
    let pct: Vec<f64> = sma_200
        .iter()
        .enumerate()
        .map(|(i, s)| (close[i + 199] - s) / s)
        .collect();

    let mut count = 0;
    for val in pct.iter().rev() {
        if *val < threshold {
            count += 1;
        } else {
            break;
        }
    }

    let current = finite_or(pct[pct.len() - 1], 0.0);
    (count, current)
}

/// Price acceleration score and 8-week return.
///
/// The 8-week return feeds the deployment parabolic filter; the score
/// blends the return ladder (60%) with weekly acceleration (40%).
pub fn price_acceleration(close: &[f64]) -> (f64, f64) {
    let n = close.len();
    if n < 40 {
        return (0.0, 0.0);
    }

    let ret_8w = close[n - 1] / close[n - 40] - 1.0;

    // Weekly returns for the last 8 weeks, oldest first
    let mut weekly: Vec<f64> = Vec::with_capacity(8);
    for i in 0..8 {
        let end = n - 1 - i * 5;
        let start_offset = (i + 1) * 5 + 1;
        if start_offset < n {
            let start = n - 1 - (i + 1) * 5;
            weekly.push(close[end] / close[start] - 1.0);
        }
    }
    weekly.reverse();

    let mut acceleration = 0.0;
    if weekly.len() >= 4 {
        let first_half = weekly[..4].iter().sum::<f64>() / 4.0;
        let second_half = if weekly.len() > 4 {
            weekly[4..].iter().sum::<f64>() / (weekly.len() - 4) as f64
        } else {
            first_half
        };
        acceleration = second_half - first_half;
    }

    let ret_score = if ret_8w < 0.15 {
        0.0
    } else if ret_8w < 0.30 {
        (ret_8w - 0.15) / 0.15 * 0.5
    } else if ret_8w < 0.50 {
        0.5 + (ret_8w - 0.30) / 0.20 * 0.3
    } else {
        (0.8 + (ret_8w - 0.50) / 0.30 * 0.2).min(1.0)
    };

    let accel_score = (acceleration / 0.03).clamp(0.0, 1.0);

    (ret_score * 0.60 + accel_score * 0.40, ret_8w)
}

/// Least-squares slope of y against x = 0, 1, ..., n-1.
pub fn linreg_slope(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        ss_xy += dx * (yi - y_mean);
        ss_xx += dx * dx;
    }

    if ss_xx < 1e-15 {
        0.0
    } else {
        ss_xy / ss_xx
    }
}
