//! Volatility estimators and return-series helpers.

use scoring_core::Bar;

/// Daily simple returns from a close series.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }
    closes
        .windows(2)
        .filter_map(|w| {
            if w[0] != 0.0 {
                Some((w[1] - w[0]) / w[0])
            } else {
                None
            }
        })
        .collect()
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / n as f64;
    let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Sample variance (ddof = 1).
pub fn sample_var(xs: &[f64]) -> f64 {
    let s = sample_std(xs);
    s * s
}

/// Annualized realized volatility from daily returns.
pub fn realized_vol(returns: &[f64]) -> f64 {
    sample_std(returns) * 252.0_f64.sqrt()
}

/// Yang-Zhang volatility from close prices only (close-to-close log
/// returns, annualized). Fallback when OHLC depth is unavailable.
pub fn yang_zhang_from_close(close: &[f64], window: usize) -> f64 {
    if close.len() < window + 1 {
        return 0.0;
    }
    let tail = &close[close.len() - (window + 1)..];
    let log_ret: Vec<f64> = tail.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    if log_ret.len() < 2 {
        return 0.0;
    }
    sample_std(&log_ret) * 252.0_f64.sqrt()
}

/// Yang-Zhang (2000) volatility estimator, annualized.
///
/// Combines overnight variance, open-to-close variance, and the
/// Rogers-Satchell intraday component with
/// k = 0.34 / (1 + (n+1)/(n-1)). Falls back to close-to-close when
/// OHLC depth is missing.
pub fn yang_zhang_vol(bars: &[Bar], window: usize) -> f64 {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let has_ohlc = bars.len() >= window + 1
        && bars[bars.len() - window..]
            .iter()
            .all(|b| b.open.is_some() && b.high.is_some() && b.low.is_some());
    if !has_ohlc {
        return yang_zhang_from_close(&closes, window);
    }

    let tail = &bars[bars.len() - window..];
    let prev_closes = &closes[bars.len() - window - 1..bars.len() - 1];
    let n = tail.len();
    if n < 2 {
        return 0.0;
    }

    let mut log_oc = Vec::with_capacity(n);
    let mut log_co = Vec::with_capacity(n);
    let mut rs = Vec::with_capacity(n);
    for (bar, &c_prev) in tail.iter().zip(prev_closes.iter()) {
        let (o, h, l, c) = (
            bar.open.unwrap_or(bar.close),
            bar.high.unwrap_or(bar.close),
            bar.low.unwrap_or(bar.close),
            bar.close,
        );
        log_oc.push((o / c_prev).ln());
        log_co.push((c / o).ln());
        rs.push((h / o).ln() * (h / c).ln() + (l / o).ln() * (l / c).ln());
    }

    let sigma_oc_sq = sample_var(&log_oc);
    let sigma_co_sq = sample_var(&log_co);
    let sigma_rs_sq = rs.iter().sum::<f64>() / n as f64;

    let nf = n as f64;
    let k = 0.34 / (1.0 + (nf + 1.0) / (nf - 1.0));
    let sigma_yz_sq = k * sigma_oc_sq + (1.0 - k) * sigma_co_sq + sigma_rs_sq;

    (sigma_yz_sq.max(0.0) * 252.0).sqrt()
}
