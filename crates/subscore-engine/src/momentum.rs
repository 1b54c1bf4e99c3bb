//! Momentum Quality (MQ) sub-score.
//!
//! Components: trend regime (50d vs 200d SMA and price position),
//! volatility-adjusted 12-1 momentum, the momentum letter grade, and
//! relative strength against the benchmark.

use scoring_core::{grade_norm, MqWeights, RatingBundle};
use serde::{Deserialize, Serialize};
use technical_indicators::{daily_returns, realized_vol, sma};

/// MQ readout. `trend_score` also drives the falling-knife filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MomentumQuality {
    pub mq: f64,
    pub trend_score: f64,
    pub vol_adj_mom: f64,
    pub rs_vs_spy: Option<f64>,
}

/// Four-cell trend classifier on (SMA-50 vs SMA-200, close vs SMA-200).
///
/// 1.0 is the ideal dip-buy setup (uptrend pullback); 0.1 is a falling
/// knife below both SMAs.
pub fn trend_score(close: &[f64]) -> f64 {
    let n = close.len();
    let current = close[n - 1];

    let sma_50 = if n >= 50 {
        sma(close, 50).last().copied().unwrap_or(current)
    } else {
        current
    };
    let sma_200 = if n >= 200 {
        sma(close, 200).last().copied().unwrap_or(current)
    } else {
        current
    };

    if sma_50 > sma_200 && current > sma_200 {
        1.0
    } else if sma_50 > sma_200 && current <= sma_200 {
        0.5
    } else if sma_50 <= sma_200 && current > sma_200 {
        0.4
    } else {
        0.1
    }
}

/// Momentum Quality sub-score in [0, 1].
pub fn momentum_quality(
    ratings: &RatingBundle,
    close: &[f64],
    spy_close: Option<&[f64]>,
    weights: &MqWeights,
) -> MomentumQuality {
    let n = close.len();

    let trend = trend_score(close);

    // 12-1 month raw momentum: skip the most recent month
    let raw_mom_12_1 = if n >= 252 {
        close[n - 21] / close[n - 252] - 1.0
    } else if n >= 60 {
        close[n - 21] / close[0] - 1.0
    } else {
        0.0
    };

    // Volatility adjustment, floored at 5% annualized
    let vol_adj_mom = if n >= 60 {
        let returns = daily_returns(close);
        let tail = if returns.len() >= 252 {
            &returns[returns.len() - 252..]
        } else {
            &returns[..]
        };
        raw_mom_12_1 / realized_vol(tail).max(0.05)
    } else {
        raw_mom_12_1
    };

    let mom_score = ((vol_adj_mom + 0.5) / 2.5).clamp(0.0, 1.0);

    let sa_mom_norm = grade_norm(ratings.momentum);

    // Relative strength vs the benchmark (dual momentum)
    let mut rs_score = 0.5;
    let mut rs_vs_spy = None;
    if let Some(spy) = spy_close {
        let m = spy.len();
        if m >= 252 && n >= 252 {
            let ticker_12m = close[n - 21] / close[n - 252] - 1.0;
            let spy_12m = spy[m - 21] / spy[m - 252] - 1.0;
            let rs = if spy_12m != 0.0 {
                ticker_12m / spy_12m
            } else {
                1.0
            };
            rs_vs_spy = Some(rs);
            rs_score = ((rs - 0.3) / 1.4).clamp(0.0, 1.0);
        }
    }

    let mq = trend * weights.trend
        + mom_score * weights.vol_adj_momentum
        + sa_mom_norm * weights.sa_momentum
        + rs_score * weights.relative_strength;

    MomentumQuality {
        mq,
        trend_score: trend,
        vol_adj_mom,
        rs_vs_spy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_core::LetterGrade;

    fn uptrend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 50.0 + 0.2 * i as f64).collect()
    }

    fn downtrend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 300.0 - 0.5 * i as f64).collect()
    }

    #[test]
    fn test_trend_score_uptrend_is_ideal() {
        assert_eq!(trend_score(&uptrend(300)), 1.0);
    }

    #[test]
    fn test_trend_score_downtrend_is_falling_knife() {
        assert_eq!(trend_score(&downtrend(300)), 0.1);
    }

    #[test]
    fn test_mq_bounds_and_uptrend_beats_downtrend() {
        let ratings = RatingBundle {
            momentum: Some(LetterGrade::A),
            ..Default::default()
        };
        let weights = MqWeights::default();

        let up = momentum_quality(&ratings, &uptrend(300), None, &weights);
        let down = momentum_quality(&ratings, &downtrend(300), None, &weights);

        assert!((0.0..=1.0).contains(&up.mq));
        assert!((0.0..=1.0).contains(&down.mq));
        assert!(up.mq > down.mq);
    }

    #[test]
    fn test_rs_defaults_neutral_without_benchmark() {
        let ratings = RatingBundle::default();
        let result = momentum_quality(&ratings, &uptrend(300), None, &MqWeights::default());
        assert!(result.rs_vs_spy.is_none());
    }

    #[test]
    fn test_rs_computed_with_benchmark() {
        let ratings = RatingBundle::default();
        let spy = uptrend(300);
        let result =
            momentum_quality(&ratings, &uptrend(300), Some(&spy), &MqWeights::default());
        assert!(result.rs_vs_spy.is_some());
    }
}
