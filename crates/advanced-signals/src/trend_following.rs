//! Continuous trend following signal.
//!
//! Regresses price on time over the lookback window and normalizes the
//! slope t-statistic into a continuous signal in [-1, +1], with
//! Yang-Zhang volatility scaling. When enabled, the signal blends into
//! the MQ sub-score at `mq_blend_weight`.

use serde::{Deserialize, Serialize};
use technical_indicators::yang_zhang_from_close;

/// Discrete regime for the continuous signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendRegime {
    #[serde(rename = "STRONG_UP")]
    StrongUp,
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "STRONG_DOWN")]
    StrongDown,
}

/// Result from the continuous trend signal computation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrendSignal {
    /// Continuous signal in [-1, +1].
    pub signal: f64,
    /// Raw t-statistic of the OLS slope.
    pub t_stat: f64,
    /// Signal divided by Yang-Zhang volatility.
    pub vol_scaled: f64,
    pub yang_zhang: f64,
    pub regime: TrendRegime,
}

/// Continuous trend follower over daily closes.
#[derive(Debug, Clone, Copy)]
pub struct ContinuousTrendFollower {
    pub window: usize,
    pub vol_window: usize,
}

impl Default for ContinuousTrendFollower {
    fn default() -> Self {
        Self {
            window: 252,
            vol_window: 60,
        }
    }
}

impl ContinuousTrendFollower {
    pub fn new(window: usize, vol_window: usize) -> Self {
        Self { window, vol_window }
    }

    fn classify_regime(signal: f64) -> TrendRegime {
        if signal >= 0.6 {
            TrendRegime::StrongUp
        } else if signal >= 0.2 {
            TrendRegime::Up
        } else if signal <= -0.6 {
            TrendRegime::StrongDown
        } else if signal <= -0.2 {
            TrendRegime::Down
        } else {
            TrendRegime::Flat
        }
    }

    /// Compute the signal, or None with fewer than `window` bars.
    ///
    /// OLS price ~ b0 + b1 * t; signal = clamp(t_stat(b1) / 2, -1, +1).
    pub fn compute_signal(&self, close: &[f64]) -> Option<TrendSignal> {
        if close.len() < self.window {
            return None;
        }

        let y = &close[close.len() - self.window..];
        let n = y.len();
        let nf = n as f64;

        let x_mean = (nf - 1.0) / 2.0;
        let y_mean = y.iter().sum::<f64>() / nf;

        let mut ss_xx = 0.0;
        let mut ss_xy = 0.0;
        for (i, &yi) in y.iter().enumerate() {
            let dx = i as f64 - x_mean;
            ss_xx += dx * dx;
            ss_xy += dx * (yi - y_mean);
        }

        if ss_xx < 1e-12 {
            return Some(TrendSignal {
                signal: 0.0,
                t_stat: 0.0,
                vol_scaled: 0.0,
                yang_zhang: 0.0,
                regime: TrendRegime::Flat,
            });
        }

        let beta_1 = ss_xy / ss_xx;
        let beta_0 = y_mean - beta_1 * x_mean;

        let sse: f64 = y
            .iter()
            .enumerate()
            .map(|(i, &yi)| {
                let fit = beta_0 + beta_1 * i as f64;
                (yi - fit).powi(2)
            })
            .sum();

        let s2 = if n > 2 { sse / (nf - 2.0) } else { 1e-12 };
        let se_beta1 = (s2 / ss_xx).max(1e-20).sqrt();

        let t_stat = if se_beta1 > 1e-12 {
            beta_1 / se_beta1
        } else {
            0.0
        };

        let signal = (t_stat / 2.0).clamp(-1.0, 1.0);

        let yz_vol = yang_zhang_from_close(close, self.vol_window);
        let vol_scaled = if yz_vol > 0.0 {
            signal / yz_vol.max(0.05)
        } else {
            signal
        };

        Some(TrendSignal {
            signal,
            t_stat,
            vol_scaled,
            yang_zhang: yz_vol,
            regime: Self::classify_regime(signal),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_is_none() {
        let tf = ContinuousTrendFollower::default();
        let close = vec![100.0; 100];
        assert!(tf.compute_signal(&close).is_none());
    }

    #[test]
    fn test_clean_uptrend_saturates_positive() {
        let tf = ContinuousTrendFollower::default();
        let close: Vec<f64> = (0..252).map(|i| 100.0 + 0.5 * i as f64).collect();
        let signal = tf.compute_signal(&close).unwrap();
        assert_eq!(signal.signal, 1.0);
        assert_eq!(signal.regime, TrendRegime::StrongUp);
        assert!(signal.t_stat > 2.0);
    }

    #[test]
    fn test_clean_downtrend_saturates_negative() {
        let tf = ContinuousTrendFollower::default();
        let close: Vec<f64> = (0..252).map(|i| 300.0 - 0.5 * i as f64).collect();
        let signal = tf.compute_signal(&close).unwrap();
        assert_eq!(signal.signal, -1.0);
        assert_eq!(signal.regime, TrendRegime::StrongDown);
    }

    #[test]
    fn test_flat_series_flat_regime() {
        let tf = ContinuousTrendFollower::default();
        let close: Vec<f64> = (0..252)
            .map(|i| 100.0 + ((i % 2) as f64 - 0.5) * 0.01)
            .collect();
        let signal = tf.compute_signal(&close).unwrap();
        assert_eq!(signal.regime, TrendRegime::Flat);
        assert!(signal.signal.abs() < 0.2);
    }
}
