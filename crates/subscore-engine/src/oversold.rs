//! Technical Oversold (TO) sub-score.

use scoring_core::{Crossover, ToWeights};
use technical_indicators::{macd, rsi_value, sma, MacdSummary};

/// Technical Oversold sub-score in [0, 1], plus the MACD readout the
/// orchestrator retains for reversal detection.
pub fn technical_oversold(close: &[f64], weights: &ToWeights) -> (f64, MacdSummary) {
    let n = close.len();
    let current = close[n - 1];

    // RSI: deeper oversold scores higher
    let rsi = rsi_value(close, 14);
    let rsi_score = ((70.0 - rsi) / 40.0).clamp(0.0, 1.0);

    // Distance from the 200d SMA
    let pct_from_sma = if n >= 200 {
        let sma_200 = sma(close, 200)[n - 200];
        (current - sma_200) / sma_200
    } else {
        0.0
    };
    let sma_dist_score = ((0.10 - pct_from_sma) / 0.30).clamp(0.0, 1.0);

    // Bollinger position (20d, 2 sigma)
    let bb_score = if n >= 20 {
        let window = &close[n - 20..];
        let mean = window.iter().sum::<f64>() / 20.0;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 19.0;
        let std = variance.sqrt();
        if std > 0.0 {
            let upper = mean + 2.0 * std;
            let lower = mean - 2.0 * std;
            let position = (current - lower) / (upper - lower);
            (1.0 - position).clamp(0.0, 1.0)
        } else {
            0.5
        }
    } else {
        0.5
    };

    // MACD confirmation ladder
    let macd_data = macd(close, 12, 26, 9);
    let macd_score = match (
        macd_data.crossover,
        macd_data.below_zero,
        macd_data.hist_rising,
    ) {
        (Crossover::Bullish, true, _) => 1.0,
        (Crossover::Bullish, false, _) => 0.7,
        (_, true, true) => 0.6,
        (_, false, true) => 0.3,
        _ => 0.0,
    };

    let to = rsi_score * weights.rsi
        + sma_dist_score * weights.sma_distance
        + bb_score * weights.bollinger
        + macd_score * weights.macd;

    (to, macd_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversold_scores_higher_after_selloff() {
        // Long uptrend, then a 25% flush
        let mut dip: Vec<f64> = (0..250).map(|i| 100.0 + 0.2 * i as f64).collect();
        let peak = *dip.last().unwrap();
        for i in 0..20 {
            dip.push(peak * (1.0 - 0.0125 * (i + 1) as f64));
        }
        let rally: Vec<f64> = (0..270).map(|i| 100.0 + 0.4 * i as f64).collect();

        let weights = ToWeights::default();
        let (to_dip, _) = technical_oversold(&dip, &weights);
        let (to_rally, _) = technical_oversold(&rally, &weights);

        assert!((0.0..=1.0).contains(&to_dip));
        assert!((0.0..=1.0).contains(&to_rally));
        assert!(to_dip > to_rally);
    }

    #[test]
    fn test_flat_series_neutral_bollinger() {
        let flat = vec![100.0; 250];
        let (to, macd_data) = technical_oversold(&flat, &ToWeights::default());
        assert!((0.0..=1.0).contains(&to));
        assert_eq!(macd_data.crossover, Crossover::Neutral);
    }
}
