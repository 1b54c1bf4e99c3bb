//! Market Regime (MR) sub-score, computed once per run.

use scoring_core::MrWeights;

/// Contrarian VIX score: a higher VIX is a better dip-buy environment.
fn vix_score(vix: f64) -> f64 {
    if vix < 14.0 {
        0.2
    } else if vix < 20.0 {
        0.2 + (vix - 14.0) * (0.3 / 6.0)
    } else if vix < 28.0 {
        0.5 + (vix - 20.0) * (0.25 / 8.0)
    } else {
        (0.75 + (vix - 28.0) * (0.25 / 12.0)).min(1.0)
    }
}

fn breadth_score(breadth_pct: f64) -> f64 {
    if breadth_pct > 0.70 {
        1.0
    } else if breadth_pct > 0.50 {
        0.5 + (breadth_pct - 0.50) * 2.5
    } else if breadth_pct > 0.30 {
        0.2 + (breadth_pct - 0.30) * 1.5
    } else {
        0.1
    }
}

/// Market Regime sub-score in [0, 1].
///
/// Without breadth the VIX/trend split is 60/40.
pub fn market_regime(
    vix_current: f64,
    spy_above_200d: bool,
    breadth_pct: Option<f64>,
    weights: &MrWeights,
) -> f64 {
    let vix = vix_score(vix_current);
    let market_trend = if spy_above_200d { 1.0 } else { 0.4 };

    match breadth_pct {
        Some(b) => {
            vix * weights.vix_contrarian
                + market_trend * weights.spy_trend
                + breadth_score(b) * weights.breadth
        }
        None => vix * 0.60 + market_trend * 0.40,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vix_curve_monotone_at_boundaries() {
        assert_relative_eq!(vix_score(10.0), 0.2);
        assert_relative_eq!(vix_score(14.0), 0.2);
        assert_relative_eq!(vix_score(20.0), 0.5);
        assert_relative_eq!(vix_score(28.0), 0.75);
        assert_relative_eq!(vix_score(40.0), 1.0);
        assert_relative_eq!(vix_score(80.0), 1.0);
    }

    #[test]
    fn test_mr_in_bounds() {
        let weights = MrWeights::default();
        for vix in [8.0, 15.0, 25.0, 45.0] {
            for spy in [true, false] {
                for breadth in [None, Some(0.2), Some(0.6), Some(0.9)] {
                    let mr = market_regime(vix, spy, breadth, &weights);
                    assert!((0.0..=1.0).contains(&mr), "mr out of bounds: {mr}");
                }
            }
        }
    }

    #[test]
    fn test_spy_below_200d_drags_regime() {
        let weights = MrWeights::default();
        let above = market_regime(18.0, true, None, &weights);
        let below = market_regime(18.0, false, None, &weights);
        assert!(above > below);
        assert_relative_eq!(above - below, 0.6 * 0.40, epsilon = 1e-12);
    }
}
