//! Valuation Context (VC) sub-score.
//!
//! Lowest DCS weight: value is a poor short-term predictor. Blends the
//! valuation grade with the sector-relative EV/EBITDA percentile when
//! fundamentals are available.

use scoring_core::{grade_norm, Fundamentals, RatingBundle, VcWeights};

/// Valuation Context sub-score in [0, 1].
pub fn valuation_context(
    ratings: &RatingBundle,
    fundamentals: Option<&Fundamentals>,
    weights: &VcWeights,
) -> f64 {
    let sa_norm = grade_norm(ratings.valuation);

    let usable = fundamentals.filter(|f| f.is_usable());
    match usable.and_then(|f| f.ev_to_ebitda_pctl) {
        Some(pctl) => {
            // Cheaper relative multiples (lower percentile) score higher
            let ev_ebitda = 1.0 - pctl;
            sa_norm * weights.sa_value + ev_ebitda * weights.ev_ebitda_sector
        }
        None => sa_norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scoring_core::LetterGrade;

    #[test]
    fn test_grade_only() {
        let ratings = RatingBundle {
            valuation: Some(LetterGrade::CPlus),
            ..Default::default()
        };
        let vc = valuation_context(&ratings, None, &VcWeights::default());
        assert_relative_eq!(vc, LetterGrade::CPlus.normalized(), epsilon = 1e-12);
    }

    #[test]
    fn test_ev_ebitda_blend() {
        let ratings = RatingBundle {
            valuation: Some(LetterGrade::B),
            ..Default::default()
        };
        let fundamentals = Fundamentals {
            fcf_yield_pctl: Some(0.5),
            ev_to_ebitda_pctl: Some(0.2),
            ..Default::default()
        };
        let vc = valuation_context(&ratings, Some(&fundamentals), &VcWeights::default());
        let expected = 0.65 * LetterGrade::B.normalized() + 0.35 * 0.8;
        assert_relative_eq!(vc, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_grade_neutral() {
        let vc = valuation_context(&RatingBundle::default(), None, &VcWeights::default());
        assert_relative_eq!(vc, 0.5);
    }
}
