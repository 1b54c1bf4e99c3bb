//! Fundamental Quality (FQ) sub-score.
//!
//! Four mutually exclusive weight schemes keyed on availability of
//! fundamentals percentiles and revision momentum. Profitability blends
//! the letter grade with the gross-profitability percentile when both
//! exist.

use scoring_core::{grade_norm, FqWeights, Fundamentals, ProfitabilityBlend, RatingBundle};

/// Fundamental Quality sub-score in [0, 1].
pub fn fundamental_quality(
    ratings: &RatingBundle,
    rev_momentum: Option<f64>,
    fundamentals: Option<&Fundamentals>,
    weights: &FqWeights,
    blend: &ProfitabilityBlend,
) -> f64 {
    let quant = ratings.quant_score.unwrap_or(0.0);
    let quant_norm = (quant / 5.0).min(1.0);

    let prof_norm = grade_norm(ratings.profitability);
    let rev_norm = grade_norm(ratings.revisions);
    let growth_norm = grade_norm(ratings.growth);

    let usable = fundamentals.filter(|f| f.is_usable());

    if let Some(f) = usable {
        let prof_blended = match f.gross_profitability_pctl {
            Some(gp) => prof_norm * blend.sa_weight + gp * blend.novy_marx_weight,
            None => prof_norm,
        };
        let fcf_pctl = f.fcf_yield_pctl.unwrap_or(0.5);

        if let Some(rm) = rev_momentum {
            let w = &weights.with_fundamentals_and_revmom;
            quant_norm * w.quant
                + prof_blended * w.profitability
                + fcf_pctl * w.fcf_yield
                + rm * w.revision_momentum
                + rev_norm * w.revisions
                + growth_norm * w.growth
        } else {
            let w = &weights.with_fundamentals;
            quant_norm * w.quant
                + prof_blended * w.profitability
                + fcf_pctl * w.fcf_yield
                + rev_norm * w.revisions
                + growth_norm * w.growth
        }
    } else if let Some(rm) = rev_momentum {
        let w = &weights.with_revmom;
        quant_norm * w.quant
            + prof_norm * w.profitability
            + rm * w.revision_momentum
            + rev_norm * w.revisions
            + growth_norm * w.growth
    } else {
        let w = &weights.base;
        quant_norm * w.quant
            + prof_norm * w.profitability
            + rev_norm * w.revisions
            + growth_norm * w.growth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scoring_core::LetterGrade;

    fn strong_ratings() -> RatingBundle {
        RatingBundle {
            quant_score: Some(4.5),
            profitability: Some(LetterGrade::A),
            revisions: Some(LetterGrade::BPlus),
            growth: Some(LetterGrade::B),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_scheme_weighted_sum() {
        let ratings = strong_ratings();
        let fq = fundamental_quality(
            &ratings,
            None,
            None,
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        let expected = 0.35 * (4.5 / 5.0)
            + 0.25 * LetterGrade::A.normalized()
            + 0.25 * LetterGrade::BPlus.normalized()
            + 0.15 * LetterGrade::B.normalized();
        assert_relative_eq!(fq, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_grades_are_neutral() {
        let fq = fundamental_quality(
            &RatingBundle::default(),
            None,
            None,
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        // quant missing -> 0; grades missing -> 0.5
        let expected = 0.25 * 0.5 + 0.25 * 0.5 + 0.15 * 0.5;
        assert_relative_eq!(fq, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_fundamentals_gate_requires_percentiles() {
        let ratings = strong_ratings();
        // fcf_yield_pctl absent: fundamentals ignored, base scheme applies
        let not_usable = Fundamentals {
            gross_profitability_pctl: Some(0.9),
            ..Default::default()
        };
        let base = fundamental_quality(
            &ratings,
            None,
            None,
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        let gated = fundamental_quality(
            &ratings,
            None,
            Some(&not_usable),
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        assert_relative_eq!(base, gated, epsilon = 1e-12);
    }

    #[test]
    fn test_fundamentals_scheme_blends_profitability() {
        let ratings = strong_ratings();
        let fundamentals = Fundamentals {
            fcf_yield_pctl: Some(0.8),
            gross_profitability_pctl: Some(0.9),
            ..Default::default()
        };
        let fq = fundamental_quality(
            &ratings,
            None,
            Some(&fundamentals),
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        let prof_blended = 0.60 * LetterGrade::A.normalized() + 0.40 * 0.9;
        let expected = 0.30 * (4.5 / 5.0)
            + 0.22 * prof_blended
            + 0.13 * 0.8
            + 0.20 * LetterGrade::BPlus.normalized()
            + 0.15 * LetterGrade::B.normalized();
        assert_relative_eq!(fq, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_revision_momentum_shifts_weight() {
        let ratings = strong_ratings();
        let with_rm = fundamental_quality(
            &ratings,
            Some(0.9),
            None,
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        let without = fundamental_quality(
            &ratings,
            None,
            None,
            &FqWeights::default(),
            &ProfitabilityBlend::default(),
        );
        assert!((0.0..=1.0).contains(&with_rm));
        assert!(with_rm != without);
    }
}
