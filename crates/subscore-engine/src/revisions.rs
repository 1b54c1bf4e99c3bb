//! Revision momentum from weekly grade-history snapshots.
//!
//! Earnings momentum subsumes price momentum; the delta of the revisions
//! grade over four weeks plus the consistency of its path gives a
//! supplementary FQ input and the EPS-revision sell criterion.

use scoring_core::{
    GradeSnapshot, RevisionDirection, RevisionMomentum, RevisionMomentumConfig,
};

/// Revision momentum for one ticker, or None with insufficient history.
///
/// Requires at least `min_history_weeks` snapshots spanning at least
/// `min_calendar_days` between newest and oldest, to avoid measuring
/// day-to-day noise. History is ordered newest first.
pub fn revision_momentum(
    ticker: &str,
    grade_history: Option<&[GradeSnapshot]>,
    config: &RevisionMomentumConfig,
) -> Option<RevisionMomentum> {
    let history = grade_history?;
    if history.len() < config.min_history_weeks {
        return None;
    }

    // Calendar span gate
    let newest = history.first()?.generated_at;
    let oldest = history.last()?.generated_at;
    if (newest - oldest).num_days() < config.min_calendar_days {
        return None;
    }

    // Revisions grades from the last 4-8 weeks, most recent first
    let valid: Vec<f64> = history
        .iter()
        .take(8)
        .filter_map(|snapshot| {
            snapshot
                .ratings
                .get(ticker)
                .and_then(|r| r.revisions)
                .map(|g| g.normalized())
        })
        .collect();

    if valid.len() < config.min_history_weeks {
        return None;
    }

    let current = valid[0];
    let four_weeks_ago = valid[3.min(valid.len() - 1)];
    let delta_4w = current - four_weeks_ago;

    // Net direction consistency across week-to-week transitions
    let mut pos = 0usize;
    let mut neg = 0usize;
    let transitions = valid.len() - 1;
    for pair in valid.windows(2) {
        if pair[0] > pair[1] {
            pos += 1;
        } else if pair[0] < pair[1] {
            neg += 1;
        }
    }
    let consistency = if transitions == 0 {
        0.0
    } else if pos > neg {
        pos as f64 / transitions as f64
    } else {
        -(neg as f64 / transitions as f64)
    };

    let direction = if delta_4w > 0.05 {
        RevisionDirection::Positive
    } else if delta_4w < -0.05 {
        RevisionDirection::Negative
    } else {
        RevisionDirection::Flat
    };

    let delta_score = ((delta_4w + 0.3) / 0.6).clamp(0.0, 1.0);
    let consistency_score = ((consistency + 1.0) / 2.0).clamp(0.0, 1.0);
    let score = delta_score * 0.60 + consistency_score * 0.40;

    Some(RevisionMomentum {
        score,
        direction,
        delta_4w,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scoring_core::{LetterGrade, RatingBundle};
    use std::collections::HashMap;

    fn snapshot(days_ago: i64, grade: LetterGrade) -> GradeSnapshot {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap() - chrono::Duration::days(days_ago);
        let mut ratings = HashMap::new();
        ratings.insert(
            "AAPL".to_string(),
            RatingBundle {
                revisions: Some(grade),
                ..Default::default()
            },
        );
        GradeSnapshot {
            generated_at: date.and_hms_opt(6, 0, 0).unwrap(),
            ratings,
        }
    }

    #[test]
    fn test_improving_revisions_positive() {
        let history = vec![
            snapshot(0, LetterGrade::A),
            snapshot(7, LetterGrade::AMinus),
            snapshot(14, LetterGrade::BPlus),
            snapshot(21, LetterGrade::B),
        ];
        let result =
            revision_momentum("AAPL", Some(&history), &RevisionMomentumConfig::default()).unwrap();
        assert_eq!(result.direction, RevisionDirection::Positive);
        assert!(result.delta_4w > 0.0);
        assert!(result.score > 0.5);
    }

    #[test]
    fn test_deteriorating_revisions_negative() {
        let history = vec![
            snapshot(0, LetterGrade::C),
            snapshot(7, LetterGrade::CPlus),
            snapshot(14, LetterGrade::BMinus),
            snapshot(21, LetterGrade::B),
        ];
        let result =
            revision_momentum("AAPL", Some(&history), &RevisionMomentumConfig::default()).unwrap();
        assert_eq!(result.direction, RevisionDirection::Negative);
        assert!(result.delta_4w < 0.0);
    }

    #[test]
    fn test_insufficient_history_is_none() {
        let history = vec![snapshot(0, LetterGrade::A), snapshot(7, LetterGrade::A)];
        assert!(
            revision_momentum("AAPL", Some(&history), &RevisionMomentumConfig::default()).is_none()
        );
        assert!(revision_momentum("AAPL", None, &RevisionMomentumConfig::default()).is_none());
    }

    #[test]
    fn test_calendar_span_gate() {
        // Four snapshots only two days apart
        let history = vec![
            snapshot(0, LetterGrade::A),
            snapshot(1, LetterGrade::A),
            snapshot(1, LetterGrade::A),
            snapshot(2, LetterGrade::A),
        ];
        assert!(
            revision_momentum("AAPL", Some(&history), &RevisionMomentumConfig::default()).is_none()
        );
    }

    #[test]
    fn test_unknown_ticker_is_none() {
        let history = vec![
            snapshot(0, LetterGrade::A),
            snapshot(7, LetterGrade::A),
            snapshot(14, LetterGrade::A),
            snapshot(21, LetterGrade::A),
        ];
        assert!(
            revision_momentum("MSFT", Some(&history), &RevisionMomentumConfig::default()).is_none()
        );
    }
}
