//! Pairwise correlation analysis and effective bets.
//!
//! Effective bets is exp of the Shannon entropy of the correlation
//! matrix's normalized eigenvalues: N uncorrelated assets score N,
//! N perfectly correlated assets score 1.

use std::collections::HashSet;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Pearson correlation of two equal-length slices.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_a = a[..n].iter().sum::<f64>() / nf;
    let mean_b = b[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < 1e-15 || var_b < 1e-15 {
        0.0
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

/// Result from portfolio correlation analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// (ticker_a, ticker_b, correlation) pairs above the threshold,
    /// sorted by absolute correlation descending.
    pub high_corr_pairs: Vec<(String, String, f64)>,
    /// Eigenvalue-entropy diversification measure.
    pub effective_bets: f64,
    pub tickers: Vec<String>,
    /// Full correlation matrix in `tickers` order.
    pub matrix: Vec<Vec<f64>>,
    pub n_tickers: usize,
    pub min_data_days: usize,
    /// True when effective bets sits below the concentration threshold.
    pub is_concentrated: bool,
}

/// A flagged buy candidate correlated with an existing holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationWarning {
    pub ticker: String,
    pub correlated_with: String,
    pub correlation: f64,
}

fn effective_bets_from_matrix(matrix: &[Vec<f64>]) -> f64 {
    let n = matrix.len();
    let m = DMatrix::from_fn(n, n, |i, j| matrix[i][j]);
    let eigenvalues = m.symmetric_eigen().eigenvalues;

    let positive: Vec<f64> = eigenvalues.iter().copied().filter(|&e| e > 1e-10).collect();
    if positive.is_empty() {
        return 0.0;
    }
    let total: f64 = positive.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let entropy: f64 = positive
        .iter()
        .map(|&e| {
            let p = e / total;
            -p * p.ln()
        })
        .sum();
    entropy.exp()
}

/// Compute pairwise correlations and effective bets for the holdings.
///
/// Series are aligned on their common tail; fewer than
/// `min_common_days` overlapping observations yields a degenerate
/// report with effective bets equal to the asset count.
pub fn compute_correlation_report(
    returns: &[(String, Vec<f64>)],
    corr_threshold: f64,
    concentration_threshold: f64,
    min_common_days: usize,
) -> CorrelationReport {
    let n = returns.len();
    if n < 2 {
        return CorrelationReport {
            effective_bets: n as f64,
            n_tickers: n,
            ..Default::default()
        };
    }

    let common = returns.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
    if common < min_common_days {
        return CorrelationReport {
            effective_bets: n as f64,
            n_tickers: n,
            min_data_days: common,
            ..Default::default()
        };
    }

    let aligned: Vec<&[f64]> = returns.iter().map(|(_, s)| &s[s.len() - common..]).collect();
    let tickers: Vec<String> = returns.iter().map(|(name, _)| name.clone()).collect();

    let mut matrix = vec![vec![1.0; n]; n];
    let mut high_pairs: Vec<(String, String, f64)> = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let rho = pearson(aligned[i], aligned[j]);
            matrix[i][j] = rho;
            matrix[j][i] = rho;
            if rho.abs() > corr_threshold {
                high_pairs.push((tickers[i].clone(), tickers[j].clone(), rho));
            }
        }
    }
    high_pairs.sort_by(|a, b| {
        b.2.abs()
            .partial_cmp(&a.2.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let effective_bets = effective_bets_from_matrix(&matrix);

    CorrelationReport {
        high_corr_pairs: high_pairs,
        effective_bets,
        tickers,
        matrix,
        n_tickers: n,
        min_data_days: common,
        is_concentrated: effective_bets < concentration_threshold,
    }
}

/// Check proposed buys for concentration risk against held tickers.
///
/// Active only when effective bets is below the concentration
/// threshold; effective bets is computed once per run and consumed
/// here, never recomputed.
pub fn check_concentration_risk(
    high_corr_pairs: &[(String, String, f64)],
    effective_bets: f64,
    buy_tickers: &HashSet<String>,
    held_tickers: &HashSet<String>,
    concentration_threshold: f64,
    pair_threshold: f64,
) -> Vec<ConcentrationWarning> {
    if effective_bets >= concentration_threshold {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    for (a, b, corr) in high_corr_pairs {
        if corr.abs() < pair_threshold {
            continue;
        }
        if buy_tickers.contains(a) && held_tickers.contains(b) {
            warnings.push(ConcentrationWarning {
                ticker: a.clone(),
                correlated_with: b.clone(),
                correlation: *corr,
            });
        } else if buy_tickers.contains(b) && held_tickers.contains(a) {
            warnings.push(ConcentrationWarning {
                ticker: b.clone(),
                correlated_with: a.clone(),
                correlation: *corr,
            });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn independent_returns(n_assets: usize, n_days: usize, seed: u64) -> Vec<(String, Vec<f64>)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n_assets)
            .map(|a| {
                let series = (0..n_days).map(|_| rng.gen_range(-0.02..0.02)).collect();
                (format!("A{a}"), series)
            })
            .collect()
    }

    #[test]
    fn test_pearson_perfect_and_anti() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(pearson(&a, &b), 1.0, epsilon = 1e-12);

        let c = vec![4.0, 3.0, 2.0, 1.0];
        assert_relative_eq!(pearson(&a, &c), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_effective_bets_near_n_for_independent_assets() {
        let returns = independent_returns(5, 500, 21);
        let report = compute_correlation_report(&returns, 0.80, 20.0, 30);
        assert!(report.effective_bets > 4.0);
        assert!(report.effective_bets <= 5.0 + 1e-9);
        assert!(report.high_corr_pairs.is_empty());
    }

    #[test]
    fn test_effective_bets_near_one_for_clones() {
        let mut rng = ChaCha8Rng::seed_from_u64(33);
        let base: Vec<f64> = (0..300).map(|_| rng.gen_range(-0.02..0.02)).collect();
        let returns: Vec<(String, Vec<f64>)> = (0..4)
            .map(|i| (format!("C{i}"), base.clone()))
            .collect();
        let report = compute_correlation_report(&returns, 0.80, 20.0, 30);
        assert!(report.effective_bets < 1.5);
        assert!(report.is_concentrated);
        assert_eq!(report.high_corr_pairs.len(), 6);
    }

    #[test]
    fn test_short_overlap_degenerate_report() {
        let returns = independent_returns(3, 10, 2);
        let report = compute_correlation_report(&returns, 0.80, 20.0, 30);
        assert_relative_eq!(report.effective_bets, 3.0);
        assert!(report.matrix.is_empty());
    }

    #[test]
    fn test_concentration_check_matches_buys_to_holdings() {
        let pairs = vec![
            ("NEW".to_string(), "HELD".to_string(), 0.85),
            ("NEW".to_string(), "OTHER".to_string(), 0.95),
            ("WEAK".to_string(), "HELD".to_string(), 0.5),
        ];
        let buys: HashSet<String> = ["NEW".to_string(), "WEAK".to_string()].into();
        let held: HashSet<String> = ["HELD".to_string()].into();

        let warnings = check_concentration_risk(&pairs, 10.0, &buys, &held, 20.0, 0.70);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].ticker, "NEW");
        assert_eq!(warnings[0].correlated_with, "HELD");

        // Well-diversified book: no warnings at all
        let none = check_concentration_risk(&pairs, 25.0, &buys, &held, 20.0, 0.70);
        assert!(none.is_empty());
    }
}
