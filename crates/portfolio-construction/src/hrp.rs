//! Hierarchical Risk Parity.
//!
//! Avoids covariance inversion by clustering the correlation structure
//! and allocating risk down the dendrogram:
//!   1. Correlation distance d(i,j) = sqrt(0.5 * (1 - rho_ij))
//!   2. Single-linkage agglomerative clustering
//!   3. Quasi-diagonalization by dendrogram leaf order
//!   4. Recursive bisection, each half weighted by inverse cluster
//!      variance

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::correlation::pearson;

/// Result from HRP allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpResult {
    /// Ticker to weight; weights sum to 1.
    pub weights: HashMap<String, f64>,
    /// Assets in dendrogram leaf order.
    pub cluster_order: Vec<String>,
    pub n_assets: usize,
}

impl HrpResult {
    fn empty() -> Self {
        Self {
            weights: HashMap::new(),
            cluster_order: Vec::new(),
            n_assets: 0,
        }
    }
}

/// Hierarchical Risk Parity allocator with equal-weight fallback on
/// insufficient history.
#[derive(Debug, Clone, Copy)]
pub struct HrpAllocator {
    pub min_periods: usize,
}

impl Default for HrpAllocator {
    fn default() -> Self {
        Self { min_periods: 60 }
    }
}

impl HrpAllocator {
    pub fn new(min_periods: usize) -> Self {
        Self { min_periods }
    }

    /// Single-linkage agglomerative clustering over the distance
    /// matrix; returns asset indices in dendrogram leaf order.
    fn leaf_order(dist: &[Vec<f64>], n: usize) -> Vec<usize> {
        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        while clusters.len() > 1 {
            let mut best = (0usize, 1usize);
            let mut best_dist = f64::INFINITY;
            for a in 0..clusters.len() {
                for b in a + 1..clusters.len() {
                    // Single linkage: minimum pairwise distance
                    let mut d = f64::INFINITY;
                    for &i in &clusters[a] {
                        for &j in &clusters[b] {
                            if dist[i][j] < d {
                                d = dist[i][j];
                            }
                        }
                    }
                    if d < best_dist {
                        best_dist = d;
                        best = (a, b);
                    }
                }
            }
            let merged_right = clusters.remove(best.1);
            clusters[best.0].extend(merged_right);
        }

        clusters.into_iter().next().unwrap_or_default()
    }

    /// Variance of the inverse-variance portfolio within a cluster.
    fn cluster_variance(cov: &[Vec<f64>], items: &[usize]) -> f64 {
        let mut ivp: Vec<f64> = items.iter().map(|&i| 1.0 / cov[i][i].max(1e-12)).collect();
        let total: f64 = ivp.iter().sum();
        for w in ivp.iter_mut() {
            *w /= total;
        }

        let mut var = 0.0;
        for (a, &i) in items.iter().enumerate() {
            for (b, &j) in items.iter().enumerate() {
                var += ivp[a] * cov[i][j] * ivp[b];
            }
        }
        var
    }

    /// Recursive bisection: split the sorted list in half, weight each
    /// half by the inverse of its cluster variance, recurse.
    fn recursive_bisection(cov: &[Vec<f64>], sort_ix: &[usize]) -> HashMap<usize, f64> {
        let mut weights: HashMap<usize, f64> = sort_ix.iter().map(|&i| (i, 1.0)).collect();
        let mut stack: Vec<Vec<usize>> = vec![sort_ix.to_vec()];

        while let Some(cluster) = stack.pop() {
            if cluster.len() <= 1 {
                continue;
            }
            let mid = cluster.len() / 2;
            let left = &cluster[..mid];
            let right = &cluster[mid..];

            let var_left = Self::cluster_variance(cov, left);
            let var_right = Self::cluster_variance(cov, right);
            let total_var = var_left + var_right;
            let alpha = if total_var < 1e-12 {
                0.5
            } else {
                1.0 - var_left / total_var
            };

            for &i in left {
                if let Some(w) = weights.get_mut(&i) {
                    *w *= alpha;
                }
            }
            for &i in right {
                if let Some(w) = weights.get_mut(&i) {
                    *w *= 1.0 - alpha;
                }
            }

            stack.push(left.to_vec());
            stack.push(right.to_vec());
        }

        weights
    }

    /// Compute HRP portfolio weights from daily return series.
    pub fn compute_weights(
        &self,
        returns: &[(String, Vec<f64>)],
        exclude: &[String],
    ) -> HrpResult {
        let cols: Vec<(&String, &Vec<f64>)> = returns
            .iter()
            .filter(|(name, _)| !exclude.contains(name))
            .map(|(name, series)| (name, series))
            .collect();

        match cols.len() {
            0 => return HrpResult::empty(),
            1 => {
                let name = cols[0].0.clone();
                return HrpResult {
                    weights: HashMap::from([(name.clone(), 1.0)]),
                    cluster_order: vec![name],
                    n_assets: 1,
                };
            }
            _ => {}
        }

        let common = cols.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
        let n = cols.len();

        if common < self.min_periods {
            // Insufficient data, fall back to equal weight
            let equal = 1.0 / n as f64;
            return HrpResult {
                weights: cols.iter().map(|(name, _)| ((*name).clone(), equal)).collect(),
                cluster_order: cols.iter().map(|(name, _)| (*name).clone()).collect(),
                n_assets: n,
            };
        }

        let aligned: Vec<&[f64]> = cols
            .iter()
            .map(|(_, s)| &s[s.len() - common..])
            .collect();

        // Correlation -> distance
        let mut dist = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let rho = pearson(aligned[i], aligned[j]);
                let d = (0.5 * (1.0 - rho)).max(0.0).sqrt();
                dist[i][j] = d;
                dist[j][i] = d;
            }
        }

        let sort_ix = Self::leaf_order(&dist, n);

        // Sample covariance over the common window
        let means: Vec<f64> = aligned
            .iter()
            .map(|s| s.iter().sum::<f64>() / common as f64)
            .collect();
        let mut cov = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let mut acc = 0.0;
                for t in 0..common {
                    acc += (aligned[i][t] - means[i]) * (aligned[j][t] - means[j]);
                }
                let c = acc / (common as f64 - 1.0);
                cov[i][j] = c;
                cov[j][i] = c;
            }
        }

        let raw = Self::recursive_bisection(&cov, &sort_ix);
        let total: f64 = raw.values().sum();

        let weights: HashMap<String, f64> = raw
            .into_iter()
            .map(|(i, w)| {
                let normalized = if total > 0.0 { w / total } else { 1.0 / n as f64 };
                (cols[i].0.clone(), normalized)
            })
            .collect();

        HrpResult {
            cluster_order: sort_ix.iter().map(|&i| cols[i].0.clone()).collect(),
            n_assets: weights.len(),
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_returns(n_assets: usize, n_days: usize, seed: u64) -> Vec<(String, Vec<f64>)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n_assets)
            .map(|a| {
                let series = (0..n_days).map(|_| rng.gen_range(-0.02..0.02)).collect();
                (format!("A{a}"), series)
            })
            .collect()
    }

    #[test]
    fn test_weights_sum_to_one_all_positive() {
        let hrp = HrpAllocator::default();
        let returns = random_returns(6, 250, 42);
        let result = hrp.compute_weights(&returns, &[]);

        let total: f64 = result.weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-4);
        assert!(result.weights.values().all(|&w| w > 0.0));
        assert!(result.weights.values().all(|&w| w < 0.95));
        assert_eq!(result.cluster_order.len(), 6);
    }

    #[test]
    fn test_single_asset_gets_everything() {
        let hrp = HrpAllocator::default();
        let returns = random_returns(1, 250, 1);
        let result = hrp.compute_weights(&returns, &[]);
        assert_relative_eq!(result.weights["A0"], 1.0);
    }

    #[test]
    fn test_equal_weight_fallback_on_short_history() {
        let hrp = HrpAllocator::default();
        let returns = random_returns(4, 20, 2);
        let result = hrp.compute_weights(&returns, &[]);
        for w in result.weights.values() {
            assert_relative_eq!(*w, 0.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_correlated_pair_clusters_together() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let base: Vec<f64> = (0..250).map(|_| rng.gen_range(-0.02..0.02)).collect();
        let twin: Vec<f64> = base.iter().map(|r| r + rng.gen_range(-0.001..0.001)).collect();
        let indep: Vec<f64> = (0..250).map(|_| rng.gen_range(-0.02..0.02)).collect();
        let indep2: Vec<f64> = (0..250).map(|_| rng.gen_range(-0.02..0.02)).collect();

        let returns = vec![
            ("BASE".to_string(), base),
            ("INDEP".to_string(), indep),
            ("TWIN".to_string(), twin),
            ("INDEP2".to_string(), indep2),
        ];
        let result = HrpAllocator::default().compute_weights(&returns, &[]);

        let order = &result.cluster_order;
        let base_pos = order.iter().position(|t| t == "BASE").unwrap();
        let twin_pos = order.iter().position(|t| t == "TWIN").unwrap();
        assert_eq!(base_pos.abs_diff(twin_pos), 1, "twins should be adjacent leaves");
    }

    #[test]
    fn test_exclusion() {
        let hrp = HrpAllocator::default();
        let returns = random_returns(3, 250, 5);
        let result = hrp.compute_weights(&returns, &["A1".to_string()]);
        assert_eq!(result.n_assets, 2);
        assert!(!result.weights.contains_key("A1"));
    }
}
