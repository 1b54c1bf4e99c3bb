//! Aligned sentiment index.
//!
//! Extracts a sentiment factor from a panel of proxies (closed-end fund
//! discount, IPO activity, equity share in issuance, inverted VIX, ...).
//! The alignment model that weights proxies by predictive power for
//! future market returns is external, injected behind `SentimentModel`;
//! the built-in fallback is the equal-weight average of standardized
//! proxies. When sentiment is overheated, the MR sub-score is reduced
//! to reflect elevated reversal risk.

use scoring_core::ProxyPanel;
use serde::{Deserialize, Serialize};

/// Sentiment regime from the percentile of the current index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentRegime {
    #[serde(rename = "OVERHEATED")]
    Overheated,
    #[serde(rename = "DEPRESSED")]
    Depressed,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
}

/// Result from aligned sentiment computation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment_value: Option<f64>,
    pub percentile: Option<f64>,
    pub regime: SentimentRegime,
    /// MR sub-score reduction factor; 0 means no change.
    pub mr_adjustment: f64,
}

impl SentimentResult {
    fn unavailable() -> Self {
        Self {
            sentiment_value: None,
            percentile: None,
            regime: SentimentRegime::Unavailable,
            mr_adjustment: 0.0,
        }
    }
}

/// Seam for an externally supplied alignment model (e.g. partial least
/// squares on future market returns). Receives the standardized proxy
/// panel in column-major form plus the aligned market returns, and
/// returns the extracted sentiment series, or None when it cannot fit.
pub trait SentimentModel: Send + Sync {
    fn extract(&self, standardized: &[Vec<f64>], market_returns: &[f64]) -> Option<Vec<f64>>;
}

/// Aligned sentiment index with percentile-based regime classification.
pub struct AlignedSentimentIndex {
    pub mr_reduction: f64,
    pub overheated_pctl: f64,
    pub depressed_pctl: f64,
    pub min_observations: usize,
    model: Option<Box<dyn SentimentModel>>,
}

impl AlignedSentimentIndex {
    pub fn new(
        mr_reduction: f64,
        overheated_pctl: f64,
        depressed_pctl: f64,
        min_observations: usize,
    ) -> Self {
        Self {
            mr_reduction,
            overheated_pctl,
            depressed_pctl,
            min_observations,
            model: None,
        }
    }

    /// Inject an external alignment model.
    pub fn with_model(mut self, model: Box<dyn SentimentModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Z-score each proxy series over its own history; zero-variance
    /// series pass through centered.
    fn standardize(panel: &ProxyPanel) -> Vec<Vec<f64>> {
        panel
            .series
            .iter()
            .map(|series| {
                let n = series.len() as f64;
                let mean = series.iter().sum::<f64>() / n;
                let variance =
                    series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0);
                let std = variance.sqrt();
                let divisor = if std > 0.0 { std } else { 1.0 };
                series.iter().map(|x| (x - mean) / divisor).collect()
            })
            .collect()
    }

    /// Fallback extraction: equal-weight average of standardized proxies.
    fn simple_sentiment(standardized: &[Vec<f64>]) -> Option<Vec<f64>> {
        let n_obs = standardized.iter().map(|s| s.len()).min()?;
        if n_obs == 0 {
            return None;
        }
        let k = standardized.len() as f64;
        Some(
            (0..n_obs)
                .map(|i| standardized.iter().map(|s| s[i]).sum::<f64>() / k)
                .collect(),
        )
    }

    fn classify_regime(&self, percentile: f64) -> SentimentRegime {
        if percentile >= self.overheated_pctl {
            SentimentRegime::Overheated
        } else if percentile <= self.depressed_pctl {
            SentimentRegime::Depressed
        } else {
            SentimentRegime::Neutral
        }
    }

    /// Compute the sentiment index from the proxy panel.
    pub fn compute(
        &self,
        panel: &ProxyPanel,
        market_returns: Option<&[f64]>,
    ) -> SentimentResult {
        if panel.n_proxies() == 0 || panel.n_observations() < self.min_observations {
            return SentimentResult::unavailable();
        }

        let standardized = Self::standardize(panel);

        let aligned = match (&self.model, market_returns) {
            (Some(model), Some(returns)) => model.extract(&standardized, returns),
            _ => None,
        };
        let sentiment = match aligned.or_else(|| Self::simple_sentiment(&standardized)) {
            Some(s) if s.len() >= 2 => s,
            _ => return SentimentResult::unavailable(),
        };

        let current = sentiment[sentiment.len() - 1];
        let below = sentiment.iter().filter(|&&x| x < current).count();
        let percentile = below as f64 / sentiment.len() as f64;

        let regime = self.classify_regime(percentile);
        let mr_adjustment = if regime == SentimentRegime::Overheated {
            self.mr_reduction
        } else {
            0.0
        };

        SentimentResult {
            sentiment_value: Some(current),
            percentile: Some(percentile),
            regime,
            mr_adjustment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with_trend(n: usize, slope: f64) -> ProxyPanel {
        ProxyPanel {
            names: vec!["cef_discount".into(), "ipo_volume".into(), "vix_inverted".into()],
            series: (0..3)
                .map(|p| {
                    (0..n)
                        .map(|i| slope * i as f64 + (p as f64) + ((i % 5) as f64) * 0.1)
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn test_short_panel_unavailable() {
        let asi = AlignedSentimentIndex::new(0.15, 0.80, 0.20, 60);
        let result = asi.compute(&panel_with_trend(10, 0.1), None);
        assert_eq!(result.regime, SentimentRegime::Unavailable);
        assert_eq!(result.mr_adjustment, 0.0);
    }

    #[test]
    fn test_rising_proxies_overheat_and_reduce_mr() {
        let asi = AlignedSentimentIndex::new(0.15, 0.80, 0.20, 60);
        let result = asi.compute(&panel_with_trend(120, 0.5), None);
        assert_eq!(result.regime, SentimentRegime::Overheated);
        assert_eq!(result.mr_adjustment, 0.15);
        assert!(result.percentile.unwrap() >= 0.80);
    }

    #[test]
    fn test_falling_proxies_depressed_no_adjustment() {
        let asi = AlignedSentimentIndex::new(0.15, 0.80, 0.20, 60);
        let result = asi.compute(&panel_with_trend(120, -0.5), None);
        assert_eq!(result.regime, SentimentRegime::Depressed);
        assert_eq!(result.mr_adjustment, 0.0);
    }

    struct InvertingModel;

    impl SentimentModel for InvertingModel {
        fn extract(&self, standardized: &[Vec<f64>], _market: &[f64]) -> Option<Vec<f64>> {
            let n = standardized.iter().map(|s| s.len()).min()?;
            let k = standardized.len() as f64;
            Some(
                (0..n)
                    .map(|i| -standardized.iter().map(|s| s[i]).sum::<f64>() / k)
                    .collect(),
            )
        }
    }

    #[test]
    fn test_injected_model_overrides_fallback() {
        let asi =
            AlignedSentimentIndex::new(0.15, 0.80, 0.20, 60).with_model(Box::new(InvertingModel));
        let returns = vec![0.01; 120];
        let result = asi.compute(&panel_with_trend(120, 0.5), Some(&returns));
        // The inverting model turns a rising panel into a depressed reading
        assert_eq!(result.regime, SentimentRegime::Depressed);
    }
}
