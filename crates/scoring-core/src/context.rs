//! Shared per-run scoring context.
//!
//! Bundles everything that is constant across ticker iterations into one
//! read-only value. Built once per run, then borrowed by every
//! `score_ticker` call; ticker-specific inputs stay positional.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{DefenseInfo, RatingBundle, VixRegime};

/// One weekly snapshot of the rating universe, newest first in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSnapshot {
    pub generated_at: NaiveDateTime,
    pub ratings: HashMap<String, RatingBundle>,
}

/// Previous run's quant score for a ticker, for deterioration detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrevScore {
    pub quant_score: Option<f64>,
    pub date: NaiveDate,
}

/// Per-ticker fundamentals with sector-relative percentiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    #[serde(default)]
    pub fcf_yield: Option<f64>,
    #[serde(default)]
    pub gross_profitability: Option<f64>,
    #[serde(default)]
    pub ev_to_ebitda: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub fcf_yield_pctl: Option<f64>,
    #[serde(default)]
    pub gross_profitability_pctl: Option<f64>,
    #[serde(default)]
    pub ev_to_ebitda_pctl: Option<f64>,
}

impl Fundamentals {
    /// The FQ/VC blends engage only once the percentile pipeline has run.
    pub fn is_usable(&self) -> bool {
        self.fcf_yield_pctl.is_some()
    }
}

/// Column-oriented panel of sentiment proxy observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyPanel {
    pub names: Vec<String>,
    /// One inner vec per proxy, aligned by observation index.
    pub series: Vec<Vec<f64>>,
}

impl ProxyPanel {
    pub fn n_observations(&self) -> usize {
        self.series.iter().map(|s| s.len()).min().unwrap_or(0)
    }

    pub fn n_proxies(&self) -> usize {
        self.series.len()
    }
}

/// Shared per-run scoring context.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    /// Pre-computed Market Regime sub-score for this run.
    pub market_regime_score: f64,

    /// VIX regime classified from the current level.
    pub vix_regime: Option<VixRegime>,

    /// Benchmark closes (2-year window) for relative strength.
    pub spy_close: Option<Vec<f64>>,

    /// Prior weekly rating snapshots, most recent first.
    pub grade_history: Option<Vec<GradeSnapshot>>,

    /// Previous run's per-ticker quant scores.
    pub prev_scores: Option<HashMap<String, PrevScore>>,

    /// Per-ticker fundamentals with sector percentiles.
    pub fundamentals: Option<HashMap<String, Fundamentals>>,

    /// Drawdown-defense classifications.
    pub drawdown_classifications: Option<HashMap<String, DefenseInfo>>,

    /// Sentiment proxy panel for the aligned-sentiment overlay.
    pub sentiment_proxies: Option<ProxyPanel>,

    /// Monthly market returns for the sentiment and crash overlays.
    pub market_returns: Option<Vec<f64>>,
}

impl ScoringContext {
    pub fn fundamentals_for(&self, ticker: &str) -> Option<&Fundamentals> {
        self.fundamentals.as_ref()?.get(ticker)
    }

    pub fn prev_score_for(&self, ticker: &str) -> Option<&PrevScore> {
        self.prev_scores.as_ref()?.get(ticker)
    }

    /// Defense lookup, falling back to the dotted share-class spelling.
    pub fn defense_for(&self, ticker: &str) -> Option<DefenseInfo> {
        let map = self.drawdown_classifications.as_ref()?;
        map.get(ticker)
            .or_else(|| map.get(&ticker.replace('-', ".")))
            .copied()
    }
}
