use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::grades::LetterGrade;

/// Daily OHLCV bar. Only close is mandatory; OHLC and volume depend on
/// what the price provider supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Bar {
    /// Close-only bar, for providers without OHLCV depth.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Immutable daily price series for one ticker.
///
/// Construction validates the invariants the scoring path relies on:
/// strictly increasing dates and positive closes. Built once per ticker
/// per run, read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, ScoringError> {
        for window in bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(ScoringError::InvalidData(format!(
                    "bar dates must be strictly increasing: {} followed by {}",
                    window[0].date, window[1].date
                )));
            }
        }
        if let Some(bad) = bars.iter().find(|b| !(b.close > 0.0)) {
            return Err(ScoringError::InvalidData(format!(
                "close must be positive, got {} on {}",
                bad.close, bad.date
            )));
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volume series, or None when any bar is missing volume.
    pub fn volumes(&self) -> Option<Vec<f64>> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// Exogenous factor rating bundle for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingBundle {
    /// Composite quant score in [0, 5].
    #[serde(default)]
    pub quant_score: Option<f64>,
    #[serde(default)]
    pub momentum: Option<LetterGrade>,
    #[serde(default)]
    pub profitability: Option<LetterGrade>,
    #[serde(default)]
    pub revisions: Option<LetterGrade>,
    #[serde(default)]
    pub growth: Option<LetterGrade>,
    #[serde(default)]
    pub valuation: Option<LetterGrade>,
}

/// Market volatility regime classified from the VIX level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VixRegime {
    #[serde(rename = "COMPLACENT")]
    Complacent,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "FEAR")]
    Fear,
    #[serde(rename = "PANIC")]
    Panic,
}

impl VixRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            VixRegime::Complacent => "COMPLACENT",
            VixRegime::Normal => "NORMAL",
            VixRegime::Fear => "FEAR",
            VixRegime::Panic => "PANIC",
        }
    }

    /// FEAR and PANIC activate the drawdown-defense rules.
    pub fn is_stressed(&self) -> bool {
        matches!(self, VixRegime::Fear | VixRegime::Panic)
    }
}

impl fmt::Display for VixRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete signal classification of a DCS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DcsSignal {
    #[serde(rename = "STRONG BUY DIP")]
    StrongBuyDip,
    #[serde(rename = "HIGH CONVICTION")]
    HighConviction,
    #[serde(rename = "BUY DIP")]
    BuyDip,
    #[serde(rename = "WATCH")]
    Watch,
    #[serde(rename = "WEAK")]
    Weak,
    #[serde(rename = "AVOID")]
    Avoid,
}

impl DcsSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            DcsSignal::StrongBuyDip => "STRONG BUY DIP",
            DcsSignal::HighConviction => "HIGH CONVICTION",
            DcsSignal::BuyDip => "BUY DIP",
            DcsSignal::Watch => "WATCH",
            DcsSignal::Weak => "WEAK",
            DcsSignal::Avoid => "AVOID",
        }
    }

    /// True for classifications that qualify as actionable dip-buys.
    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            DcsSignal::StrongBuyDip | DcsSignal::HighConviction | DcsSignal::BuyDip
        )
    }
}

impl fmt::Display for DcsSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawdown-defense class from downside capture vs the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseClass {
    #[serde(rename = "HEDGE")]
    Hedge,
    #[serde(rename = "DEFENSIVE")]
    Defensive,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "CYCLICAL")]
    Cyclical,
    #[serde(rename = "AMPLIFIER")]
    Amplifier,
}

impl DefenseClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefenseClass::Hedge => "HEDGE",
            DefenseClass::Defensive => "DEFENSIVE",
            DefenseClass::Moderate => "MODERATE",
            DefenseClass::Cyclical => "CYCLICAL",
            DefenseClass::Amplifier => "AMPLIFIER",
        }
    }
}

impl fmt::Display for DefenseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefenseClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEDGE" => Ok(DefenseClass::Hedge),
            "DEFENSIVE" => Ok(DefenseClass::Defensive),
            "MODERATE" => Ok(DefenseClass::Moderate),
            "CYCLICAL" => Ok(DefenseClass::Cyclical),
            "AMPLIFIER" => Ok(DefenseClass::Amplifier),
            _ => Err(()),
        }
    }
}

/// MACD line/signal crossover state over the last three bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    #[serde(rename = "bullish")]
    Bullish,
    #[serde(rename = "bearish")]
    Bearish,
    #[serde(rename = "neutral")]
    Neutral,
}

impl Crossover {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crossover::Bullish => "bullish",
            Crossover::Bearish => "bearish",
            Crossover::Neutral => "neutral",
        }
    }
}

/// Direction of a regression-slope trend with a small deadband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "rising")]
    Rising,
    #[serde(rename = "falling")]
    Falling,
    #[serde(rename = "flat")]
    Flat,
}

/// Price/volume divergence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Divergence {
    #[serde(rename = "bullish")]
    Bullish,
    #[serde(rename = "bearish")]
    Bearish,
    #[serde(rename = "none")]
    None,
}

impl Divergence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Divergence::Bullish => "bullish",
            Divergence::Bearish => "bearish",
            Divergence::None => "none",
        }
    }
}

/// The five normalized sub-scores that compose the DCS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubScores {
    pub mq: f64,
    pub fq: f64,
    pub to: f64,
    pub mr: f64,
    pub vc: f64,
}

impl SubScores {
    /// True when every sub-score sits in [0, 1].
    pub fn in_bounds(&self) -> bool {
        [self.mq, self.fq, self.to, self.mr, self.vc]
            .iter()
            .all(|s| (0.0..=1.0).contains(s))
    }
}

/// Per-ticker drawdown-defense classification supplied by the macro layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DefenseInfo {
    pub classification: DefenseClass,
    pub downside_capture: f64,
}

/// Direction of revision momentum over the 4-week window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionDirection {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "negative")]
    Negative,
}

/// Revision momentum readout from weekly grade history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RevisionMomentum {
    pub score: f64,
    pub direction: RevisionDirection,
    pub delta_4w: f64,
}
