//! Typed signal taxonomy for the scoring pipeline.
//!
//! A `Signal` is one frozen event with a semantic type, severity,
//! message, legacy prefix, and structured metadata. The `SignalBoard`
//! collects signals in insertion order, resolves conflicts into a
//! `NetAction`, and renders the legacy `"<prefix> <message>"` strings
//! that external reporting consumes. That string format and the signal
//! record serialization are stable public contracts.

use std::fmt;

use scoring_core::DefenseClass;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Semantic category of a scoring signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    /// 200d SMA breach 10d+, quant drop, EPS revisions 3+ sub-grades down.
    #[serde(rename = "SELL_HARD")]
    SellHard,
    /// SMA breach 7-9d, EPS revisions 2 sub-grades down.
    #[serde(rename = "EARLY_WARNING")]
    EarlyWarning,
    /// Reversal confirmed.
    #[serde(rename = "BUY_CONFIRMED")]
    BuyConfirmed,
    /// Bottom turning.
    #[serde(rename = "BUY_WATCHLIST")]
    BuyWatchlist,
    /// Defensive hold (drawdown insurance).
    #[serde(rename = "HOLD_OVERRIDE")]
    HoldOverride,
    /// Amplifier warning.
    #[serde(rename = "TRIM_PRIORITY")]
    TrimPriority,
    /// Concentration.
    #[serde(rename = "DEPLOYMENT_GATE")]
    DeploymentGate,
    /// Quant freshness check.
    #[serde(rename = "VERIFY")]
    Verify,
}

/// Signal severity for downstream prioritization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "INFO")]
    Info,
}

/// One scoring signal with typed metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_type: SignalType,
    pub severity: Severity,
    /// Human-readable description, the part after the prefix.
    pub message: String,
    /// Colon-terminated prefix used in legacy flag strings.
    pub legacy_prefix: String,
    /// Structured data for programmatic consumers.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Signal {
    /// Reconstruct the exact legacy flag string.
    pub fn to_legacy_flag(&self) -> String {
        format!("{} {}", self.legacy_prefix, self.message)
    }
}

/// Net recommended action resolved from all signals on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetAction {
    #[serde(rename = "REVIEW")]
    Review,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "WATCH")]
    Watch,
    #[serde(rename = "TRIM")]
    Trim,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WATCHLIST")]
    Watchlist,
    #[serde(rename = "NONE")]
    None,
}

impl NetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetAction::Review => "REVIEW",
            NetAction::Hold => "HOLD",
            NetAction::Watch => "WATCH",
            NetAction::Trim => "TRIM",
            NetAction::Buy => "BUY",
            NetAction::Watchlist => "WATCHLIST",
            NetAction::None => "NONE",
        }
    }
}

impl fmt::Display for NetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered container for all signals produced while scoring one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBoard {
    signals: Vec<Signal>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal to the board.
    pub fn add(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// All signals in insertion order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    fn of_type(&self, signal_type: SignalType) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .filter(move |s| s.signal_type == signal_type)
    }

    pub fn sells(&self) -> Vec<&Signal> {
        self.of_type(SignalType::SellHard).collect()
    }

    pub fn warnings(&self) -> Vec<&Signal> {
        self.of_type(SignalType::EarlyWarning).collect()
    }

    /// BUY_CONFIRMED and BUY_WATCHLIST signals.
    pub fn buy_signals(&self) -> Vec<&Signal> {
        self.signals
            .iter()
            .filter(|s| {
                matches!(
                    s.signal_type,
                    SignalType::BuyConfirmed | SignalType::BuyWatchlist
                )
            })
            .collect()
    }

    pub fn hold_overrides(&self) -> Vec<&Signal> {
        self.of_type(SignalType::HoldOverride).collect()
    }

    pub fn trim_signals(&self) -> Vec<&Signal> {
        self.of_type(SignalType::TrimPriority).collect()
    }

    pub fn deployment_gates(&self) -> Vec<&Signal> {
        self.of_type(SignalType::DeploymentGate).collect()
    }

    pub fn verify_signals(&self) -> Vec<&Signal> {
        self.of_type(SignalType::Verify).collect()
    }

    /// True when 2+ hard sells require a position review.
    pub fn has_sell_review(&self) -> bool {
        self.sells().len() >= 2
    }

    /// Resolve the net recommended action; first matching rule wins.
    pub fn net_action(&self) -> NetAction {
        let n_sells = self.sells().len();

        if n_sells >= 2 {
            return NetAction::Review;
        }
        if n_sells == 1 {
            if !self.hold_overrides().is_empty() {
                return NetAction::Hold;
            }
            return NetAction::Watch;
        }

        // No hard sells below this point
        if !self.trim_signals().is_empty() {
            return NetAction::Trim;
        }
        if self.of_type(SignalType::BuyConfirmed).next().is_some() {
            return NetAction::Buy;
        }
        if self.of_type(SignalType::BuyWatchlist).next().is_some() {
            return NetAction::Watchlist;
        }
        if !self.warnings().is_empty() {
            return NetAction::Watch;
        }

        NetAction::None
    }

    /// Render every signal as its legacy flag string, in insertion order.
    pub fn to_legacy_flags(&self) -> Vec<String> {
        self.signals.iter().map(Signal::to_legacy_flag).collect()
    }

    /// Serialize to the public record sequence.
    pub fn to_records(&self) -> Vec<serde_json::Value> {
        self.signals
            .iter()
            .map(|s| serde_json::to_value(s).unwrap_or(serde_json::Value::Null))
            .collect()
    }

    /// Rebuild a board from serialized records.
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self, serde_json::Error> {
        let mut board = Self::new();
        for record in records {
            board.add(serde_json::from_value(record.clone())?);
        }
        Ok(board)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Factory functions, one per signal origin
// ---------------------------------------------------------------------------

/// Sell: 10+ consecutive days >3% below the 200d SMA.
pub fn sma_breach_sell(days_below: usize) -> Signal {
    Signal {
        signal_type: SignalType::SellHard,
        severity: Severity::High,
        message: format!("{days_below} consecutive days >3% below 200d SMA"),
        legacy_prefix: "SELL:".to_string(),
        metadata: json!({"criterion": "sma_breach", "days_below": days_below}),
    }
}

/// Early warning: 7-9 consecutive days >3% below the 200d SMA.
pub fn sma_breach_warning(days_below: usize) -> Signal {
    Signal {
        signal_type: SignalType::EarlyWarning,
        severity: Severity::Medium,
        message: format!("{days_below} consecutive days >3% below 200d SMA (trigger at 10)"),
        legacy_prefix: "WARNING:".to_string(),
        metadata: json!({"criterion": "sma_breach", "days_below": days_below}),
    }
}

/// Sell: quant score dropped more than a point since the prior snapshot.
pub fn quant_drop_sell(quant_delta: f64, compare_date: &str) -> Signal {
    Signal {
        signal_type: SignalType::SellHard,
        severity: Severity::High,
        message: format!("SA Quant dropped {quant_delta:+.2} since {compare_date}"),
        legacy_prefix: "SELL:".to_string(),
        metadata: json!({
            "criterion": "quant_drop",
            "delta": quant_delta,
            "compare_date": compare_date,
        }),
    }
}

/// Sell: EPS revisions dropped 3+ sub-grades in 4 weeks.
pub fn eps_rev_sell(sub_grade_steps: f64, delta_4w: f64) -> Signal {
    Signal {
        signal_type: SignalType::SellHard,
        severity: Severity::High,
        message: format!(
            "EPS Revisions dropped {sub_grade_steps:.0} sub-grades in 4 weeks (delta {delta_4w:+.3})"
        ),
        legacy_prefix: "SELL:".to_string(),
        metadata: json!({
            "criterion": "eps_revision",
            "sub_grade_steps": sub_grade_steps,
            "delta_4w": delta_4w,
        }),
    }
}

/// Early warning: EPS revisions declined 2 sub-grades in 4 weeks.
pub fn eps_rev_warning(sub_grade_steps: f64, delta_4w: f64) -> Signal {
    Signal {
        signal_type: SignalType::EarlyWarning,
        severity: Severity::Medium,
        message: format!(
            "EPS Revisions declined {sub_grade_steps:.0} sub-grades in 4 weeks (delta {delta_4w:+.3}, trigger at 3)"
        ),
        legacy_prefix: "WARNING:".to_string(),
        metadata: json!({
            "criterion": "eps_revision",
            "sub_grade_steps": sub_grade_steps,
            "delta_4w": delta_4w,
        }),
    }
}

/// Verify: RSI under 30 on a quant 4+ name, the rating may be stale.
pub fn quant_freshness_warning() -> Signal {
    Signal {
        signal_type: SignalType::Verify,
        severity: Severity::Info,
        message: "RSI < 30 on Q4+ stock, verify quant score is current".to_string(),
        legacy_prefix: "QUANT_CHECK:".to_string(),
        metadata: json!({"criterion": "quant_freshness"}),
    }
}

/// Hold override: hedge/defensive asset provides drawdown insurance.
pub fn defensive_hold(classification: DefenseClass, downside_capture: f64) -> Signal {
    Signal {
        signal_type: SignalType::HoldOverride,
        severity: Severity::Medium,
        message: format!(
            "{classification} asset (DC={downside_capture:.2}) provides drawdown insurance, consider extended grace (270d)"
        ),
        legacy_prefix: "DEFENSIVE_HOLD:".to_string(),
        metadata: json!({
            "criterion": "defensive_hold",
            "classification": classification.as_str(),
            "downside_capture": downside_capture,
        }),
    }
}

/// Trim priority: amplifier asset magnifies losses in drawdowns.
pub fn amplifier_warning(downside_capture: f64) -> Signal {
    Signal {
        signal_type: SignalType::TrimPriority,
        severity: Severity::High,
        message: format!(
            "DC={downside_capture:.2} amplifies losses in drawdowns. Consider priority trim."
        ),
        legacy_prefix: "AMPLIFIER_WARNING:".to_string(),
        metadata: json!({
            "criterion": "amplifier_warning",
            "downside_capture": downside_capture,
        }),
    }
}

/// Buy confirmed: elevated DCS plus a Bollinger lower breach.
pub fn reversal_confirmed() -> Signal {
    Signal {
        signal_type: SignalType::BuyConfirmed,
        severity: Severity::Low,
        message: "DCS >= 65 + BB lower breach, higher-conviction dip-buy".to_string(),
        legacy_prefix: "REVERSAL CONFIRMED:".to_string(),
        metadata: json!({"criterion": "reversal_confirmed"}),
    }
}

/// Buy watchlist: MACD histogram rising below zero on an oversold Q3+ name.
pub fn bottom_turning() -> Signal {
    Signal {
        signal_type: SignalType::BuyWatchlist,
        severity: Severity::Low,
        message: "MACD hist rising from below zero + RSI < 30 + Q3+, watchlist alert".to_string(),
        legacy_prefix: "BOTTOM TURNING:".to_string(),
        metadata: json!({"criterion": "bottom_turning"}),
    }
}

/// Deployment gate: high correlation with existing holdings.
pub fn concentration_warning(correlated_with: &[String], effective_bets: f64) -> Signal {
    let shown: Vec<&str> = correlated_with
        .iter()
        .take(3)
        .map(|s| s.as_str())
        .collect();
    Signal {
        signal_type: SignalType::DeploymentGate,
        severity: Severity::Medium,
        message: format!(
            "High corr with {} (eff. bets: {effective_bets:.0})",
            shown.join(", ")
        ),
        legacy_prefix: "CONCENTRATION:".to_string(),
        metadata: json!({
            "criterion": "concentration",
            "correlated_with": correlated_with,
            "effective_bets": effective_bets,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serde_round_trip_preserves_all_fields() {
        let original = quant_drop_sell(-1.25, "2025-05-12");
        let value = serde_json::to_value(&original).unwrap();
        let restored: Signal = serde_json::from_value(value).unwrap();
        assert_eq!(original, restored);
        assert_eq!(restored.signal_type, SignalType::SellHard);
        assert_eq!(restored.severity, Severity::High);
        assert_eq!(restored.legacy_prefix, "SELL:");
        assert_eq!(restored.metadata["criterion"], "quant_drop");
    }

    #[test]
    fn test_legacy_flag_format() {
        let signal = sma_breach_sell(12);
        assert_eq!(
            signal.to_legacy_flag(),
            "SELL: 12 consecutive days >3% below 200d SMA"
        );
    }

    #[test]
    fn test_board_round_trip_preserves_legacy_flags() {
        let mut board = SignalBoard::new();
        board.add(sma_breach_sell(11));
        board.add(eps_rev_warning(2.0, -0.154));
        board.add(bottom_turning());

        let records = board.to_records();
        let restored = SignalBoard::from_records(&records).unwrap();
        assert_eq!(board.to_legacy_flags(), restored.to_legacy_flags());
        assert_eq!(board.net_action(), restored.net_action());
    }

    #[test]
    fn test_net_action_priority_two_sells() {
        let mut board = SignalBoard::new();
        board.add(sma_breach_sell(10));
        board.add(quant_drop_sell(-1.5, "2025-05-01"));
        board.add(defensive_hold(DefenseClass::Hedge, -0.8));
        assert_eq!(board.net_action(), NetAction::Review);
        assert!(board.has_sell_review());
    }

    #[test]
    fn test_net_action_one_sell_with_hold_override() {
        let mut board = SignalBoard::new();
        board.add(sma_breach_sell(10));
        board.add(defensive_hold(DefenseClass::Defensive, -0.6));
        assert_eq!(board.net_action(), NetAction::Hold);
    }

    #[test]
    fn test_net_action_one_sell_alone() {
        let mut board = SignalBoard::new();
        board.add(sma_breach_sell(10));
        assert_eq!(board.net_action(), NetAction::Watch);
    }

    #[test]
    fn test_net_action_trim_beats_buys() {
        let mut board = SignalBoard::new();
        board.add(amplifier_warning(1.4));
        board.add(reversal_confirmed());
        assert_eq!(board.net_action(), NetAction::Trim);
    }

    #[test]
    fn test_net_action_buy_confirmed_beats_watchlist() {
        let mut board = SignalBoard::new();
        board.add(bottom_turning());
        board.add(reversal_confirmed());
        assert_eq!(board.net_action(), NetAction::Buy);
    }

    #[test]
    fn test_net_action_watchlist_then_warning_then_none() {
        let mut board = SignalBoard::new();
        board.add(bottom_turning());
        assert_eq!(board.net_action(), NetAction::Watchlist);

        let mut board = SignalBoard::new();
        board.add(sma_breach_warning(8));
        assert_eq!(board.net_action(), NetAction::Watch);

        assert_eq!(SignalBoard::new().net_action(), NetAction::None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut board = SignalBoard::new();
        board.add(quant_freshness_warning());
        board.add(sma_breach_warning(7));
        board.add(concentration_warning(
            &["XLK".to_string(), "QQQ".to_string()],
            12.0,
        ));
        let flags = board.to_legacy_flags();
        assert!(flags[0].starts_with("QUANT_CHECK:"));
        assert!(flags[1].starts_with("WARNING:"));
        assert!(flags[2].starts_with("CONCENTRATION:"));
        assert!(flags[2].contains("XLK, QQQ"));
    }
}
