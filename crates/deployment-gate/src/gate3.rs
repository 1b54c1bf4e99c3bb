//! Gate 3 parabolic filter: deployment discipline for buy signals.
//!
//! A parabolic move is RSI above the ceiling AND an 8-week return above
//! the ceiling (strict comparisons). Standard tickers are blocked when
//! it fires; gold tickers are exempt and deploy at 0.75x above the RSI
//! ceiling, regime-driven moves being expected there.

use std::fmt;

use scoring_core::DeploymentConfig;
use serde::{Deserialize, Serialize};

/// Deployment sizing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingLevel {
    #[serde(rename = "FULL")]
    Full,
    #[serde(rename = "THREE_QUARTER")]
    ThreeQuarter,
    #[serde(rename = "HALF")]
    Half,
    #[serde(rename = "WAIT")]
    Wait,
    #[serde(rename = "FAIL")]
    Fail,
}

impl SizingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingLevel::Full => "FULL",
            SizingLevel::ThreeQuarter => "THREE_QUARTER",
            SizingLevel::Half => "HALF",
            SizingLevel::Wait => "WAIT",
            SizingLevel::Fail => "FAIL",
        }
    }
}

impl fmt::Display for SizingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a Gate 3 parabolic filter check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate3Result {
    pub passes: bool,
    pub sizing: SizingLevel,
    pub reason: String,
    pub rsi: f64,
    pub ret_8w: f64,
    pub is_gold_exempt: bool,
}

/// Check the Gate 3 parabolic filter for deployment sizing.
pub fn check_gate3(
    rsi: f64,
    ret_8w: f64,
    config: &DeploymentConfig,
    is_gold: bool,
) -> Gate3Result {
    let rsi_max = config.gate3_rsi_max;
    let ret_8w_max = config.gate3_ret_8w_max;

    let rsi_triggered = rsi > rsi_max;
    let ret_triggered = ret_8w > ret_8w_max;

    if is_gold {
        if rsi_triggered {
            return Gate3Result {
                passes: true,
                sizing: SizingLevel::ThreeQuarter,
                reason: format!(
                    "Gold RSI {rsi:.0} > {rsi_max:.0}, deploy at {:.0}% size (gold exempt from Gate 3)",
                    config.gold_rsi_max_sizing * 100.0
                ),
                rsi,
                ret_8w,
                is_gold_exempt: true,
            };
        }
        return Gate3Result {
            passes: true,
            sizing: SizingLevel::Full,
            reason: "Gold exempt from Gate 3 parabolic filter".to_string(),
            rsi,
            ret_8w,
            is_gold_exempt: true,
        };
    }

    if rsi_triggered && ret_triggered {
        return Gate3Result {
            passes: false,
            sizing: SizingLevel::Fail,
            reason: format!(
                "PARABOLIC: RSI {rsi:.0} > {rsi_max:.0} AND 8w return {:.1}% > {:.0}%, do NOT deploy",
                ret_8w * 100.0,
                ret_8w_max * 100.0
            ),
            rsi,
            ret_8w,
            is_gold_exempt: false,
        };
    }

    if rsi_triggered {
        return Gate3Result {
            passes: false,
            sizing: SizingLevel::Wait,
            reason: format!("RSI {rsi:.0} > {rsi_max:.0}, wait for RSI pullback before deploying"),
            rsi,
            ret_8w,
            is_gold_exempt: false,
        };
    }

    if ret_triggered {
        return Gate3Result {
            passes: false,
            sizing: SizingLevel::Wait,
            reason: format!(
                "8w return {:.1}% > {:.0}%, wait for consolidation before deploying",
                ret_8w * 100.0,
                ret_8w_max * 100.0
            ),
            rsi,
            ret_8w,
            is_gold_exempt: false,
        };
    }

    Gate3Result {
        passes: true,
        sizing: SizingLevel::Full,
        reason: "Gate 3 passed, deploy at full size".to_string(),
        rsi,
        ret_8w,
        is_gold_exempt: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeploymentConfig {
        DeploymentConfig::default()
    }

    #[test]
    fn test_both_triggered_fails() {
        let result = check_gate3(85.0, 0.35, &config(), false);
        assert!(!result.passes);
        assert_eq!(result.sizing, SizingLevel::Fail);
    }

    #[test]
    fn test_single_trigger_waits() {
        let result = check_gate3(85.0, 0.10, &config(), false);
        assert!(!result.passes);
        assert_eq!(result.sizing, SizingLevel::Wait);

        let result = check_gate3(60.0, 0.40, &config(), false);
        assert!(!result.passes);
        assert_eq!(result.sizing, SizingLevel::Wait);
    }

    #[test]
    fn test_exact_thresholds_pass_full() {
        // Strict > comparisons: exactly at the ceiling is not parabolic
        let result = check_gate3(80.0, 0.30, &config(), false);
        assert!(result.passes);
        assert_eq!(result.sizing, SizingLevel::Full);
    }

    #[test]
    fn test_gold_exemption() {
        let result = check_gate3(85.0, 0.35, &config(), true);
        assert!(result.passes);
        assert_eq!(result.sizing, SizingLevel::ThreeQuarter);
        assert!(result.is_gold_exempt);

        let result = check_gate3(60.0, 0.35, &config(), true);
        assert!(result.passes);
        assert_eq!(result.sizing, SizingLevel::Full);
        assert!(result.is_gold_exempt);
    }
}
