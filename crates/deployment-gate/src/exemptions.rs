//! Sell-criteria exemptions.
//!
//! Cash/war-chest positions are always exempt from sell scoring.
//! Crypto positions ride the halving-cycle hold and are exempt until a
//! configured expiry date, after which the exemption flips to expired.
//! Exempt tickers are still scored for tracking.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ticker metadata relevant to exemption checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerMeta {
    pub symbol: String,
    #[serde(default)]
    pub is_cash: bool,
    #[serde(default)]
    pub is_crypto_exempt: bool,
}

/// Kind of exemption in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionKind {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "crypto_halving")]
    CryptoHalving,
}

/// Result of an exemption check for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExemptionResult {
    pub is_exempt: bool,
    pub reason: String,
    pub exemption_type: Option<ExemptionKind>,
    pub expires_at: Option<NaiveDate>,
    pub is_expired: bool,
}

impl ExemptionResult {
    fn not_exempt() -> Self {
        Self {
            is_exempt: false,
            reason: String::new(),
            exemption_type: None,
            expires_at: None,
            is_expired: false,
        }
    }
}

/// Check whether a ticker is exempt from sell signal generation.
///
/// Cash wins over crypto when both flags are set; `today` is injected
/// by the time provider.
pub fn is_exempt_from_sell(
    meta: &TickerMeta,
    crypto_expiry: Option<NaiveDate>,
    today: NaiveDate,
) -> ExemptionResult {
    if meta.is_cash {
        return ExemptionResult {
            is_exempt: true,
            reason: format!("{} is a cash/war chest position", meta.symbol),
            exemption_type: Some(ExemptionKind::Cash),
            expires_at: None,
            is_expired: false,
        };
    }

    if meta.is_crypto_exempt {
        if let Some(expiry) = crypto_expiry {
            if today > expiry {
                return ExemptionResult {
                    is_exempt: false,
                    reason: format!("Crypto exemption expired on {expiry}"),
                    exemption_type: Some(ExemptionKind::CryptoHalving),
                    expires_at: Some(expiry),
                    is_expired: true,
                };
            }
        }
        return ExemptionResult {
            is_exempt: true,
            reason: format!("{} exempt, halving cycle hold", meta.symbol),
            exemption_type: Some(ExemptionKind::CryptoHalving),
            expires_at: crypto_expiry,
            is_expired: false,
        };
    }

    ExemptionResult::not_exempt()
}

/// Check exemptions over the full ticker universe.
///
/// Returns every ticker with any exemption, active or expired.
pub fn exempt_tickers(
    universe: &[TickerMeta],
    crypto_expiry: Option<NaiveDate>,
    today: NaiveDate,
) -> HashMap<String, ExemptionResult> {
    universe
        .iter()
        .filter_map(|meta| {
            let result = is_exempt_from_sell(meta, crypto_expiry, today);
            result
                .exemption_type
                .map(|_| (meta.symbol.clone(), result))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cash_always_exempt() {
        let meta = TickerMeta {
            symbol: "STIP".to_string(),
            is_cash: true,
            is_crypto_exempt: false,
        };
        let result = is_exempt_from_sell(&meta, None, date(2026, 1, 1));
        assert!(result.is_exempt);
        assert_eq!(result.exemption_type, Some(ExemptionKind::Cash));
        assert!(result.expires_at.is_none());
    }

    #[test]
    fn test_cash_wins_over_crypto() {
        let meta = TickerMeta {
            symbol: "X".to_string(),
            is_cash: true,
            is_crypto_exempt: true,
        };
        let result = is_exempt_from_sell(&meta, Some(date(2020, 1, 1)), date(2026, 1, 1));
        assert!(result.is_exempt);
        assert_eq!(result.exemption_type, Some(ExemptionKind::Cash));
    }

    #[test]
    fn test_crypto_active_before_expiry() {
        let meta = TickerMeta {
            symbol: "FBTC".to_string(),
            is_cash: false,
            is_crypto_exempt: true,
        };
        let result = is_exempt_from_sell(&meta, Some(date(2026, 11, 15)), date(2026, 11, 15));
        assert!(result.is_exempt);
        assert!(!result.is_expired);
    }

    #[test]
    fn test_crypto_expired_flips_not_exempt() {
        let meta = TickerMeta {
            symbol: "FBTC".to_string(),
            is_cash: false,
            is_crypto_exempt: true,
        };
        let result = is_exempt_from_sell(&meta, Some(date(2026, 11, 15)), date(2026, 11, 16));
        assert!(!result.is_exempt);
        assert!(result.is_expired);
        assert_eq!(
            result.exemption_type,
            Some(ExemptionKind::CryptoHalving)
        );
    }

    #[test]
    fn test_crypto_without_expiry_stays_exempt() {
        let meta = TickerMeta {
            symbol: "MSTR".to_string(),
            is_cash: false,
            is_crypto_exempt: true,
        };
        let result = is_exempt_from_sell(&meta, None, date(2030, 1, 1));
        assert!(result.is_exempt);
    }

    #[test]
    fn test_universe_scan_includes_expired_skips_plain() {
        let universe = vec![
            TickerMeta {
                symbol: "STIP".to_string(),
                is_cash: true,
                is_crypto_exempt: false,
            },
            TickerMeta {
                symbol: "FBTC".to_string(),
                is_cash: false,
                is_crypto_exempt: true,
            },
            TickerMeta {
                symbol: "AAPL".to_string(),
                ..Default::default()
            },
        ];
        let result = exempt_tickers(&universe, Some(date(2025, 1, 1)), date(2026, 1, 1));
        assert_eq!(result.len(), 2);
        assert!(result.contains_key("STIP"));
        assert!(result["FBTC"].is_expired);
        assert!(!result.contains_key("AAPL"));
    }
}
