//! Excess Bond Premium monitor.
//!
//! The EBP is the component of credit spreads unrelated to default
//! risk, a forward-looking indicator of credit market stress. Rising
//! EBP signals tightening financial conditions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::percentile_rank;

/// EBP risk regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EbpRegime {
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "ELEVATED")]
    Elevated,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ACCOMMODATIVE")]
    Accommodative,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
}

/// Direction of the 3-month EBP trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EbpTrend {
    #[serde(rename = "rising")]
    Rising,
    #[serde(rename = "falling")]
    Falling,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Result from EBP analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbpSignal {
    pub ebp_value: Option<f64>,
    pub ebp_regime: EbpRegime,
    pub ebp_percentile: Option<f64>,
    pub ebp_3m_change: Option<f64>,
    pub ebp_trend: EbpTrend,
}

/// EBP regime thresholds in percentage points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EbpThresholds {
    pub high_risk: f64,
    pub elevated: f64,
    pub normal: f64,
}

impl Default for EbpThresholds {
    fn default() -> Self {
        Self {
            high_risk: 1.00,
            elevated: 0.50,
            normal: 0.00,
        }
    }
}

/// Monitors a monthly EBP series loaded from the macro provider.
#[derive(Debug, Clone)]
pub struct EbpMonitor {
    thresholds: EbpThresholds,
    lookback_months: usize,
    data: Option<Vec<(NaiveDate, f64)>>,
}

impl EbpMonitor {
    pub fn new(thresholds: EbpThresholds, lookback_months: usize) -> Self {
        Self {
            thresholds,
            lookback_months,
            data: None,
        }
    }

    /// Load the monthly EBP series. Entries are sorted by date and
    /// non-finite values dropped; fewer than 2 points clears the data.
    pub fn load_data(&mut self, series: Vec<(NaiveDate, f64)>) {
        let mut clean: Vec<(NaiveDate, f64)> =
            series.into_iter().filter(|(_, v)| v.is_finite()).collect();
        if clean.len() < 2 {
            self.data = None;
            return;
        }
        clean.sort_by_key(|(d, _)| *d);
        self.data = Some(clean);
    }

    fn classify_regime(&self, value: f64) -> EbpRegime {
        if value >= self.thresholds.high_risk {
            EbpRegime::HighRisk
        } else if value >= self.thresholds.elevated {
            EbpRegime::Elevated
        } else if value >= self.thresholds.normal {
            EbpRegime::Normal
        } else {
            EbpRegime::Accommodative
        }
    }

    fn compute_percentile(&self, value: f64) -> f64 {
        match &self.data {
            Some(data) if data.len() >= 10 => {
                let values: Vec<f64> = data.iter().map(|(_, v)| *v).collect();
                percentile_rank(&values, value)
            }
            _ => 0.5,
        }
    }

    fn compute_trend(&self) -> (Option<f64>, EbpTrend) {
        let data = match &self.data {
            Some(d) if d.len() >= self.lookback_months + 1 => d,
            _ => return (None, EbpTrend::Unknown),
        };

        let current = data[data.len() - 1].1;
        let prior = data[data.len() - 1 - self.lookback_months].1;
        let change = current - prior;

        let trend = if change.abs() < 0.05 {
            EbpTrend::Stable
        } else if change > 0.0 {
            EbpTrend::Rising
        } else {
            EbpTrend::Falling
        };

        (Some(change), trend)
    }

    /// Current EBP risk signal; unavailable sentinel without data.
    pub fn current_signal(&self) -> EbpSignal {
        let data = match &self.data {
            Some(d) if d.len() >= 2 => d,
            _ => {
                return EbpSignal {
                    ebp_value: None,
                    ebp_regime: EbpRegime::Unavailable,
                    ebp_percentile: None,
                    ebp_3m_change: None,
                    ebp_trend: EbpTrend::Unknown,
                }
            }
        };

        let current = data[data.len() - 1].1;
        let (change, trend) = self.compute_trend();

        EbpSignal {
            ebp_value: Some(current),
            ebp_regime: self.classify_regime(current),
            ebp_percentile: Some(self.compute_percentile(current)),
            ebp_3m_change: change,
            ebp_trend: trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_series(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let month = (i % 12) as u32 + 1;
                let year = 2020 + (i / 12) as i32;
                (NaiveDate::from_ymd_opt(year, month, 1).unwrap(), *v)
            })
            .collect()
    }

    #[test]
    fn test_no_data_unavailable() {
        let monitor = EbpMonitor::new(EbpThresholds::default(), 3);
        let signal = monitor.current_signal();
        assert_eq!(signal.ebp_regime, EbpRegime::Unavailable);
        assert_eq!(signal.ebp_trend, EbpTrend::Unknown);
    }

    #[test]
    fn test_regime_thresholds() {
        let mut monitor = EbpMonitor::new(EbpThresholds::default(), 3);

        monitor.load_data(monthly_series(&[0.1, 0.1, 0.1, 1.2]));
        assert_eq!(monitor.current_signal().ebp_regime, EbpRegime::HighRisk);

        monitor.load_data(monthly_series(&[0.1, 0.1, 0.1, 0.6]));
        assert_eq!(monitor.current_signal().ebp_regime, EbpRegime::Elevated);

        monitor.load_data(monthly_series(&[0.1, 0.1, 0.1, 0.2]));
        assert_eq!(monitor.current_signal().ebp_regime, EbpRegime::Normal);

        monitor.load_data(monthly_series(&[0.1, 0.1, 0.1, -0.3]));
        assert_eq!(
            monitor.current_signal().ebp_regime,
            EbpRegime::Accommodative
        );
    }

    #[test]
    fn test_trend_deadband() {
        let mut monitor = EbpMonitor::new(EbpThresholds::default(), 3);

        monitor.load_data(monthly_series(&[0.10, 0.11, 0.12, 0.13]));
        let signal = monitor.current_signal();
        assert_eq!(signal.ebp_trend, EbpTrend::Stable);

        monitor.load_data(monthly_series(&[0.10, 0.20, 0.30, 0.40]));
        let signal = monitor.current_signal();
        assert_eq!(signal.ebp_trend, EbpTrend::Rising);
        assert!(signal.ebp_3m_change.unwrap() > 0.05);

        monitor.load_data(monthly_series(&[0.40, 0.30, 0.20, 0.10]));
        assert_eq!(monitor.current_signal().ebp_trend, EbpTrend::Falling);
    }

    #[test]
    fn test_percentile_defaults_neutral_on_short_history() {
        let mut monitor = EbpMonitor::new(EbpThresholds::default(), 3);
        monitor.load_data(monthly_series(&[0.1, 0.2, 0.3, 0.4]));
        let signal = monitor.current_signal();
        assert_eq!(signal.ebp_percentile, Some(0.5));
    }

    #[test]
    fn test_percentile_vs_full_history() {
        let mut monitor = EbpMonitor::new(EbpThresholds::default(), 3);
        let values: Vec<f64> = (0..24).map(|i| i as f64 * 0.05).collect();
        monitor.load_data(monthly_series(&values));
        let signal = monitor.current_signal();
        assert!(signal.ebp_percentile.unwrap() > 0.9);
    }
}
