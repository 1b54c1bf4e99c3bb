//! HIFO tax-lot selection.
//!
//! Highest-In, First-Out peels shares from the lots with the highest
//! cost basis first, minimizing taxable gains (or maximizing deductible
//! losses) on a sale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single tax lot representing one purchase of shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLot {
    pub lot_id: u64,
    pub account_id: String,
    pub symbol: String,
    pub shares: f64,
    pub cost_basis_per_share: f64,
    pub acquired_at: NaiveDate,
    pub is_open: bool,
}

/// Holding-period classification for capital gains treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingPeriod {
    #[serde(rename = "short_term")]
    ShortTerm,
    #[serde(rename = "long_term")]
    LongTerm,
}

/// One lot chosen by the selector, with the share count to peel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedLot {
    pub lot_id: u64,
    pub shares_to_sell: f64,
    pub cost_basis_per_share: f64,
}

/// Result of HIFO lot selection for a sell order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotSelection {
    pub selected_lots: Vec<SelectedLot>,
    pub total_shares: f64,
    pub total_cost_basis: f64,
    /// Realized gain estimate at the given price; negative for a loss.
    pub estimated_gain: f64,
    /// Per selected lot, in selection order.
    pub holding_periods: Vec<HoldingPeriod>,
}

/// Highest-In, First-Out tax lot selector.
#[derive(Debug, Clone, Copy)]
pub struct HifoSelector {
    /// Days required for long-term treatment (more than one year).
    pub long_term_days: i64,
}

impl Default for HifoSelector {
    fn default() -> Self {
        Self { long_term_days: 366 }
    }
}

impl HifoSelector {
    pub fn new(long_term_days: i64) -> Self {
        Self { long_term_days }
    }

    fn holding_period(&self, acquired_at: NaiveDate, sell_date: NaiveDate) -> HoldingPeriod {
        if (sell_date - acquired_at).num_days() >= self.long_term_days {
            HoldingPeriod::LongTerm
        } else {
            HoldingPeriod::ShortTerm
        }
    }

    /// Select lots for a sale, highest cost basis first.
    ///
    /// Peels shares from the top until the requested quantity is
    /// filled; a partially available book fills what it can.
    pub fn select_lots(
        &self,
        lots: &[TaxLot],
        shares_to_sell: f64,
        current_price: f64,
        sell_date: NaiveDate,
    ) -> LotSelection {
        if lots.is_empty() || shares_to_sell <= 0.0 {
            return LotSelection::default();
        }

        let mut open_lots: Vec<&TaxLot> = lots.iter().filter(|lot| lot.is_open).collect();
        if open_lots.is_empty() {
            return LotSelection::default();
        }

        open_lots.sort_by(|a, b| {
            b.cost_basis_per_share
                .partial_cmp(&a.cost_basis_per_share)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut selected = Vec::new();
        let mut holding_periods = Vec::new();
        let mut remaining = shares_to_sell;
        let mut total_cost_basis = 0.0;

        for lot in open_lots {
            if remaining <= 0.0 {
                break;
            }
            let take = lot.shares.min(remaining);
            selected.push(SelectedLot {
                lot_id: lot.lot_id,
                shares_to_sell: take,
                cost_basis_per_share: lot.cost_basis_per_share,
            });
            total_cost_basis += take * lot.cost_basis_per_share;
            holding_periods.push(self.holding_period(lot.acquired_at, sell_date));
            remaining -= take;
        }

        let total_shares = shares_to_sell - remaining.max(0.0);

        LotSelection {
            selected_lots: selected,
            total_shares,
            total_cost_basis,
            estimated_gain: total_shares * current_price - total_cost_basis,
            holding_periods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lot(id: u64, shares: f64, basis: f64, acquired: NaiveDate) -> TaxLot {
        TaxLot {
            lot_id: id,
            account_id: "taxable".to_string(),
            symbol: "AAPL".to_string(),
            shares,
            cost_basis_per_share: basis,
            acquired_at: acquired,
            is_open: true,
        }
    }

    #[test]
    fn test_highest_basis_first() {
        let lots = vec![
            lot(1, 100.0, 120.0, date(2023, 1, 10)),
            lot(2, 100.0, 180.0, date(2024, 3, 5)),
            lot(3, 100.0, 150.0, date(2024, 6, 1)),
        ];
        let selection =
            HifoSelector::default().select_lots(&lots, 150.0, 160.0, date(2025, 6, 1));

        assert_eq!(selection.selected_lots.len(), 2);
        assert_eq!(selection.selected_lots[0].lot_id, 2);
        assert_relative_eq!(selection.selected_lots[0].shares_to_sell, 100.0);
        assert_eq!(selection.selected_lots[1].lot_id, 3);
        assert_relative_eq!(selection.selected_lots[1].shares_to_sell, 50.0);

        assert_relative_eq!(selection.total_shares, 150.0);
        assert_relative_eq!(selection.total_cost_basis, 100.0 * 180.0 + 50.0 * 150.0);
        assert_relative_eq!(
            selection.estimated_gain,
            150.0 * 160.0 - (100.0 * 180.0 + 50.0 * 150.0)
        );
    }

    #[test]
    fn test_holding_period_boundary() {
        let selector = HifoSelector::default();
        let lots = vec![
            lot(1, 10.0, 100.0, date(2024, 1, 1)),
            lot(2, 10.0, 90.0, date(2025, 3, 1)),
        ];
        // 366 days after 2024-01-01 is 2025-01-01 (leap year)
        let selection = selector.select_lots(&lots, 20.0, 95.0, date(2025, 1, 1));
        assert_eq!(selection.holding_periods[0], HoldingPeriod::LongTerm);
    }

    #[test]
    fn test_closed_lots_skipped() {
        let mut closed = lot(1, 100.0, 200.0, date(2024, 1, 1));
        closed.is_open = false;
        let lots = vec![closed, lot(2, 50.0, 100.0, date(2024, 1, 1))];
        let selection =
            HifoSelector::default().select_lots(&lots, 60.0, 110.0, date(2025, 1, 1));
        assert_eq!(selection.selected_lots.len(), 1);
        assert_relative_eq!(selection.total_shares, 50.0);
    }

    #[test]
    fn test_zero_request_empty() {
        let lots = vec![lot(1, 10.0, 100.0, date(2024, 1, 1))];
        let selection = HifoSelector::default().select_lots(&lots, 0.0, 110.0, date(2025, 1, 1));
        assert!(selection.selected_lots.is_empty());
        assert_relative_eq!(selection.total_shares, 0.0);
    }
}
