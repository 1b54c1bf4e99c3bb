//! Tax-loss harvesting scanner with wash-sale detection.
//!
//! Scans positions for unrealized losses beyond a threshold and flags
//! candidates whose sale would be blocked by a repurchase of the same
//! symbol within the 30-day window on either side.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::hifo::HoldingPeriod;

/// Trade action recorded in the trade history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "reinvest")]
    Reinvest,
    #[serde(rename = "transfer_in")]
    TransferIn,
    #[serde(rename = "transfer_out")]
    TransferOut,
}

impl TradeAction {
    /// Acquisitions are what trigger the wash-sale rule.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            TradeAction::Buy | TradeAction::Reinvest | TradeAction::TransferIn
        )
    }
}

/// One recent trade, across all accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub date: NaiveDate,
    pub action: TradeAction,
}

/// An open position eligible for harvest scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub account_id: String,
    pub shares: f64,
    pub cost_basis_per_share: f64,
    pub acquired_at: NaiveDate,
}

/// A tax-loss harvesting opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestOpportunity {
    pub symbol: String,
    pub account_id: String,
    /// Unrealized loss (negative value).
    pub unrealized_loss: f64,
    /// Loss as a fraction of cost basis (positive).
    pub loss_pct: f64,
    pub shares: f64,
    pub cost_basis: f64,
    pub current_value: f64,
    pub wash_sale_blocked: bool,
    pub holding_period: HoldingPeriod,
}

/// Tax-loss harvesting scanner.
#[derive(Debug, Clone, Copy)]
pub struct TaxLossHarvester {
    /// Minimum loss fraction to trigger a harvest.
    pub loss_threshold_pct: f64,
    pub wash_sale_window_days: i64,
    pub long_term_days: i64,
}

impl Default for TaxLossHarvester {
    fn default() -> Self {
        Self {
            loss_threshold_pct: 0.02,
            wash_sale_window_days: 30,
            long_term_days: 366,
        }
    }
}

impl TaxLossHarvester {
    pub fn new(loss_threshold_pct: f64, wash_sale_window_days: i64) -> Self {
        Self {
            loss_threshold_pct,
            wash_sale_window_days,
            long_term_days: 366,
        }
    }

    /// True when selling this symbol on `reference_date` would trigger
    /// a wash sale: any acquisition of the same symbol within the
    /// window on either side.
    pub fn check_wash_sale(
        &self,
        symbol: &str,
        recent_trades: &[Trade],
        reference_date: NaiveDate,
    ) -> bool {
        let window_start = reference_date - Duration::days(self.wash_sale_window_days);
        let window_end = reference_date + Duration::days(self.wash_sale_window_days);

        recent_trades.iter().any(|trade| {
            trade.symbol == symbol
                && trade.action.is_acquisition()
                && trade.date >= window_start
                && trade.date <= window_end
        })
    }

    /// Scan positions for harvest opportunities, largest loss first.
    pub fn scan_opportunities(
        &self,
        positions: &[Position],
        current_prices: &HashMap<String, f64>,
        recent_trades: &[Trade],
        reference_date: NaiveDate,
    ) -> Vec<HarvestOpportunity> {
        let mut opportunities: Vec<HarvestOpportunity> = positions
            .iter()
            .filter_map(|pos| {
                let price = current_prices.get(&pos.symbol).copied()?;
                if price <= 0.0 || pos.shares <= 0.0 || pos.cost_basis_per_share <= 0.0 {
                    return None;
                }

                let cost_basis = pos.shares * pos.cost_basis_per_share;
                let current_value = pos.shares * price;
                let unrealized_loss = current_value - cost_basis;
                if unrealized_loss >= 0.0 {
                    return None;
                }

                let loss_pct = unrealized_loss.abs() / cost_basis;
                if loss_pct < self.loss_threshold_pct {
                    return None;
                }

                let blocked = self.check_wash_sale(&pos.symbol, recent_trades, reference_date);

                let days_held = (reference_date - pos.acquired_at).num_days();
                let holding_period = if days_held >= self.long_term_days {
                    HoldingPeriod::LongTerm
                } else {
                    HoldingPeriod::ShortTerm
                };

                Some(HarvestOpportunity {
                    symbol: pos.symbol.clone(),
                    account_id: pos.account_id.clone(),
                    unrealized_loss,
                    loss_pct,
                    shares: pos.shares,
                    cost_basis,
                    current_value,
                    wash_sale_blocked: blocked,
                    holding_period,
                })
            })
            .collect();

        opportunities.sort_by(|a, b| {
            a.unrealized_loss
                .partial_cmp(&b.unrealized_loss)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        opportunities
    }
}
