//! HIFO tax-lot accounting and tax-loss harvesting. All date logic
//! takes an injected reference date; nothing reads the wall clock.

pub mod harvester;
pub mod hifo;

pub use harvester::{HarvestOpportunity, Position, TaxLossHarvester, Trade, TradeAction};
pub use hifo::{HifoSelector, HoldingPeriod, LotSelection, SelectedLot, TaxLot};
