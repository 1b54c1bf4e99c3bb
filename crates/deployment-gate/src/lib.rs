//! Deployment sizing and risk aggregation: the Gate 3 parabolic
//! filter, sell-criteria exemptions, and the composite risk overlay.

pub mod aggregator;
pub mod exemptions;
pub mod gate3;

pub use aggregator::{CompositeRisk, RiskRegime, SignalAggregator};
pub use exemptions::{
    exempt_tickers, is_exempt_from_sell, ExemptionKind, ExemptionResult, TickerMeta,
};
pub use gate3::{check_gate3, Gate3Result, SizingLevel};
