//! Independent risk detectors: tail risk on returns and drawdowns,
//! cross-asset turbulence, momentum crash conditions, and credit-market
//! stress. Each is off by default and aggregated downstream.

pub mod cdar;
pub mod cvar;
pub mod ebp;
pub mod momentum_crash;
pub mod stats;
pub mod turbulence;

pub use cdar::{CdarCalculator, CdarResult};
pub use cvar::{CvarCalculator, CvarResult};
pub use ebp::{EbpMonitor, EbpRegime, EbpSignal, EbpThresholds, EbpTrend};
pub use momentum_crash::{CrashRegime, MomentumCrashProtection, MomentumCrashSignal};
pub use turbulence::{TurbulenceIndex, TurbulenceRegime, TurbulenceSignal};
