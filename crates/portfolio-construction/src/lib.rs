//! Stand-alone portfolio operations over multi-asset return series:
//! inverse-volatility weighting, hierarchical risk parity, and
//! correlation / concentration analysis.

pub mod correlation;
pub mod hrp;
pub mod inverse_vol;

pub use correlation::{
    check_concentration_risk, compute_correlation_report, pearson, ConcentrationWarning,
    CorrelationReport,
};
pub use hrp::{HrpAllocator, HrpResult};
pub use inverse_vol::{InverseVolResult, InverseVolWeighter};
