//! The five DCS sub-score calculators plus revision momentum.
//!
//! Each sub-score maps raw inputs and indicators into a normalized
//! [0, 1] value: MQ (30%), FQ (25%), TO (20%), MR (15%), VC (10%).

pub mod fundamental;
pub mod momentum;
pub mod oversold;
pub mod regime;
pub mod revisions;
pub mod valuation;

pub use fundamental::fundamental_quality;
pub use momentum::{momentum_quality, trend_score, MomentumQuality};
pub use oversold::technical_oversold;
pub use regime::market_regime;
pub use revisions::revision_momentum;
pub use valuation::valuation_context;
