//! Optional signal overlays, all off by default. When enabled they
//! touch the core only at the documented blend points: the trend
//! signal blends into MQ, overheated sentiment scales MR down, and
//! factor momentum is informational only.

pub mod factor_momentum;
pub mod sentiment;
pub mod trend_following;

pub use factor_momentum::{FactorMomentumResult, FactorMomentumSignal, FactorRegime};
pub use sentiment::{AlignedSentimentIndex, SentimentModel, SentimentRegime, SentimentResult};
pub use trend_following::{ContinuousTrendFollower, TrendRegime, TrendSignal};
