//! Core types for the Threshold dip-buy scoring engine.
//!
//! Shared value types, grade conversion, the per-run scoring context, the
//! configuration surface, and the error type. Everything here is immutable
//! once constructed; the scoring path holds no shared mutable state.

pub mod config;
pub mod context;
pub mod error;
pub mod grades;
pub mod types;

pub use config::{
    AdvancedConfig, AggregatorConfig, CapTable, CdarConfig, CvarConfig, CvarMethod, DcsWeights,
    DeploymentConfig, DrawdownModifiers, EbpConfig, FactorMomentumConfig, FallingKnifeCaps,
    FqWeights, HrpConfig, InverseVolConfig, Modifiers, MomentumCrashConfig, MqWeights,
    MrWeights, PortfolioConfig, ProfitabilityBlend, RevisionMomentumConfig, RiskConfig,
    ScoringConfig, SellCriteria, SentimentConfig, SignalThresholds, TaxConfig, ThresholdConfig,
    ToWeights, TrendFollowingConfig, TurbulenceConfig, VcWeights, VixBoundaries,
};
pub use context::{Fundamentals, GradeSnapshot, PrevScore, ProxyPanel, ScoringContext};
pub use error::ScoringError;
pub use grades::{grade_norm, grade_rank, LetterGrade};
pub use types::{
    Bar, Crossover, DcsSignal, DefenseClass, DefenseInfo, Divergence, PriceSeries, RatingBundle,
    RevisionDirection, RevisionMomentum, SubScores, Trend, VixRegime,
};
