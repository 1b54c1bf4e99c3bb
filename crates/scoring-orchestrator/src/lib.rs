//! Orchestrates the scoring layers: `score_ticker` for one ticker,
//! `score_universe` for a run. Everything below this crate is a pure
//! computation over shared-immutable inputs; the fan-out is task-based
//! with exclusively-owned results, so no locking appears anywhere.

pub mod run;
pub mod scorer;


pub use run::{
    compute_market_context, gate3_for_result, score_universe, MarketContext, RunResult,
    TickerInput,
};
pub use scorer::{
    score_ticker, AdvancedReadouts, DrawdownDefense, FallingKnifeCap, QuantDeterioration,
    ScoringResult, Technicals,
};
