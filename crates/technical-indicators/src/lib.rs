//! Pure technical indicator calculations over price series. Zero I/O.

pub mod divergence;
pub mod indicators;
pub mod volatility;


pub use divergence::{
    obv_divergence, reversal_signals, rsi_bullish_divergence, ObvSummary, ReversalSignals,
    RsiDivergence,
};
pub use indicators::{
    bb_lower_breach, consecutive_days_below_sma, ema, finite_or, linreg_slope, macd,
    price_acceleration, rsi, rsi_value, sma, BbBreach, MacdSummary,
};
pub use volatility::{
    daily_returns, realized_vol, sample_std, sample_var, yang_zhang_from_close, yang_zhang_vol,
};
