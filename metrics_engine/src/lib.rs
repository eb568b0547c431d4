//! Risk and return statistics for portfolio valuation histories.
//!
//! Every statistic takes valuations ordered oldest first. Use [`ValuationSeries`] to
//! normalize timestamped points (any order) into that shape before evaluating.

mod format;
mod report;
mod series;
mod stats;

pub use format::{format_metrics, format_percent, format_ratio, format_usd};
pub use report::MetricsConfig;
pub use series::{SeriesError, ValuationSeries};
pub use stats::{
    annualized_volatility, cagr, max_drawdown, sharpe_ratio, simple_returns, sortino_ratio,
    total_return, ulcer_index, ulcer_performance_index, volatility, DAYS_PER_YEAR,
    TRADING_DAYS_PER_YEAR,
};
