//! Display strings for report values. Rounding is done in decimal, two places,
//! midpoint away from zero.

use domain::{FormattedMetrics, PortfolioMetrics};
use rust_decimal::{prelude::FromPrimitive, Decimal, RoundingStrategy};

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

fn two_places(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// `0.1234` renders as `12.34%`.
pub fn format_percent(fraction: f64) -> String {
    let percent = to_decimal(fraction)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO);
    format!("{}%", two_places(percent))
}

pub fn format_ratio(value: f64) -> String {
    two_places(to_decimal(value))
}

pub fn format_usd(value: f64) -> String {
    format!("${}", two_places(to_decimal(value)))
}

pub fn format_metrics(metrics: &PortfolioMetrics) -> FormattedMetrics {
    FormattedMetrics {
        latest_value: format_usd(metrics.latest_value),
        total_return: format_percent(metrics.total_return),
        cagr: format_percent(metrics.cagr),
        volatility: format_percent(metrics.volatility),
        annualized_volatility: format_percent(metrics.annualized_volatility),
        max_drawdown: format_percent(metrics.max_drawdown),
        sharpe_ratio: format_ratio(metrics.sharpe_ratio),
        sortino_ratio: format_ratio(metrics.sortino_ratio),
        ulcer_index: format_percent(metrics.ulcer_index),
        ulcer_performance_index: format_ratio(metrics.ulcer_performance_index),
    }
}
