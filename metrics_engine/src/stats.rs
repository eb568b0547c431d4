//! Return and risk statistics over valuations ordered oldest first.
//!
//! Degenerate input (too few observations, zero denominators) yields 0. No function
//! here returns NaN or an infinity.

use tracing::debug;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Fewer than two samples give 0.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn drawdown(peak: f64, value: f64) -> f64 {
    if peak > 0.0 {
        (peak - value) / peak
    } else {
        0.0
    }
}

/// Step returns `(v[i] - v[i-1]) / v[i-1]`, dropping steps whose previous value is 0.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| {
            let prev = w[0];
            if prev == 0.0 {
                None
            } else {
                Some((w[1] - prev) / prev)
            }
        })
        .collect()
}

fn unfiltered_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Compound annual growth rate between the first and last valuation over `days`.
pub fn cagr(values: &[f64], days: f64) -> f64 {
    if values.len() < 2 || days.is_nan() || days <= 0.0 {
        return 0.0;
    }
    let start = values[0];
    let end = values[values.len() - 1];
    if start <= 0.0 {
        return 0.0;
    }
    let years = days / DAYS_PER_YEAR;
    finite_or_zero((end / start).powf(1.0 / years) - 1.0)
}

pub fn total_return(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let start = values[0];
    if start <= 0.0 {
        return 0.0;
    }
    finite_or_zero(values[values.len() - 1] / start - 1.0)
}

/// Per-period volatility: sample standard deviation of the step returns.
pub fn volatility(values: &[f64]) -> f64 {
    let returns = simple_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }
    finite_or_zero(sample_std_dev(&returns))
}

/// [`volatility`] scaled by `sqrt(periods_per_year)`.
pub fn annualized_volatility(values: &[f64], periods_per_year: f64) -> f64 {
    if periods_per_year.is_nan() || periods_per_year <= 0.0 {
        return 0.0;
    }
    finite_or_zero(volatility(values) * periods_per_year.sqrt())
}

/// Largest peak-to-trough decline as a fraction of the running peak.
///
/// Within `[0, 1)` while valuations stay positive. A fall to zero gives exactly 1 and
/// negative valuations push it above 1.
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut peak = values[0];
    let mut max_dd: f64 = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        max_dd = max_dd.max(drawdown(peak, value));
    }
    finite_or_zero(max_dd)
}

/// `(mean(returns) - risk_free_rate) / stddev(returns)` on the per-period basis.
pub fn sharpe_ratio(values: &[f64], risk_free_rate: f64) -> f64 {
    if values.len() < 2 {
        debug!(
            observations = values.len(),
            "sharpe ratio needs at least two valuations"
        );
        return 0.0;
    }
    let returns = unfiltered_returns(values);
    let avg_return = mean(&returns);
    let vol = sample_std_dev(&returns);
    if vol == 0.0 {
        debug!(
            observations = values.len(),
            "return volatility is zero, sharpe ratio undefined"
        );
        return 0.0;
    }
    finite_or_zero((avg_return - risk_free_rate) / vol)
}

/// Annualized Sortino ratio.
///
/// Downside deviation sums squared shortfalls below `target_return` and divides by
/// the count of all returns, not only the downside ones. The per-period ratio is
/// scaled by `sqrt(252)` regardless of the actual sampling interval.
pub fn sortino_ratio(values: &[f64], risk_free_rate: f64, target_return: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let returns = simple_returns(values);
    if returns.is_empty() {
        return 0.0;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let mean_excess = mean(&excess);

    let downside_squared: f64 = returns
        .iter()
        .filter(|r| **r < target_return)
        .map(|r| (r - target_return).powi(2))
        .sum();
    let downside_deviation = (downside_squared / returns.len() as f64).sqrt();
    if downside_deviation == 0.0 {
        return 0.0;
    }
    finite_or_zero(mean_excess / downside_deviation * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Root mean square of drawdowns, taken over every observation.
pub fn ulcer_index(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut peak = values[0];
    let mut squared_sum = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        let dd = drawdown(peak, value);
        squared_sum += dd * dd;
    }
    finite_or_zero((squared_sum / values.len() as f64).sqrt())
}

/// Annualized excess return (`mean * 252`) per unit of [`ulcer_index`].
pub fn ulcer_performance_index(values: &[f64], risk_free_rate: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let returns = simple_returns(values);
    if returns.is_empty() {
        return 0.0;
    }
    let annualized_excess = (mean(&returns) - risk_free_rate) * TRADING_DAYS_PER_YEAR;
    let ulcer = ulcer_index(values);
    if ulcer == 0.0 {
        return 0.0;
    }
    finite_or_zero(annualized_excess / ulcer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn all_statistics(values: &[f64]) -> [f64; 9] {
        [
            cagr(values, 365.0),
            total_return(values),
            volatility(values),
            annualized_volatility(values, TRADING_DAYS_PER_YEAR),
            max_drawdown(values),
            sharpe_ratio(values, 0.0),
            sortino_ratio(values, 0.0, 0.0),
            ulcer_index(values),
            ulcer_performance_index(values, 0.0),
        ]
    }

    #[test]
    fn empty_and_single_valuations_are_zero() {
        assert_eq!(all_statistics(&[]), [0.0; 9]);
        assert_eq!(all_statistics(&[100.0]), [0.0; 9]);
        assert_eq!(ulcer_index(&[100.0]), 0.0);
    }

    #[test]
    fn cagr_doubles_over_one_year() {
        assert_eq!(cagr(&[100.0, 200.0], 365.0), 1.0);
        assert_eq!(cagr(&[100.0, 100.0], 365.0), 0.0);
    }

    #[test]
    fn cagr_compounds_over_multiple_years() {
        assert_relative_eq!(cagr(&[100.0, 121.0], 730.0), 0.1, epsilon = 1e-12);
        // intermediate valuations do not matter
        assert_relative_eq!(
            cagr(&[100.0, 40.0, 500.0, 121.0], 730.0),
            0.1,
            epsilon = 1e-12
        );
    }

    #[test]
    fn cagr_degenerate_inputs_are_zero() {
        assert_eq!(cagr(&[100.0, 200.0], 0.0), 0.0);
        assert_eq!(cagr(&[100.0, 200.0], -5.0), 0.0);
        assert_eq!(cagr(&[100.0, 200.0], f64::NAN), 0.0);
        assert_eq!(cagr(&[0.0, 200.0], 365.0), 0.0);
        assert_eq!(cagr(&[-10.0, 200.0], 365.0), 0.0);
        // negative ending value has no real root
        assert_eq!(cagr(&[100.0, -50.0], 180.0), 0.0);
        assert_eq!(cagr(&[100.0, 0.0], 365.0), -1.0);
    }

    #[test]
    fn volatility_of_constant_series_is_zero() {
        assert_eq!(volatility(&[100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn volatility_needs_two_returns() {
        assert_eq!(volatility(&[100.0, 150.0]), 0.0);
        // the zero step is skipped, leaving a single return
        assert_eq!(volatility(&[0.0, 100.0, 150.0]), 0.0);
    }

    #[test]
    fn volatility_uses_sample_deviation() {
        let values = [100.0, 120.0, 108.0];
        let expected = 0.15 * 2.0_f64.sqrt();
        assert_relative_eq!(volatility(&values), expected, epsilon = 1e-12);
        assert_relative_eq!(
            annualized_volatility(&values, 252.0),
            expected * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
        assert_eq!(annualized_volatility(&values, 0.0), 0.0);
    }

    #[test]
    fn synthetic_returns_round_trip_through_volatility() {
        let mut rng = StdRng::seed_from_u64(7);
        let returns: Vec<f64> = (0..250).map(|_| rng.gen_range(-0.05..0.05)).collect();
        let mut values = vec![1_000.0];
        for r in &returns {
            let last = *values.last().unwrap();
            values.push(last * (1.0 + r));
        }

        let m = returns.iter().sum::<f64>() / returns.len() as f64;
        let expected = (returns.iter().map(|r| (r - m).powi(2)).sum::<f64>()
            / (returns.len() - 1) as f64)
            .sqrt();
        assert!((volatility(&values) - expected).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_tracks_running_peak() {
        assert_eq!(max_drawdown(&[100.0, 50.0, 75.0]), 0.5);
        assert_relative_eq!(max_drawdown(&[100.0, 150.0, 120.0]), 0.2, epsilon = 1e-12);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        assert_eq!(max_drawdown(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn max_drawdown_reaches_one_at_zero_and_exceeds_it_below() {
        assert_eq!(max_drawdown(&[100.0, 0.0]), 1.0);
        assert_eq!(max_drawdown(&[100.0, 50.0, 0.0, 20.0]), 1.0);
        assert_relative_eq!(max_drawdown(&[100.0, -25.0]), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_ratio_of_constant_returns_is_zero() {
        assert_eq!(sharpe_ratio(&[100.0, 110.0, 121.0], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0], 0.0), 0.0);
    }

    #[test]
    fn sharpe_ratio_uses_sample_deviation() {
        let values = [100.0, 120.0, 108.0];
        assert_relative_eq!(
            sharpe_ratio(&values, 0.0),
            1.0 / (3.0 * 2.0_f64.sqrt()),
            epsilon = 1e-12
        );
        // risk free rate shifts the numerator only
        let vol = 0.15 * 2.0_f64.sqrt();
        assert_relative_eq!(
            sharpe_ratio(&values, 0.01),
            0.04 / vol,
            epsilon = 1e-12
        );
    }

    #[test]
    fn sharpe_ratio_with_zero_valuation_is_zero() {
        assert_eq!(sharpe_ratio(&[0.0, 100.0, 110.0], 0.0), 0.0);
    }

    #[test]
    fn sortino_ratio_without_downside_is_zero() {
        assert_eq!(sortino_ratio(&[100.0, 105.0, 111.0, 130.0], 0.0, 0.0), 0.0);
        assert_eq!(sortino_ratio(&[0.0, 0.0, 0.0], 0.0, 0.0), 0.0);
    }

    #[test]
    fn sortino_ratio_divides_downside_by_all_returns() {
        // returns 0.2 and -0.1: downside deviation is sqrt(0.01 / 2), not sqrt(0.01 / 1)
        let values = [100.0, 120.0, 108.0];
        assert_relative_eq!(
            sortino_ratio(&values, 0.0, 0.0),
            126.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn sortino_ratio_respects_target_return() {
        // with a 0.25 target both returns fall short
        let values = [100.0, 120.0, 108.0];
        let downside = ((0.05_f64.powi(2) + 0.35_f64.powi(2)) / 2.0).sqrt();
        assert_relative_eq!(
            sortino_ratio(&values, 0.0, 0.25),
            0.05 / downside * 252.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn sortino_ratio_subtracts_risk_free_rate_from_returns() {
        // excess returns 0.19 and -0.11; downside still measured against the 0 target
        let values = [100.0, 120.0, 108.0];
        let downside = (0.1_f64.powi(2) / 2.0).sqrt();
        assert_relative_eq!(
            sortino_ratio(&values, 0.01, 0.0),
            0.04 / downside * 252.0_f64.sqrt(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            sortino_ratio(&values, 0.01, 0.0),
            0.4 * 504.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn ulcer_index_includes_every_observation() {
        assert_eq!(ulcer_index(&[]), 0.0);
        assert_eq!(ulcer_index(&[100.0]), 0.0);
        assert_relative_eq!(
            ulcer_index(&[100.0, 120.0, 108.0]),
            0.1 / 3.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn ulcer_performance_index_scales_mean_return() {
        let values = [100.0, 120.0, 108.0];
        assert_relative_eq!(
            ulcer_performance_index(&values, 0.0),
            126.0 * 3.0_f64.sqrt(),
            epsilon = 1e-9
        );
        assert_eq!(ulcer_performance_index(&[100.0, 110.0, 120.0], 0.0), 0.0);
    }

    #[test]
    fn ulcer_performance_index_subtracts_risk_free_rate() {
        // (0.05 - 0.01) * 252 over an ulcer index of 0.1 / sqrt(3)
        let values = [100.0, 120.0, 108.0];
        assert_relative_eq!(
            ulcer_performance_index(&values, 0.01),
            100.8 * 3.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn ulcer_performance_index_skips_steps_from_zero() {
        // returns -0.1 and 2/9 (the step out of 0 is dropped), mean 11/180;
        // ulcer index over all four observations is sqrt(0.01 / 4) = 0.05
        let values = [0.0, 100.0, 90.0, 110.0];
        assert_relative_eq!(ulcer_index(&values), 0.05, epsilon = 1e-12);
        assert_relative_eq!(
            ulcer_performance_index(&values, 0.0),
            308.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn total_return_compares_last_to_first() {
        assert_relative_eq!(total_return(&[100.0, 80.0, 125.0]), 0.25, epsilon = 1e-12);
        assert_eq!(total_return(&[0.0, 125.0]), 0.0);
    }

    #[test]
    fn statistics_are_idempotent() {
        let values = [1_000.0, 1_040.0, 990.0, 1_120.0, 1_080.0, 1_200.0];
        assert_eq!(all_statistics(&values), all_statistics(&values));
    }

    proptest! {
        #[test]
        fn statistics_stay_finite(values in prop::collection::vec(-1.0e6..1.0e6_f64, 0..64)) {
            for stat in all_statistics(&values) {
                prop_assert!(stat.is_finite());
            }
        }

        #[test]
        fn drawdown_of_positive_series_is_a_fraction(
            values in prop::collection::vec(0.01..1.0e6_f64, 2..64)
        ) {
            let dd = max_drawdown(&values);
            prop_assert!((0.0..1.0).contains(&dd));
            prop_assert!(ulcer_index(&values) <= dd);
        }

        #[test]
        fn drawdown_of_non_negative_series_is_at_most_one(
            mut values in prop::collection::vec(0.01..1.0e6_f64, 2..64),
            zero_at in 0usize..64
        ) {
            let idx = zero_at % values.len();
            values[idx] = 0.0;
            let dd = max_drawdown(&values);
            prop_assert!((0.0..=1.0).contains(&dd));
            prop_assert!(ulcer_index(&values) <= dd + 1e-12);
        }
    }
}
