use domain::PortfolioMetrics;

use crate::{
    series::ValuationSeries,
    stats::{self, TRADING_DAYS_PER_YEAR},
};

/// Parameters shared by every statistic in a report. Rates are per period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsConfig {
    pub risk_free_rate: f64,
    pub target_return: f64,
    /// Scaling used for the annualized volatility figure only.
    pub periods_per_year: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            target_return: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl MetricsConfig {
    pub fn with_rates(mut self, risk_free_rate: Option<f64>, target_return: Option<f64>) -> Self {
        if let Some(rate) = risk_free_rate.filter(|v| v.is_finite()) {
            self.risk_free_rate = rate;
        }
        if let Some(target) = target_return.filter(|v| v.is_finite()) {
            self.target_return = target;
        }
        self
    }

    pub fn evaluate(&self, series: &ValuationSeries) -> PortfolioMetrics {
        let values = series.values();
        PortfolioMetrics {
            observations: series.len(),
            span_days: series.span_days(),
            first_timestamp: series.first_timestamp(),
            last_timestamp: series.last_timestamp(),
            latest_value: series.latest().unwrap_or(0.0),
            total_return: stats::total_return(values),
            cagr: stats::cagr(values, series.span_days()),
            volatility: stats::volatility(values),
            annualized_volatility: stats::annualized_volatility(values, self.periods_per_year),
            max_drawdown: stats::max_drawdown(values),
            sharpe_ratio: stats::sharpe_ratio(values, self.risk_free_rate),
            sortino_ratio: stats::sortino_ratio(values, self.risk_free_rate, self.target_return),
            ulcer_index: stats::ulcer_index(values),
            ulcer_performance_index: stats::ulcer_performance_index(values, self.risk_free_rate),
            sufficient_data: series.len() >= 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn report_flags_insufficient_data() {
        let series = ValuationSeries::from_values(vec![250.0], 0.0).unwrap();
        let report = MetricsConfig::default().evaluate(&series);
        assert!(!report.sufficient_data);
        assert_eq!(report.observations, 1);
        assert_eq!(report.latest_value, 250.0);
        assert_eq!(report.cagr, 0.0);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.ulcer_index, 0.0);
    }

    #[test]
    fn report_uses_series_span_for_cagr() {
        let series = ValuationSeries::from_values(vec![100.0, 150.0, 200.0], 365.0).unwrap();
        let report = MetricsConfig::default().evaluate(&series);
        assert!(report.sufficient_data);
        assert_eq!(report.cagr, 1.0);
        assert_eq!(report.total_return, 1.0);
        assert_eq!(report.max_drawdown, 0.0);
    }

    #[test]
    fn rates_override_defaults_when_finite() {
        let config = MetricsConfig::default().with_rates(Some(0.001), Some(f64::NAN));
        assert_eq!(config.risk_free_rate, 0.001);
        assert_eq!(config.target_return, 0.0);

        let series = ValuationSeries::from_values(vec![100.0, 120.0, 108.0], 2.0).unwrap();
        let report = config.evaluate(&series);
        let vol = 0.15 * 2.0_f64.sqrt();
        assert_relative_eq!(report.sharpe_ratio, 0.049 / vol, epsilon = 1e-12);
    }
}
