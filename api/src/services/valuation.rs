use domain::{
    FormattedMetrics, PortfolioMetrics, SnapshotQuery, ValuationPoint, WalletMetricsResponse,
};
use metrics_engine::{format_metrics, MetricsConfig, SeriesError, ValuationSeries};
use snapshot_source::{valuation_points, SnapshotSource, SnapshotSourceError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MetricsServiceError {
    #[error(transparent)]
    Source(#[from] SnapshotSourceError),
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Evaluates a series and records how large it was.
pub fn evaluate_series(
    config: &MetricsConfig,
    series: &ValuationSeries,
) -> (PortfolioMetrics, FormattedMetrics) {
    let report = config.evaluate(series);
    metrics::counter!("portfolio_metrics_evaluations_total").increment(1);
    metrics::histogram!("portfolio_metrics_series_length").record(series.len() as f64);
    let display = format_metrics(&report);
    (report, display)
}

pub fn evaluate_points(
    config: &MetricsConfig,
    points: Vec<ValuationPoint>,
) -> Result<(PortfolioMetrics, FormattedMetrics), SeriesError> {
    let series = ValuationSeries::from_points(points)?;
    Ok(evaluate_series(config, &series))
}

/// Wallet valuations ordered oldest first.
pub async fn load_wallet_points(
    source: &dyn SnapshotSource,
    query: &SnapshotQuery,
) -> Result<Vec<ValuationPoint>, SnapshotSourceError> {
    let snapshots = source.snapshots(query).await.map_err(|err| {
        metrics::counter!("snapshot_fetch_failures_total").increment(1);
        warn!(wallet = %query.wallet_address, error = %err, "snapshot lookup failed");
        err
    })?;
    let mut points = valuation_points(&snapshots);
    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

pub async fn wallet_metrics(
    source: &dyn SnapshotSource,
    config: &MetricsConfig,
    query: &SnapshotQuery,
) -> Result<WalletMetricsResponse, MetricsServiceError> {
    let points = load_wallet_points(source, query).await?;
    let (metrics, display) = evaluate_points(config, points)?;
    info!(
        wallet = %query.wallet_address,
        observations = metrics.observations,
        sufficient_data = metrics.sufficient_data,
        "wallet metrics evaluated"
    );
    Ok(WalletMetricsResponse {
        wallet_address: query.wallet_address.clone(),
        metrics,
        display,
    })
}
