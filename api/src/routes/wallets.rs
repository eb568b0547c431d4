use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use domain::{SnapshotQuery, ValuationPoint, WalletMetricsResponse, WalletResponse};
use serde::Deserialize;
use tracing::warn;

use crate::{
    config::{normalize_wallet_address, MAX_SNAPSHOT_LIMIT},
    services::{load_wallet_points, wallet_metrics},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets))
        .route("/wallets/:address/metrics", get(get_wallet_metrics))
        .route("/wallets/:address/series", get(get_wallet_series))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletMetricsParams {
    limit: Option<i64>,
    offset: Option<i64>,
    timestamp_from: Option<DateTime<Utc>>,
    risk_free_rate: Option<f64>,
    target_return: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletSeriesParams {
    limit: Option<i64>,
    offset: Option<i64>,
    timestamp_from: Option<DateTime<Utc>>,
}

async fn list_wallets(State(state): State<AppState>) -> Json<Vec<WalletResponse>> {
    Json(
        state
            .config
            .wallet_addresses
            .iter()
            .map(|address| WalletResponse {
                address: address.clone(),
            })
            .collect(),
    )
}

fn snapshot_query(
    state: &AppState,
    address: &str,
    limit: Option<i64>,
    offset: Option<i64>,
    timestamp_from: Option<DateTime<Utc>>,
) -> Result<SnapshotQuery, StatusCode> {
    let wallet = normalize_wallet_address(address).ok_or(StatusCode::BAD_REQUEST)?;
    let mut query = SnapshotQuery::for_wallet(wallet);
    query.limit = limit
        .unwrap_or(state.config.snapshot_default_limit)
        .clamp(1, MAX_SNAPSHOT_LIMIT);
    query.offset = offset.unwrap_or(0).max(0);
    query.timestamp_from = timestamp_from;
    Ok(query)
}

async fn get_wallet_metrics(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<WalletMetricsParams>,
) -> Result<Json<WalletMetricsResponse>, StatusCode> {
    let query = snapshot_query(
        &state,
        &address,
        params.limit,
        params.offset,
        params.timestamp_from,
    )?;
    let config = state
        .metrics_config()
        .with_rates(params.risk_free_rate, params.target_return);

    wallet_metrics(state.snapshots.as_ref(), &config, &query)
        .await
        .map(Json)
        .map_err(|err| {
            warn!(wallet = %query.wallet_address, error = %err, "wallet metrics failed");
            StatusCode::BAD_GATEWAY
        })
}

async fn get_wallet_series(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<WalletSeriesParams>,
) -> Result<Json<Vec<ValuationPoint>>, StatusCode> {
    let query = snapshot_query(
        &state,
        &address,
        params.limit,
        params.offset,
        params.timestamp_from,
    )?;
    load_wallet_points(state.snapshots.as_ref(), &query)
        .await
        .map(Json)
        .map_err(|err| {
            warn!(wallet = %query.wallet_address, error = %err, "wallet series failed");
            StatusCode::BAD_GATEWAY
        })
}
