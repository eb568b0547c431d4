use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SNAPSHOT_LIMIT: i64 = 1000;

/// One platform line inside a stored snapshot, e.g. `Pendle / PT wstkscUSD`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SnapshotItem {
    pub platform: String,
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PortfolioSnapshotData {
    #[serde(rename = "totalValueUSD")]
    pub total_value_usd: f64,
    #[serde(default)]
    pub items: Vec<SnapshotItem>,
}

/// Snapshot row as served by the snapshot store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: Uuid,
    pub version: String,
    pub wallet_address: String,
    pub data: PortfolioSnapshotData,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "totalValueUSD")]
    pub total_value_usd: f64,
}

/// Filter for snapshot lookups. Results come back newest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotQuery {
    pub wallet_address: String,
    pub limit: i64,
    pub offset: i64,
    pub timestamp_from: Option<DateTime<Utc>>,
}

impl SnapshotQuery {
    pub fn for_wallet(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            limit: DEFAULT_SNAPSHOT_LIMIT,
            offset: 0,
            timestamp_from: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub observations: usize,
    pub span_days: f64,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub latest_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub annualized_volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub ulcer_index: f64,
    pub ulcer_performance_index: f64,
    /// False when fewer than two observations were available; the statistics are then 0.
    pub sufficient_data: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormattedMetrics {
    pub latest_value: String,
    pub total_return: String,
    pub cagr: String,
    pub volatility: String,
    pub annualized_volatility: String,
    pub max_drawdown: String,
    pub sharpe_ratio: String,
    pub sortino_ratio: String,
    pub ulcer_index: String,
    pub ulcer_performance_index: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    pub points: Vec<ValuationPoint>,
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
    #[serde(default)]
    pub target_return: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: PortfolioMetrics,
    pub display: FormattedMetrics,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetricsResponse {
    pub wallet_address: String,
    pub metrics: PortfolioMetrics,
    pub display: FormattedMetrics,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub address: String,
}
