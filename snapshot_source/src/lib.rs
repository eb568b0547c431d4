use std::sync::Arc;

use async_trait::async_trait;
use domain::{PortfolioSnapshot, SnapshotQuery, ValuationPoint};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SnapshotSourceError {
    #[error("snapshot store returned status {status}")]
    Upstream { status: u16 },
    #[error("snapshot store unreachable: {0}")]
    Transport(String),
    #[error("failed to decode snapshot payload: {0}")]
    Decode(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotSourceError>;

/// Where timestamped portfolio snapshots come from.
///
/// Implementations return matches newest first, the way the snapshot store serves them.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshots(&self, query: &SnapshotQuery) -> SnapshotResult<Vec<PortfolioSnapshot>>;
}

#[derive(Clone, Default)]
pub struct InMemorySnapshotSource {
    snapshots: Arc<RwLock<Vec<PortfolioSnapshot>>>,
}

impl InMemorySnapshotSource {
    pub fn new(snapshots: Vec<PortfolioSnapshot>) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(snapshots)),
        }
    }

    pub async fn insert(&self, snapshot: PortfolioSnapshot) {
        self.snapshots.write().await.push(snapshot);
    }
}

#[async_trait]
impl SnapshotSource for InMemorySnapshotSource {
    async fn snapshots(&self, query: &SnapshotQuery) -> SnapshotResult<Vec<PortfolioSnapshot>> {
        let wallet = query.wallet_address.to_lowercase();
        let guard = self.snapshots.read().await;
        let mut matches: Vec<PortfolioSnapshot> = guard
            .iter()
            .filter(|s| s.wallet_address.to_lowercase() == wallet)
            .filter(|s| match query.timestamp_from {
                Some(from) => s.created_at > from,
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = usize::try_from(query.offset.max(0)).unwrap_or(0);
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(0);
        Ok(matches.into_iter().skip(offset).take(limit).collect())
    }
}

/// Valuation points in the order the snapshots were given.
pub fn valuation_points(snapshots: &[PortfolioSnapshot]) -> Vec<ValuationPoint> {
    snapshots
        .iter()
        .map(|s| ValuationPoint {
            timestamp: s.created_at,
            total_value_usd: s.data.total_value_usd,
        })
        .collect()
}
