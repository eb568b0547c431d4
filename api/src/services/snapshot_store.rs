use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::SecondsFormat;
use domain::{PortfolioSnapshot, SnapshotQuery};
use reqwest::Client;
use snapshot_source::{SnapshotResult, SnapshotSource, SnapshotSourceError};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Reads snapshots from the portfolio snapshot store over HTTP.
pub struct HttpSnapshotSource {
    client: Client,
    api_base: String,
}

impl HttpSnapshotSource {
    pub fn new(api_base: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn query_params(query: &SnapshotQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("walletAddress", query.wallet_address.clone()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(from) = query.timestamp_from {
            params.push((
                "timestampFrom",
                from.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        params
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn snapshots(&self, query: &SnapshotQuery) -> SnapshotResult<Vec<PortfolioSnapshot>> {
        let url = format!("{}/portfolioSnapshots", self.api_base);
        let resp = self
            .client
            .get(url)
            .query(&Self::query_params(query))
            .send()
            .await
            .map_err(|err| SnapshotSourceError::Transport(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), wallet = %query.wallet_address, "snapshot store rejected query");
            return Err(SnapshotSourceError::Upstream {
                status: status.as_u16(),
            });
        }

        resp.json::<Vec<PortfolioSnapshot>>()
            .await
            .map_err(|err| SnapshotSourceError::Decode(err.to_string()))
    }
}

#[derive(Clone)]
struct CachedSnapshots {
    snapshots: Vec<PortfolioSnapshot>,
    fetched_at: Instant,
}

/// Keeps successful lookups for `ttl`, keyed by the full query. Failures are never cached.
pub struct CachedSnapshotSource<S> {
    inner: Arc<S>,
    cache: Arc<RwLock<HashMap<SnapshotQuery, CachedSnapshots>>>,
    ttl: Duration,
}

impl<S> CachedSnapshotSource<S>
where
    S: SnapshotSource + 'static,
{
    pub fn new(inner: Arc<S>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    async fn cached(&self, query: &SnapshotQuery) -> Option<Vec<PortfolioSnapshot>> {
        let cache = self.cache.read().await;
        cache
            .get(query)
            .filter(|entry| entry.fetched_at.elapsed() <= self.ttl)
            .map(|entry| entry.snapshots.clone())
    }

    async fn store(&self, query: &SnapshotQuery, snapshots: &[PortfolioSnapshot]) {
        let mut cache = self.cache.write().await;
        cache.retain(|_, entry| entry.fetched_at.elapsed() <= self.ttl);
        cache.insert(
            query.clone(),
            CachedSnapshots {
                snapshots: snapshots.to_vec(),
                fetched_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<S> SnapshotSource for CachedSnapshotSource<S>
where
    S: SnapshotSource + 'static,
{
    async fn snapshots(&self, query: &SnapshotQuery) -> SnapshotResult<Vec<PortfolioSnapshot>> {
        if self.ttl.is_zero() {
            return self.inner.snapshots(query).await;
        }
        if let Some(hit) = self.cached(query).await {
            debug!(wallet = %query.wallet_address, "snapshot cache hit");
            return Ok(hit);
        }
        let snapshots = self.inner.snapshots(query).await?;
        self.store(query, &snapshots).await;
        Ok(snapshots)
    }
}
