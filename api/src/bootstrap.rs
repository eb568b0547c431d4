use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::AppConfig,
    rate_limiter::RateLimiter,
    services::{CachedSnapshotSource, HttpSnapshotSource},
    state::AppState,
};

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let http_source = Arc::new(
        HttpSnapshotSource::new(config.snapshot_api_base.clone(), config.http_timeout)
            .context("failed to build snapshot store client")?,
    );
    let snapshots = Arc::new(CachedSnapshotSource::new(
        http_source,
        config.snapshot_cache_ttl,
    ));

    let rate_limiter = Arc::new(
        RateLimiter::new(
            config.rate_limiter_window,
            config.rate_limiter_limit,
            config.redis_url.clone(),
        )
        .context("invalid REDIS_URL")?,
    );

    info!(
        snapshot_api_base = %config.snapshot_api_base,
        wallets = config.wallet_addresses.len(),
        redis = config.redis_url.is_some(),
        "application state ready"
    );

    Ok(AppState {
        config: config.clone(),
        snapshots,
        rate_limiter,
    })
}
