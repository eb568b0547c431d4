use std::sync::Arc;

use metrics_engine::MetricsConfig;
use snapshot_source::SnapshotSource;

use crate::{config::AppConfig, rate_limiter::RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub snapshots: Arc<dyn SnapshotSource>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn metrics_config(&self) -> MetricsConfig {
        self.config.metrics_config()
    }
}

// Ensure critical dependencies uphold Send/Sync for Axum state usage.
#[allow(dead_code)]
fn _assert_state_types_are_send_sync()
where
    AppConfig: Send + Sync + 'static,
    dyn SnapshotSource: Send + Sync,
    RateLimiter: Send + Sync,
{
}

#[allow(dead_code)]
fn _assert_state_bounds() {
    fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
    assert_bounds::<AppState>();
}
