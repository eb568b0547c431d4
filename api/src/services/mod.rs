pub mod valuation;
pub mod snapshot_store;

pub use valuation::{
    evaluate_points, evaluate_series, load_wallet_points, wallet_metrics, MetricsServiceError,
};
pub use snapshot_store::{CachedSnapshotSource, HttpSnapshotSource};
