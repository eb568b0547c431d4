use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use domain::{MetricsRequest, MetricsResponse};
use tracing::warn;

use crate::{services::evaluate_points, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", post(compute_metrics))
}

/// Evaluates a caller-supplied valuation history. Points may arrive in any order.
async fn compute_metrics(
    State(state): State<AppState>,
    Json(payload): Json<MetricsRequest>,
) -> Result<Json<MetricsResponse>, StatusCode> {
    let config = state
        .metrics_config()
        .with_rates(payload.risk_free_rate, payload.target_return);

    let (metrics, display) = evaluate_points(&config, payload.points).map_err(|err| {
        warn!(error = %err, "rejected valuation history");
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(MetricsResponse { metrics, display }))
}
