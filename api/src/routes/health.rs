use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/healthz", get(healthz))
}

async fn banner() -> &'static str {
    "portfolio-metrics backend"
}

async fn healthz() -> &'static str {
    "ok"
}
