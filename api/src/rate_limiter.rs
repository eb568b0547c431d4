use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::state::AppState;

#[derive(Clone, Copy)]
struct Window {
    started_at: Instant,
    hits: u64,
}

#[derive(Clone)]
enum RateLimiterBackend {
    Memory {
        inner: Arc<Mutex<HashMap<IpAddr, Window>>>,
    },
    Redis {
        client: redis::Client,
        key_prefix: String,
    },
}

/// Fixed-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    backend: RateLimiterBackend,
    window: Duration,
    limit: u64,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: u64, redis_url: Option<String>) -> anyhow::Result<Self> {
        let backend = if let Some(url) = redis_url {
            RateLimiterBackend::Redis {
                client: redis::Client::open(url)?,
                key_prefix: "ratelimit:ip:".to_string(),
            }
        } else {
            RateLimiterBackend::Memory {
                inner: Arc::new(Mutex::new(HashMap::new())),
            }
        };
        Ok(Self {
            backend,
            window,
            limit: limit.max(1),
        })
    }

    pub fn in_memory(window: Duration, limit: u64) -> Self {
        Self {
            backend: RateLimiterBackend::Memory {
                inner: Arc::new(Mutex::new(HashMap::new())),
            },
            window,
            limit: limit.max(1),
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        match &self.backend {
            RateLimiterBackend::Memory { inner } => inner.lock().await.len(),
            RateLimiterBackend::Redis { .. } => 0,
        }
    }

    pub async fn check(&self, ip: IpAddr) -> Result<(), RateLimiterError> {
        let hits = match &self.backend {
            RateLimiterBackend::Memory { inner } => {
                let mut guard = inner.lock().await;
                let now = Instant::now();
                guard.retain(|_, w| now.duration_since(w.started_at) < self.window);
                let entry = guard.entry(ip).or_insert(Window {
                    started_at: now,
                    hits: 0,
                });
                entry.hits += 1;
                entry.hits
            }
            RateLimiterBackend::Redis { client, key_prefix } => {
                let mut conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|err| RateLimiterError::Backend(format!("redis conn: {err}")))?;
                let key = format!("{key_prefix}{ip}");
                let (hits,): (u64,) = window_pipeline(&key, self.window)
                    .query_async(&mut conn)
                    .await
                    .map_err(|err| RateLimiterError::Backend(format!("redis incr: {err}")))?;
                hits
            }
        };

        if hits > self.limit {
            Err(RateLimiterError::RateLimited)
        } else {
            Ok(())
        }
    }
}

/// Opens the window with its expiry if the key is missing, then counts the hit.
/// Both run in one MULTI/EXEC so a counter never exists without a TTL.
fn window_pipeline(key: &str, window: Duration) -> redis::Pipeline {
    let millis = window.as_millis().max(1) as u64;
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("PX")
        .arg(millis)
        .ignore()
        .cmd("INCR")
        .arg(key);
    pipe
}

#[derive(Debug)]
pub enum RateLimiterError {
    RateLimited,
    Backend(String),
}

/// Rejects callers over the window budget with 429. Backend outages let traffic through.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]));

    match state.rate_limiter.check(ip).await {
        Ok(()) => next.run(request).await,
        Err(RateLimiterError::RateLimited) => {
            metrics::counter!("rate_limited_requests_total").increment(1);
            StatusCode::TOO_MANY_REQUESTS.into_response()
        }
        Err(RateLimiterError::Backend(message)) => {
            warn!(%ip, error = %message, "rate limiter backend unavailable");
            next.run(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::in_memory(Duration::from_secs(60), 2);
        let ip = IpAddr::from([10, 0, 0, 1]);
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_ok());
        assert!(matches!(
            limiter.check(ip).await,
            Err(RateLimiterError::RateLimited)
        ));

        let other = IpAddr::from([10, 0, 0, 2]);
        assert!(limiter.check(other).await.is_ok());
    }

    #[tokio::test]
    async fn expired_windows_are_dropped() {
        let limiter = RateLimiter::in_memory(Duration::from_millis(500), 10);
        for i in 0..1000u32 {
            let ip = IpAddr::from(i.to_be_bytes());
            assert!(limiter.check(ip).await.is_ok());
        }
        assert_eq!(limiter.tracked_clients().await, 1000);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(limiter.check(IpAddr::from([192, 0, 2, 1])).await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[test]
    fn redis_window_sets_expiry_and_counts_in_one_transaction() {
        let packed = window_pipeline("ratelimit:ip:10.0.0.1", Duration::from_secs(60))
            .get_packed_pipeline();
        let text = String::from_utf8_lossy(&packed);
        let order: Vec<usize> = ["MULTI", "SET", "NX", "PX", "60000", "INCR", "EXEC"]
            .iter()
            .map(|token| text.find(token).expect(token))
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{text}");
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = RateLimiter::in_memory(Duration::from_millis(20), 1);
        let ip = IpAddr::from([10, 0, 0, 3]);
        assert!(limiter.check(ip).await.is_ok());
        assert!(limiter.check(ip).await.is_err());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check(ip).await.is_ok());
    }
}
