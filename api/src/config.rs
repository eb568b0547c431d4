use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use ethers::types::Address;
use metrics_engine::MetricsConfig;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub snapshot_api_base: String,
    pub snapshot_cache_ttl: Duration,
    pub snapshot_default_limit: i64,
    pub http_timeout: Duration,
    pub wallet_addresses: Vec<String>,
    pub rate_limiter_window: Duration,
    pub rate_limiter_limit: u64,
    pub redis_url: Option<String>,
    pub risk_free_rate: f64,
    pub target_return: f64,
    pub volatility_periods_per_year: f64,
}

pub const MAX_SNAPSHOT_LIMIT: i64 = 1000;

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let wallet_addresses = parse_wallet_addresses("WALLET_ADDRESSES");
        let frontend_origins = parse_origins();

        if is_production_environment() && frontend_origins.iter().any(|o| o.contains("localhost")) {
            warn!(
                origins = ?frontend_origins,
                "FRONTEND_ORIGINS still allows localhost in production"
            );
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid u16")?,
            frontend_origins,
            snapshot_api_base: env::var("SNAPSHOT_API_BASE")
                .unwrap_or_else(|_| "https://portfolio-tracker-api.fly.dev".to_string()),
            snapshot_cache_ttl: parse_duration_millis("SNAPSHOT_CACHE_TTL_MS", 1000),
            snapshot_default_limit: parse_usize("SNAPSHOT_DEFAULT_LIMIT", 1000)
                .min(MAX_SNAPSHOT_LIMIT as usize) as i64,
            http_timeout: parse_duration_seconds("HTTP_TIMEOUT_SECS", 15),
            wallet_addresses,
            rate_limiter_window: parse_duration_millis("RATE_LIMITER_TTL", 60_000),
            rate_limiter_limit: parse_usize("RATE_LIMITER_LIMIT", 500) as u64,
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            risk_free_rate: parse_f64("RISK_FREE_RATE", 0.0),
            target_return: parse_f64("TARGET_RETURN", 0.0),
            volatility_periods_per_year: parse_f64("VOLATILITY_PERIODS_PER_YEAR", 252.0),
        })
    }

    /// Statistic parameters before any per-request override.
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            risk_free_rate: self.risk_free_rate,
            target_return: self.target_return,
            periods_per_year: self.volatility_periods_per_year,
        }
    }
}

/// Validates a 20-byte hex wallet address and returns it lowercased.
pub fn normalize_wallet_address(raw: &str) -> Option<String> {
    Address::from_str(raw.trim())
        .ok()
        .map(|address| format!("{:#x}", address))
}

fn is_production_environment() -> bool {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("ENV"))
        .map(|e| {
            let lower = e.to_lowercase();
            lower == "production" || lower == "prod"
        })
        .unwrap_or(false)
}

fn parse_origins() -> Vec<String> {
    if let Ok(list) = env::var("FRONTEND_ORIGINS") {
        split_list(&list)
    } else if let Ok(origin) = env::var("FRONTEND_ORIGIN") {
        split_list(&origin)
    } else {
        vec!["http://localhost:5173".to_string()]
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|item| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_wallet_addresses(key: &str) -> Vec<String> {
    let raw = match env::var(key) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let mut wallets = Vec::new();
    for entry in split_list(&raw) {
        match normalize_wallet_address(&entry) {
            Some(address) if !wallets.contains(&address) => wallets.push(address),
            Some(_) => {}
            None => warn!(entry = %entry, "ignoring invalid wallet address in {key}"),
        }
    }
    wallets
}

fn parse_duration_seconds(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

fn parse_duration_millis(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default))
}

fn parse_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}
