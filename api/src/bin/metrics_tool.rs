use std::{env, fs};

use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use domain::{MetricsResponse, SnapshotQuery, ValuationPoint};
use portfolio_api::{
    bootstrap::build_state,
    config::{normalize_wallet_address, AppConfig},
    services::{evaluate_points, wallet_metrics},
    telemetry,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AppConfig::from_env()?;
    let metrics_config = config.metrics_config();

    let mut args = env::args().skip(1);
    let cmd = args.next().unwrap_or_default();

    match cmd.as_str() {
        "wallet" => {
            let raw = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing wallet address"))?;
            let wallet = normalize_wallet_address(&raw)
                .ok_or_else(|| anyhow::anyhow!("invalid wallet address: {raw}"))?;
            let state = build_state(&config)?;
            let mut query = SnapshotQuery::for_wallet(wallet);
            query.limit = config.snapshot_default_limit;
            let response = wallet_metrics(state.snapshots.as_ref(), &metrics_config, &query).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "file" => {
            let path = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing points file"))?;
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let points: Vec<ValuationPoint> =
                serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
            print_report(&metrics_config, points)?;
        }
        "synthetic" => {
            let count = args
                .next()
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("count must be a positive integer")?
                .unwrap_or(365);
            let seed = args
                .next()
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("seed must be an unsigned integer")?
                .unwrap_or(42);
            print_report(&metrics_config, synthetic_points(count, seed))?;
        }
        _ => {
            eprintln!(
                "Usage: cargo run -p portfolio_api --bin metrics_tool -- <command>\n\
                 Commands:\n  wallet <address>\n  file <points.json>\n  synthetic [count] [seed]"
            );
        }
    }

    Ok(())
}

fn print_report(
    config: &metrics_engine::MetricsConfig,
    points: Vec<ValuationPoint>,
) -> anyhow::Result<()> {
    let (metrics, display) = evaluate_points(config, points)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&MetricsResponse { metrics, display })?
    );
    Ok(())
}

/// Daily valuations starting at $10,000 with uniformly drawn returns in [-2%, 3%).
fn synthetic_points(count: usize, seed: u64) -> Vec<ValuationPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single();
    let start = start.unwrap_or_else(Utc::now);

    let mut value = 10_000.0_f64;
    (0..count)
        .map(|day| {
            if day > 0 {
                value *= 1.0 + rng.gen_range(-0.02..0.03);
            }
            ValuationPoint {
                timestamp: start + Duration::days(day as i64),
                total_value_usd: value,
            }
        })
        .collect()
}
