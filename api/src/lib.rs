pub mod app;
pub mod bootstrap;
pub mod config;
pub mod rate_limiter;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
