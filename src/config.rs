use std::env;
use std::time::Duration;

use crate::constants::{
    BYTES_PER_GB, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS, DEFAULT_POLL_INTERVAL,
    DEFAULT_RETRY_DELAY, DEFAULT_TARGET_SIZE_GB, MAX_WORKERS_PER_KIND,
};
use crate::workers::WorkerMix;

/// Run configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection target for the pool
    pub database_url: String,
    /// Database whose size is polled; `None` means the connection's own database
    pub database_name: Option<String>,
    /// Stop threshold in bytes
    pub target_size_bytes: u64,
    pub max_connections: u32,
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub workers: WorkerMix,
}

impl Config {
    /// Configuration with default tuning for the given target
    pub fn new(database_url: impl Into<String>, target_size_bytes: u64) -> Self {
        Self {
            database_url: database_url.into(),
            database_name: None,
            target_size_bytes,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
            workers: WorkerMix::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let database_name = env::var("DATABASE_NAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let target_gb: f64 = match env::var("TARGET_SIZE_GB") {
            Ok(raw) => raw.trim().parse().map_err(|_| "Invalid TARGET_SIZE_GB")?,
            Err(_) => DEFAULT_TARGET_SIZE_GB,
        };
        let target_size_bytes = gb_to_bytes(target_gb)?;

        let max_connections = env::var("MAX_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .map_err(|_| "Invalid MAX_CONNECTIONS")?;

        let poll_interval = duration_ms_var("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?;
        let retry_delay = duration_ms_var("RETRY_DELAY_MS", DEFAULT_RETRY_DELAY)?;

        let defaults = WorkerMix::default();
        let workers = WorkerMix {
            audit: count_var("AUDIT_WORKERS", defaults.audit)?,
            order: count_var("ORDER_WORKERS", defaults.order)?,
            user: count_var("USER_WORKERS", defaults.user)?,
        };

        Ok(Config {
            database_url,
            database_name,
            target_size_bytes,
            max_connections,
            poll_interval,
            retry_delay,
            workers,
        })
    }

    /// Target size in gigabytes, for display
    pub fn target_gb(&self) -> f64 {
        self.target_size_bytes as f64 / BYTES_PER_GB
    }

    /// Pool size large enough for every worker plus the size monitor
    pub fn pool_size(&self) -> u32 {
        let needed = u32::try_from(self.workers.total().saturating_add(1)).unwrap_or(u32::MAX);
        self.max_connections.max(needed)
    }
}

/// Convert a gigabyte threshold into bytes, rejecting negative or non-finite values
pub fn gb_to_bytes(gb: f64) -> Result<u64, String> {
    if !gb.is_finite() || gb < 0.0 {
        return Err(format!("Invalid TARGET_SIZE_GB: {gb}"));
    }
    Ok((gb * BYTES_PER_GB).round() as u64)
}

fn duration_ms_var(name: &str, default: Duration) -> Result<Duration, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| format!("Invalid {name}")),
        Err(_) => Ok(default),
    }
}

fn count_var(name: &str, default: usize) -> Result<usize, String> {
    match env::var(name) {
        Ok(raw) => parse_count(name, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse a worker count, capped at `MAX_WORKERS_PER_KIND`
fn parse_count(name: &str, raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count <= MAX_WORKERS_PER_KIND => Ok(count),
        Ok(_) => Err(format!("Invalid {name}: at most {MAX_WORKERS_PER_KIND} workers")),
        Err(_) => Err(format!("Invalid {name}")),
    }
}
