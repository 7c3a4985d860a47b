// Configuration for srcgraph.
// Reads from environment variables with sensible defaults.

use std::env;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    /// Per-request analyzer timeout in seconds (SRCGRAPH_REQUEST_TIMEOUT_SECS)
    pub request_timeout_secs: u64,

    /// Timeout for the initialize handshake in seconds (SRCGRAPH_INIT_TIMEOUT_SECS)
    pub init_timeout_secs: u64,

    /// Minimum post-initialize settle delay in seconds, applied to every
    /// language on top of its built-in hint (SRCGRAPH_SETTLE_SECS)
    pub settle_floor_secs: u64,

    /// Number of language partitions indexed in parallel (SRCGRAPH_CONCURRENCY)
    pub concurrency: usize,

    /// Read connection pool size (SRCGRAPH_POOL_SIZE)
    pub pool_size: u32,

    /// Read connection pool minimum idle connections (SRCGRAPH_POOL_MIN_IDLE)
    pub pool_min_idle: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            init_timeout_secs: 30,
            settle_floor_secs: 0,
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            pool_size: 8,
            pool_min_idle: 2,
        }
    }
}

impl Config {
    fn from_env() -> Self {
        let mut config = Config::default();
        read_env("SRCGRAPH_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs);
        read_env("SRCGRAPH_INIT_TIMEOUT_SECS", &mut config.init_timeout_secs);
        read_env("SRCGRAPH_SETTLE_SECS", &mut config.settle_floor_secs);
        read_env("SRCGRAPH_CONCURRENCY", &mut config.concurrency);
        read_env("SRCGRAPH_POOL_SIZE", &mut config.pool_size);
        read_env("SRCGRAPH_POOL_MIN_IDLE", &mut config.pool_min_idle);
        if config.concurrency == 0 {
            config.concurrency = 1;
        }
        config
    }

    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn read_env<T: std::str::FromStr + std::fmt::Display>(key: &str, slot: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => {
                tracing::warn!("invalid {key} value {raw:?}, using default {slot}");
            }
        }
    }
}
