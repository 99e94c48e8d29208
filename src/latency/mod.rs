pub mod cache;
pub mod filter;
pub mod handler;
pub mod loader;
pub mod stats;
pub mod tz;
pub mod types;

use crate::config::AppConfig;
use cache::TableCache;
use chrono_tz::Tz;
use deadpool_sqlite::Pool;

/// Shared state for the report endpoints.
pub struct LatencyState {
    pub pool: Pool,
    pub cache: TableCache,
    /// Report zone, parsed once at startup.
    pub tz: Tz,
    /// Cache key; the database path, so distinct databases never share.
    pub db_key: String,
}

impl LatencyState {
    pub fn new(config: &AppConfig, pool: Pool) -> Result<Self, String> {
        let tz: Tz = config
            .report
            .timezone
            .parse()
            .map_err(|_| format!("unknown timezone: {}", config.report.timezone))?;
        Ok(Self {
            pool,
            cache: TableCache::new(config.cache.ttl_secs),
            tz,
            db_key: config.database.path.display().to_string(),
        })
    }
}
