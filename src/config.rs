use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5350
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("latlens.db")
}

fn default_pool_size() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// IANA zone name the report localizes timestamps into.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl AppConfig {
    /// Validate configuration before startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.database.path.as_os_str().is_empty() {
            return Err("database.path must not be empty. \
                 Set it in config.toml or via LATLENS__DATABASE__PATH env var."
                .to_string());
        }
        if self.report.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(format!(
                "report.timezone is not a known IANA zone: {}. \
                 Set it in config.toml or via LATLENS__REPORT__TIMEZONE env var.",
                self.report.timezone
            ));
        }
        Ok(())
    }

    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        // Load from config file
        let path = config_path.unwrap_or("config.toml");
        builder = builder.add_source(File::with_name(path).required(false));

        // Overlay with environment variables (LATLENS__SERVER__PORT=5351, etc.)
        builder = builder.add_source(
            Environment::with_prefix("LATLENS")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_file() {
        let cfg = AppConfig::load(Some("does-not-exist.toml")).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5350);
        assert_eq!(cfg.database.pool_size, 4);
        assert_eq!(cfg.cache.ttl_secs, 60);
        assert_eq!(cfg.report.timezone, "America/Sao_Paulo");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut cfg = AppConfig::load(Some("does-not-exist.toml")).unwrap();
        cfg.report.timezone = "America/Nowhere".to_string();
        assert!(cfg.validate().is_err());
    }
}
