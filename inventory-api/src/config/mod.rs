//! Configuration read from environment variables.
//!
//! Every setting has a default except `DATABASE_URL` in live mode. Values
//! that fail to parse fall back to their default with a warning.

mod dependencies;

pub use dependencies::{Dependencies, DEMO_COMPANY_ID, DEMO_USERNAME};

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use inventory_cache::CacheSource;
use tracing::warn;

use crate::cache::{CacheSettings, DEFAULT_CACHE_TIMEOUT};
use crate::errors::StartupError;

/// Default listen address.
const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default listen port.
const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default PostgreSQL pool size.
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default asset index alias.
const DEFAULT_INDEX_ALIAS: &str = "assets";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default per-asset cache TTL in seconds.
const DEFAULT_ASSET_TTL_SECS: u64 = 300;

/// Default aggregation cache TTL in seconds.
const DEFAULT_AGGREGATION_TTL_SECS: u64 = 60;

/// Default capacity of the in-memory cache.
const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default deadline of a single store call in milliseconds.
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Which store implementations to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// PostgreSQL and OpenSearch.
    Live,
    /// In-memory stores seeded with a demo user.
    Mock,
}

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection every retry interval until successful.
    Retry,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl StoreMode {
    fn parse(value: Option<String>) -> Self {
        match value.unwrap_or_else(|| "live".to_string()).to_lowercase().as_str() {
            "live" => Self::Live,
            "mock" => Self::Mock,
            _ => {
                warn!("Invalid STORE_MODE, defaulting to 'live'");
                Self::Live
            }
        }
    }
}

impl ConnectionMode {
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<String>) -> Self {
        match value.unwrap_or_else(|| "retry".to_string()).to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT` on its own, before tracing is installed.
    ///
    /// Nothing is logged here; an invalid value is reported when the full
    /// configuration is loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("LOG_FORMAT")
            .and_then(|value| Self::from_name(&value))
            .unwrap_or(Self::Pretty)
    }

    fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }

    fn parse(value: Option<String>) -> Self {
        match value {
            None => Self::Pretty,
            Some(value) => Self::from_name(&value).unwrap_or_else(|| {
                warn!("Invalid LOG_FORMAT, defaulting to 'pretty'");
                Self::Pretty
            }),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: IpAddr,
    pub server_port: u16,
    pub store_mode: StoreMode,
    /// Required in [`StoreMode::Live`].
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub opensearch_url: String,
    pub index_alias: String,
    pub index_version: u32,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub cache_enabled: bool,
    pub asset_cache_ttl: Duration,
    pub aggregation_cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub store_timeout: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SERVER_HOST` / `SERVER_PORT`: Listen address (default: 0.0.0.0:5000)
    /// - `STORE_MODE`: "live" or "mock" (default: live)
    /// - `DATABASE_URL`: PostgreSQL connection string (required in live mode)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `ASSET_INDEX_ALIAS`: Index alias name (default: "assets")
    /// - `ASSET_INDEX_VERSION`: Index version number (default: 0)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `CACHE_ENABLED`: Whether to cache at all (default: true)
    /// - `CACHE_ASSET_TTL_SECS`: Per-asset TTL (default: 300)
    /// - `CACHE_AGGREGATION_TTL_SECS`: Aggregation TTL (default: 60)
    /// - `CACHE_MAX_ENTRIES`: In-memory cache capacity (default: 10000)
    /// - `STORE_TIMEOUT_MS`: Deadline of each store call (default: 5000)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_mode = StoreMode::parse(lookup("STORE_MODE"));
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_mode == StoreMode::Live && database_url.is_none() {
            return Err(StartupError::config("DATABASE_URL must be set in live mode"));
        }

        Ok(Self {
            server_host: parse_or(&lookup, "SERVER_HOST", DEFAULT_SERVER_HOST),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT),
            store_mode,
            database_url,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            opensearch_url: lookup("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index_alias: lookup("ASSET_INDEX_ALIAS")
                .unwrap_or_else(|| DEFAULT_INDEX_ALIAS.to_string()),
            index_version: parse_or(&lookup, "ASSET_INDEX_VERSION", 0),
            connection_mode: ConnectionMode::parse(lookup("OPENSEARCH_CONNECTION_MODE")),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
            cache_enabled: parse_or(&lookup, "CACHE_ENABLED", true),
            asset_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "CACHE_ASSET_TTL_SECS",
                DEFAULT_ASSET_TTL_SECS,
            )),
            aggregation_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "CACHE_AGGREGATION_TTL_SECS",
                DEFAULT_AGGREGATION_TTL_SECS,
            )),
            cache_max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES),
            store_timeout: Duration::from_millis(parse_or(
                &lookup,
                "STORE_TIMEOUT_MS",
                DEFAULT_STORE_TIMEOUT_MS,
            )),
            log_format: LogFormat::parse(lookup("LOG_FORMAT")),
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    pub fn cache_source(&self) -> CacheSource {
        if self.cache_enabled {
            CacheSource::memory(self.cache_max_entries)
        } else {
            CacheSource::disabled()
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            asset_ttl: self.asset_cache_ttl,
            aggregation_ttl: self.aggregation_cache_ttl,
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Invalid configuration value, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, StartupError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_in_mock_mode() {
        let config = load(&[("STORE_MODE", "mock")]).unwrap();

        assert_eq!(config.store_mode, StoreMode::Mock);
        assert_eq!(config.server_addr(), "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.opensearch_url, DEFAULT_OPENSEARCH_URL);
        assert_eq!(config.index_alias, "assets");
        assert_eq!(config.connection_mode, ConnectionMode::Retry);
        assert_eq!(config.asset_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.aggregation_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_millis(5000));
        assert_eq!(config.cache_source(), CacheSource::memory(10_000));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_live_mode_requires_database_url() {
        let result = load(&[]);
        assert!(matches!(result, Err(StartupError::ConfigError(_))));

        let config = load(&[("DATABASE_URL", "postgres://localhost/inventory")]).unwrap();
        assert_eq!(config.store_mode, StoreMode::Live);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/inventory")
        );
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = load(&[
            ("STORE_MODE", "mock"),
            ("SERVER_PORT", "eighty"),
            ("OPENSEARCH_CONNECTION_MODE", "sometimes"),
            ("CACHE_MAX_ENTRIES", "-1"),
        ])
        .unwrap();

        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.connection_mode, ConnectionMode::Retry);
        assert_eq!(config.cache_max_entries, DEFAULT_CACHE_MAX_ENTRIES);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STORE_MODE", "MOCK"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("OPENSEARCH_CONNECTION_MODE", "fail-fast"),
            ("CACHE_ENABLED", "false"),
            ("CACHE_AGGREGATION_TTL_SECS", "5"),
            ("STORE_TIMEOUT_MS", "250"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.connection_mode, ConnectionMode::FailFast);
        assert_eq!(config.cache_source(), CacheSource::disabled());
        assert_eq!(config.cache_settings().aggregation_ttl, Duration::from_secs(5));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_format_is_readable_without_the_rest_of_the_config() {
        let lookup = |key: &str| (key == "LOG_FORMAT").then(|| "JSON".to_string());
        assert_eq!(LogFormat::from_lookup(lookup), LogFormat::Json);
        assert!(AppConfig::from_lookup(lookup).is_err());

        let lookup = |key: &str| (key == "LOG_FORMAT").then(|| "loud".to_string());
        assert_eq!(LogFormat::from_lookup(lookup), LogFormat::Pretty);
    }

    #[test]
    fn test_fallbacks_are_logged_once_tracing_is_installed() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            load(&[
                ("STORE_MODE", "mock"),
                ("LOG_FORMAT", "loud"),
                ("SERVER_PORT", "eighty"),
            ])
            .unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Invalid LOG_FORMAT"), "{}", output);
        assert!(output.contains("SERVER_PORT"), "{}", output);
    }
}
