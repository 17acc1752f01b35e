use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "LINKPULSE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "LINKPULSE_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "LINKPULSE_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "LINKPULSE_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "LINKPULSE_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "LINKPULSE_REDIS_URL";
pub const CACHE_TTL_ENV: &str = "LINKPULSE_CACHE_TTL_SECS";
pub const CACHE_TIMEOUT_ENV: &str = "LINKPULSE_CACHE_TIMEOUT_MS";
pub const MOKA_CAPACITY_ENV: &str = "LINKPULSE_MOKA_CAPACITY";
pub const ALIAS_LENGTH_ENV: &str = "LINKPULSE_ALIAS_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "LINKPULSE_ALIAS_MAX_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "LINKPULSE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "disabled")]
    Disabled,
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
    /// Moka in front of Redis.
    #[value(name = "layered")]
    Layered,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Disabled => write!(f, "disabled"),
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
            CacheBackendArg::Layered => write!(f, "layered"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "linkpulse-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix short URLs are built under.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(
        long,
        env = REDIS_URL_ENV,
        required_if_eq_any([("cache", "redis"), ("cache", "layered")])
    )]
    pub redis_url: Option<String>,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = 24 * 60 * 60)]
    pub cache_ttl_secs: u64,

    /// Budget for a single cache call before it counts as a miss.
    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value_t = 50)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = MOKA_CAPACITY_ENV, default_value_t = 10_000)]
    pub moka_capacity: u64,

    #[arg(long, env = ALIAS_LENGTH_ENV, default_value_t = 8)]
    pub alias_length: usize,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = 5)]
    pub max_attempts: u32,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

impl CLI {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}
