use std::{env, time::Duration};

use tracing::info;

use crate::error::ConfigError;

pub struct Config {
    pub service: ServiceConfig,
    pub store: StoreConfig,
}

pub struct ServiceConfig {
    pub port: u16,
    pub shutdown_timeout: Duration,
}

pub struct StoreConfig {
    pub uri: String,
    pub ping_timeout: Duration,
    pub database: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = ServiceConfig {
            port: parse_or("SERVICE_PORT", "8080", &lookup, |v| v.parse().ok())?,
            shutdown_timeout: parse_or("SERVICE_SHUTDOWN_TIMEOUT", "15s", &lookup, parse_duration)?,
        };

        let store = StoreConfig {
            uri: lookup("STORE_URI")
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("STORE_URI"))?,
            ping_timeout: parse_or("STORE_PING_TIMEOUT", "5s", &lookup, parse_duration)?,
            database: parse_or("STORE_DATABASE", "foodtinder", &lookup, |v| {
                Some(v.to_string())
            })?,
        };

        Ok(Self { service, store })
    }
}

fn parse_or<T, F, P>(key: &'static str, default: &str, lookup: &F, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(value.trim()).ok_or(ConfigError::Invalid { key, value })
}

/// Parses `500ms`, `15s`, `2m`, `1h`, or a bare number of seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "" | "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(amount.checked_mul(60 * 60)?)),
        _ => None,
    }
}
