use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

const DEFAULT_DB_PATH: &str = "agora.db";
const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 250;
const DEFAULT_FEED_LIMIT: u32 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid IANA time zone: '{value}'")]
    TimeZone { var: &'static str, value: String },
    #[error("{var} must be a non-negative integer, got '{value}'")]
    Number { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Zone feed timestamps are rendered in, label included
    pub time_zone: Tz,
    /// Bound on a single store lookup before it counts as unavailable
    pub lookup_timeout: Duration,
    pub feed_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("AGORA_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();

        let time_zone = match lookup("AGORA_TIME_ZONE") {
            Some(value) => value.parse::<Tz>().map_err(|_| ConfigError::TimeZone {
                var: "AGORA_TIME_ZONE",
                value,
            })?,
            None => DEFAULT_TIME_ZONE,
        };

        let lookup_timeout = Duration::from_millis(parse_number(
            &lookup,
            "AGORA_LOOKUP_TIMEOUT_MS",
            DEFAULT_LOOKUP_TIMEOUT_MS,
        )?);

        let feed_limit = parse_number(&lookup, "AGORA_FEED_LIMIT", DEFAULT_FEED_LIMIT)?;

        Ok(Self {
            db_path,
            time_zone,
            lookup_timeout,
            feed_limit,
        })
    }
}

fn parse_number<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Number { var, value }),
        None => Ok(default),
    }
}
