// Environment-level configuration for the judging engine

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "judge0-ce.p.rapidapi.com";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// How the local fallback executor approximates execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Placeholder output with plausible metrics.
    Synthetic,
    /// Spawn a local interpreter for languages that have one.
    Interpreter,
    /// Canned answers for a few well-known problems. Test fixture only.
    Fixture,
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthetic" => Ok(FallbackMode::Synthetic),
            "interpreter" => Ok(FallbackMode::Interpreter),
            "fixture" => Ok(FallbackMode::Fixture),
            other => Err(format!(
                "unknown fallback mode '{}', expected synthetic, interpreter or fixture",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_host: String,
    pub force_local: bool,
    pub fallback_mode: FallbackMode,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub http_timeout: Duration,
    pub cpu_time_limit_s: f64,
    pub memory_limit_kb: u64,
    pub local_timeout: Duration,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            force_local: false,
            fallback_mode: FallbackMode::Synthetic,
            poll_interval: Duration::from_millis(1000),
            max_poll_attempts: 10,
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
            http_timeout: Duration::from_millis(10_000),
            cpu_time_limit_s: 2.0,
            memory_limit_kb: 128_000,
            local_timeout: Duration::from_millis(5000),
        }
    }
}

impl JudgeConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            api_url: get("JUDGE0_API_URL").map(|u| u.trim_end_matches('/').to_string()),
            api_key: get("JUDGE0_API_KEY"),
            api_host: get("JUDGE0_API_HOST").unwrap_or(defaults.api_host),
            force_local: parse_or("JUDGE_FORCE_LOCAL", get("JUDGE_FORCE_LOCAL"), false)?,
            fallback_mode: parse_or(
                "JUDGE_FALLBACK_MODE",
                get("JUDGE_FALLBACK_MODE"),
                defaults.fallback_mode,
            )?,
            poll_interval: millis_or(
                "JUDGE_POLL_INTERVAL_MS",
                get("JUDGE_POLL_INTERVAL_MS"),
                defaults.poll_interval,
            )?,
            max_poll_attempts: parse_or(
                "JUDGE_MAX_POLL_ATTEMPTS",
                get("JUDGE_MAX_POLL_ATTEMPTS"),
                defaults.max_poll_attempts,
            )?,
            max_retries: parse_or(
                "JUDGE_MAX_RETRIES",
                get("JUDGE_MAX_RETRIES"),
                defaults.max_retries,
            )?,
            backoff_base: millis_or(
                "JUDGE_BACKOFF_BASE_MS",
                get("JUDGE_BACKOFF_BASE_MS"),
                defaults.backoff_base,
            )?,
            http_timeout: millis_or(
                "JUDGE_HTTP_TIMEOUT_MS",
                get("JUDGE_HTTP_TIMEOUT_MS"),
                defaults.http_timeout,
            )?,
            cpu_time_limit_s: parse_or(
                "JUDGE_CPU_TIME_LIMIT_S",
                get("JUDGE_CPU_TIME_LIMIT_S"),
                defaults.cpu_time_limit_s,
            )?,
            memory_limit_kb: parse_or(
                "JUDGE_MEMORY_LIMIT_KB",
                get("JUDGE_MEMORY_LIMIT_KB"),
                defaults.memory_limit_kb,
            )?,
            local_timeout: millis_or(
                "JUDGE_LOCAL_TIMEOUT_MS",
                get("JUDGE_LOCAL_TIMEOUT_MS"),
                defaults.local_timeout,
            )?,
        })
    }

    /// Remote execution is attempted only when a base URL and credentials are
    /// both present and local execution is not forced.
    pub fn remote_enabled(&self) -> bool {
        !self.force_local && self.api_url.is_some() && self.api_key.is_some()
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn millis_or(
    name: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let ms = parse_or(name, raw, default.as_millis() as u64)?;
    Ok(Duration::from_millis(ms))
}
