//! Environment configuration.

use std::env;
use std::time::Duration;

use louie_api::config::{DEFAULT_CHUNK_TIMEOUT, DEFAULT_TOTAL_TIMEOUT};
use louie_api::request::DEFAULT_AGENT;
use louie_api::url::DEFAULT_LOUIE_BASE_URL;
use louie_api::{LouieApiConfig, ShareMode};

pub const ENV_URL: &str = "LOUIE_URL";
pub const ENV_TIMEOUT: &str = "LOUIE_TIMEOUT";
pub const ENV_STREAMING_TIMEOUT: &str = "LOUIE_STREAMING_TIMEOUT";
pub const ENV_SHARE_MODE: &str = "LOUIE_SHARE_MODE";
pub const ENV_AGENT: &str = "LOUIE_AGENT";
pub const ENV_TRACES: &str = "LOUIE_TRACES";
pub const ENV_API_KEY: &str = "GRAPHISTRY_API_KEY";
pub const ENV_ORG_NAME: &str = "GRAPHISTRY_ORG_NAME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub base_url: String,
    pub total_timeout: Duration,
    pub chunk_timeout: Duration,
    pub share_mode: ShareMode,
    pub agent: String,
    pub traces: bool,
    pub api_key: Option<String>,
    pub org_name: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOUIE_BASE_URL.to_owned(),
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            share_mode: ShareMode::Private,
            agent: DEFAULT_AGENT.to_owned(),
            traces: false,
            api_key: None,
            org_name: None,
        }
    }
}

impl EnvConfig {
    /// Unset, blank or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string_opt(ENV_URL).unwrap_or(defaults.base_url),
            total_timeout: env_secs(ENV_TIMEOUT).unwrap_or(defaults.total_timeout),
            chunk_timeout: env_secs(ENV_STREAMING_TIMEOUT).unwrap_or(defaults.chunk_timeout),
            share_mode: env_string_opt(ENV_SHARE_MODE)
                .and_then(|value| ShareMode::parse(&value))
                .unwrap_or(defaults.share_mode),
            agent: env_string_opt(ENV_AGENT).unwrap_or(defaults.agent),
            traces: env_flag(ENV_TRACES),
            api_key: env_string_opt(ENV_API_KEY),
            org_name: env_string_opt(ENV_ORG_NAME),
        }
    }

    /// Transport settings derived from this environment.
    pub fn api_config(&self) -> LouieApiConfig {
        let config = LouieApiConfig::new(&self.base_url)
            .with_total_timeout(self.total_timeout)
            .with_chunk_timeout(self.chunk_timeout);
        match &self.org_name {
            Some(org_name) => config.with_org_name(org_name),
            None => config,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        }
    })
}

fn env_secs(key: &str) -> Option<Duration> {
    let raw = env_string_opt(key)?;
    let parsed = raw
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    match parsed {
        Some(timeout) => Some(timeout),
        None => {
            tracing::warn!(key, value = %raw, "ignoring invalid timeout, using default");
            None
        }
    }
}
