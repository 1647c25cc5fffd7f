use std::collections::BTreeMap;
use std::time::Duration;

use crate::session::StreamPolicy;
use crate::url::DEFAULT_LOUIE_BASE_URL;

/// Overall wall-clock budget for one streamed turn.
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(300);
/// Longest silence tolerated between two received chunks.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(120);
/// Lines that must have arrived before an idle timeout counts as completion.
/// The server keeps the connection open after its final record, so an idle
/// read after real output is the normal end of a turn.
pub const DEFAULT_IDLE_COMPLETION_MIN_LINES: usize = 2;
/// Turns slower than this log an advisory.
pub const DEFAULT_SLOW_RESPONSE_THRESHOLD: Duration = Duration::from_secs(30);

/// Transport configuration for Louie API requests.
#[derive(Debug, Clone)]
pub struct LouieApiConfig {
    /// Base URL for Louie endpoints.
    pub base_url: String,
    /// Organization name; sent slugged as `X-Graphistry-Org`.
    pub org_name: Option<String>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    pub total_timeout: Duration,
    pub chunk_timeout: Duration,
    pub idle_completion_min_lines: usize,
    pub slow_response_threshold: Duration,
}

impl Default for LouieApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOUIE_BASE_URL.to_string(),
            org_name: None,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            idle_completion_min_lines: DEFAULT_IDLE_COMPLETION_MIN_LINES,
            slow_response_threshold: DEFAULT_SLOW_RESPONSE_THRESHOLD,
        }
    }
}

impl LouieApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = Some(org_name.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    pub fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    pub fn with_idle_completion_min_lines(mut self, lines: usize) -> Self {
        self.idle_completion_min_lines = lines;
        self
    }

    pub fn with_slow_response_threshold(mut self, threshold: Duration) -> Self {
        self.slow_response_threshold = threshold;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// Timeout policy applied to the streamed chat response.
    pub fn stream_policy(&self) -> StreamPolicy {
        StreamPolicy {
            total_timeout: self.total_timeout,
            chunk_timeout: self.chunk_timeout,
            idle_completion_min_lines: self.idle_completion_min_lines,
            slow_response_threshold: self.slow_response_threshold,
        }
    }
}
