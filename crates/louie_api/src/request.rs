use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Agent used when the caller does not pick one.
pub const DEFAULT_AGENT: &str = "LouieAgent";

/// Who can see a turn's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareMode {
    #[default]
    Private,
    Organization,
    Public,
}

impl ShareMode {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "private" => Self::Private,
            "organization" | "org" => Self::Organization,
            "public" => Self::Public,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Organization => "Organization",
            Self::Public => "Public",
        }
    }
}

impl fmt::Display for ShareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!("unknown share mode '{value}' (expected Private, Organization or Public)")
        })
    }
}

/// One natural-language query against a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    /// Existing thread to continue; `None` asks the server for a new one.
    pub thread_id: Option<String>,
    pub agent: String,
    /// Include reasoning traces. Sent inverted as `ignore_traces`.
    pub traces: bool,
    pub share_mode: ShareMode,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            thread_id: None,
            agent: DEFAULT_AGENT.to_owned(),
            traces: false,
            share_mode: ShareMode::Private,
        }
    }

    /// Blank thread ids are treated as "start a new thread".
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        let thread_id = thread_id.into();
        self.thread_id = if thread_id.trim().is_empty() {
            None
        } else {
            Some(thread_id)
        };
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_traces(mut self, traces: bool) -> Self {
        self.traces = traces;
        self
    }

    pub fn with_share_mode(mut self, share_mode: ShareMode) -> Self {
        self.share_mode = share_mode;
        self
    }

    /// Query parameters in wire order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let agent = if self.agent.trim().is_empty() {
            DEFAULT_AGENT.to_owned()
        } else {
            self.agent.trim().to_owned()
        };
        let mut params = vec![
            ("query", self.prompt.clone()),
            ("agent", agent),
            ("ignore_traces", (!self.traces).to_string()),
            ("share_mode", self.share_mode.as_str().to_owned()),
        ];
        if let Some(thread_id) = &self.thread_id {
            params.push(("dthread_id", thread_id.clone()));
        }
        params
    }
}
