use std::sync::Arc;
use std::time::{Duration, Instant};

use louie_elements::{classify, classify_all, Block, Table};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::arrow::decode_arrow_table;
use crate::auth::TokenProvider;
use crate::config::LouieApiConfig;
use crate::error::LouieApiError;
use crate::headers::build_headers;
use crate::reconcile::{Ingest, StreamReconciler};
use crate::request::ChatRequest;
use crate::retry::with_auth_retry;
use crate::session::{drive_stream_since, header_timeout, StreamStats};
use crate::url::{arrow_endpoint, chat_endpoint, normalize_base_url, thread_endpoint, threads_endpoint};

/// A server-side conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Thread {
    pub id: String,
    pub name: Option<String>,
}

/// Live progress of a streamed turn, for display side channels.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    ThreadAssigned { id: String },
    /// Latest state of the block at `position` (first-appearance order).
    BlockUpdated {
        position: usize,
        replaced: bool,
        block: Block,
    },
}

/// Final, reconciled result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledTurn {
    pub thread_id: Option<String>,
    pub blocks: Vec<Block>,
    pub lines_received: usize,
    pub elapsed: Duration,
}

pub struct LouieApiClient {
    http: Client,
    config: LouieApiConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for LouieApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LouieApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LouieApiClient {
    /// No client-wide timeout is set: the streamed chat body is governed by
    /// the stream policy, other calls by a per-request timeout.
    pub fn new(config: LouieApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, LouieApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &LouieApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> String {
        normalize_base_url(&self.config.base_url)
    }

    pub fn build_headers(&self, token: &str) -> Result<HeaderMap, LouieApiError> {
        let headers = build_headers(&self.config, token)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| LouieApiError::InvalidHeader {
                    name: key.clone(),
                    reason: "invalid header name",
                })?,
                HeaderValue::from_str(&value).map_err(|_| LouieApiError::InvalidHeader {
                    name: key.clone(),
                    reason: "invalid header value",
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_chat_request(
        &self,
        request: &ChatRequest,
        token: &str,
    ) -> Result<reqwest::RequestBuilder, LouieApiError> {
        Ok(self
            .http
            .post(chat_endpoint(&self.config.base_url))
            .headers(self.build_headers(token)?)
            .query(&request.query_params()))
    }

    async fn send_checked(builder: reqwest::RequestBuilder) -> Result<Response, LouieApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(LouieApiError::status(status, body))
    }

    async fn send_authorized<F>(&self, build: F) -> Result<Response, LouieApiError>
    where
        F: Fn(&str) -> Result<reqwest::RequestBuilder, LouieApiError>,
    {
        with_auth_retry(self.tokens.as_ref(), |token| {
            let builder = build(&token);
            async move { Self::send_checked(builder?).await }
        })
        .await
    }

    /// Run one turn and return its reconciled, classified blocks.
    pub async fn execute(&self, request: &ChatRequest) -> Result<ReconciledTurn, LouieApiError> {
        self.execute_with_handler(request, |_| {}).await
    }

    /// Like [`Self::execute`], reporting each thread assignment and block
    /// update to `on_update` while the stream is read. The returned turn is
    /// identical either way.
    pub async fn execute_with_handler<F>(
        &self,
        request: &ChatRequest,
        mut on_update: F,
    ) -> Result<ReconciledTurn, LouieApiError>
    where
        F: FnMut(StreamUpdate),
    {
        let policy = self.config.stream_policy();
        let started = Instant::now();
        let send = self.send_authorized(|token| self.build_chat_request(request, token));
        let response = match tokio::time::timeout(header_timeout(&policy), send).await {
            Ok(response) => response?,
            Err(_) => {
                return Err(LouieApiError::StreamTimeout {
                    elapsed: started.elapsed(),
                    lines_received: 0,
                    chunk_timeout: policy.chunk_timeout,
                    total_timeout: policy.total_timeout,
                })
            }
        };

        let mut reconciler = StreamReconciler::new();
        let stats = drive_stream_since(
            started,
            response.bytes_stream(),
            &policy,
            &mut reconciler,
            |reconciler, outcome| {
                if let Some(update) = stream_update(reconciler, outcome) {
                    on_update(update);
                }
            },
        )
        .await?;

        Ok(finish_turn(&reconciler, stats))
    }

    /// Fetch the Arrow export of one dataframe block.
    pub async fn fetch_table(&self, thread_id: &str, block_id: &str) -> Result<Table, LouieApiError> {
        let url = arrow_endpoint(&self.config.base_url, thread_id, block_id);
        let response = self
            .send_authorized(|token| {
                Ok(self
                    .http
                    .get(&url)
                    .headers(self.build_headers(token)?)
                    .timeout(self.config.total_timeout))
            })
            .await?;
        let bytes = response.bytes().await?;
        decode_arrow_table(block_id, &bytes)
    }

    /// Threads, most recently modified first. `page` is 1-based.
    pub async fn list_threads(&self, page: u32, page_size: u32) -> Result<Vec<Thread>, LouieApiError> {
        let url = threads_endpoint(&self.config.base_url);
        let params = [
            ("page", page.max(1).to_string()),
            ("page_size", page_size.to_string()),
            ("sort_by", "last_modified".to_owned()),
            ("sort_order", "desc".to_owned()),
        ];
        let response = self
            .send_authorized(|token| {
                Ok(self
                    .http
                    .get(&url)
                    .headers(self.build_headers(token)?)
                    .query(&params)
                    .timeout(self.config.total_timeout))
            })
            .await?;

        let page: ThreadPage = serde_json::from_str(&response.text().await?)?;
        Ok(page.items.into_iter().map(Thread::from).collect())
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread, LouieApiError> {
        let url = thread_endpoint(&self.config.base_url, thread_id);
        let response = self
            .send_authorized(|token| {
                Ok(self
                    .http
                    .get(&url)
                    .headers(self.build_headers(token)?)
                    .timeout(self.config.total_timeout))
            })
            .await?;

        let item: ThreadItem = serde_json::from_str(&response.text().await?)?;
        Ok(Thread::from(item))
    }
}

#[derive(Debug, Deserialize)]
struct ThreadPage {
    #[serde(default)]
    items: Vec<ThreadItem>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    #[serde(default)]
    id: String,
    name: Option<String>,
}

impl From<ThreadItem> for Thread {
    fn from(item: ThreadItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
        }
    }
}

fn stream_update(reconciler: &StreamReconciler, outcome: &Ingest) -> Option<StreamUpdate> {
    match outcome {
        Ingest::Thread { id } => Some(StreamUpdate::ThreadAssigned { id: id.clone() }),
        Ingest::Block { position, replaced } => {
            reconciler
                .block_at(*position)
                .map(|record| StreamUpdate::BlockUpdated {
                    position: *position,
                    replaced: *replaced,
                    block: classify(record),
                })
        }
        Ingest::ConflictingThread { .. } | Ingest::Malformed | Ingest::Ignored => None,
    }
}

/// Snapshot the reconciler into a classified turn.
pub fn finish_turn(reconciler: &StreamReconciler, stats: StreamStats) -> ReconciledTurn {
    let (thread_id, records) = reconciler.finalize();
    ReconciledTurn {
        thread_id,
        blocks: classify_all(&records),
        lines_received: stats.lines_received,
        elapsed: stats.elapsed,
    }
}
