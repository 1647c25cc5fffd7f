//! Blocking facade over the async transport.

use std::sync::Arc;

use louie_api::{
    ChatRequest, LouieApiClient, LouieApiConfig, LouieApiError, StaticToken, StreamUpdate, Thread,
    TokenProvider,
};
use louie_elements::Table;
use tokio::runtime::Runtime;

use crate::config::{EnvConfig, ENV_API_KEY};
use crate::cursor::InvokeOptions;
use crate::hydrate::{hydrate_tables, ArtifactFetcher};
use crate::turn::Turn;

/// Executes one turn against the service. [`crate::Cursor`] depends only on
/// this seam, so tests can substitute scripted turns.
pub trait Transport: ArtifactFetcher + Send {
    /// Run `request` to completion, reporting live progress to `on_update`.
    /// The returned turn is the same whether or not anything observes it.
    fn execute(
        &self,
        request: &ChatRequest,
        on_update: &mut dyn FnMut(StreamUpdate),
    ) -> Result<Turn, LouieApiError>;

    /// Normalized server base URL, used for thread links.
    fn base_url(&self) -> String;
}

/// Synchronous client. Each call blocks the current thread on a private
/// current-thread runtime until the stream ends or times out.
pub struct LouieClient {
    runtime: Runtime,
    api: LouieApiClient,
}

impl std::fmt::Debug for LouieClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LouieClient").field("api", &self.api).finish()
    }
}

impl LouieClient {
    pub fn new(config: LouieApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, LouieApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                LouieApiError::Runtime(format!("failed to initialize tokio runtime: {error}"))
            })?;

        Ok(Self {
            runtime,
            api: LouieApiClient::new(config, tokens)?,
        })
    }

    /// Client authenticated with the static key from the environment.
    pub fn from_env(env: &EnvConfig) -> Result<Self, LouieApiError> {
        let api_key = env.api_key.clone().ok_or_else(|| {
            LouieApiError::MissingCredentials(format!("{ENV_API_KEY} is not set"))
        })?;
        Self::new(env.api_config(), Arc::new(StaticToken::new(api_key)))
    }

    pub fn api(&self) -> &LouieApiClient {
        &self.api
    }

    /// Run one query against `thread_id` (blank starts a new thread) and
    /// return the hydrated turn.
    pub fn add_cell(
        &self,
        thread_id: &str,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<Turn, LouieApiError> {
        let request = options.apply(ChatRequest::new(prompt).with_thread_id(thread_id));
        let mut turn = Transport::execute(self, &request, &mut |_| {})?;
        hydrate_tables(self, turn.thread_id.as_deref(), &mut turn.blocks);
        Ok(turn)
    }

    /// Without an initial prompt the thread id stays empty until the first
    /// query creates the thread server side.
    pub fn create_thread(
        &self,
        name: Option<&str>,
        initial_prompt: Option<&str>,
    ) -> Result<(Thread, Option<Turn>), LouieApiError> {
        let name = name.map(ToOwned::to_owned);
        let Some(prompt) = initial_prompt.filter(|prompt| !prompt.trim().is_empty()) else {
            return Ok((
                Thread {
                    id: String::new(),
                    name,
                },
                None,
            ));
        };

        let turn = self.add_cell("", prompt, &InvokeOptions::default())?;
        let thread = Thread {
            id: turn.thread_id.clone().unwrap_or_default(),
            name,
        };
        Ok((thread, Some(turn)))
    }

    pub fn list_threads(&self, page: u32, page_size: u32) -> Result<Vec<Thread>, LouieApiError> {
        self.runtime.block_on(self.api.list_threads(page, page_size))
    }

    pub fn get_thread(&self, thread_id: &str) -> Result<Thread, LouieApiError> {
        self.runtime.block_on(self.api.get_thread(thread_id))
    }
}

impl Transport for LouieClient {
    fn execute(
        &self,
        request: &ChatRequest,
        on_update: &mut dyn FnMut(StreamUpdate),
    ) -> Result<Turn, LouieApiError> {
        let turn = self
            .runtime
            .block_on(self.api.execute_with_handler(request, |update| on_update(update)))?;
        Ok(Turn::from(turn))
    }

    fn base_url(&self) -> String {
        self.api.base_url()
    }
}

impl ArtifactFetcher for LouieClient {
    fn fetch(&self, thread_id: &str, block_id: &str) -> Result<Table, LouieApiError> {
        self.runtime.block_on(self.api.fetch_table(thread_id, block_id))
    }
}
