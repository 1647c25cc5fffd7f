//! Conversational cursor: implicit thread continuation over a bounded
//! history of hydrated turns.

use std::fmt;

use louie_api::url::thread_url;
use louie_api::{ChatRequest, LouieApiError, ShareMode, StreamUpdate};
use louie_elements::{Block, DiagnosticLine, ExceptionBlock, GraphBlock, TableBlock};

use crate::client::{LouieClient, Transport};
use crate::config::EnvConfig;
use crate::history::History;
use crate::hydrate::hydrate_tables;
use crate::turn::{Turn, TurnView};

/// Per-call overrides. Unset fields fall back to the cursor's session
/// settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    pub traces: Option<bool>,
    pub share_mode: Option<ShareMode>,
    pub agent: Option<String>,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traces(mut self, traces: bool) -> Self {
        self.traces = Some(traces);
        self
    }

    pub fn with_share_mode(mut self, share_mode: ShareMode) -> Self {
        self.share_mode = Some(share_mode);
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Apply only the fields that are set.
    pub(crate) fn apply(&self, mut request: ChatRequest) -> ChatRequest {
        if let Some(traces) = self.traces {
            request = request.with_traces(traces);
        }
        if let Some(share_mode) = self.share_mode {
            request = request.with_share_mode(share_mode);
        }
        if let Some(agent) = &self.agent {
            request = request.with_agent(agent.clone());
        }
        request
    }
}

pub struct Cursor {
    transport: Box<dyn Transport>,
    thread_id: Option<String>,
    traces: bool,
    share_mode: ShareMode,
    agent: String,
    history: History,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("thread_id", &self.thread_id)
            .field("traces", &self.traces)
            .field("share_mode", &self.share_mode)
            .field("agent", &self.agent)
            .field("turns", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Cursor {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let defaults = EnvConfig::default();
        Self {
            transport,
            thread_id: None,
            traces: defaults.traces,
            share_mode: defaults.share_mode,
            agent: defaults.agent,
            history: History::new(),
        }
    }

    /// Cursor over a [`LouieClient`] configured from the environment, with
    /// the environment's session defaults.
    pub fn from_env() -> Result<Self, LouieApiError> {
        let env = EnvConfig::from_env();
        let client = LouieClient::from_env(&env)?;
        Ok(Self::new(Box::new(client))
            .with_traces(env.traces)
            .with_share_mode(env.share_mode)
            .with_agent(env.agent))
    }

    /// Continue an existing thread instead of starting a new one.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        let thread_id = thread_id.into();
        self.thread_id = Some(thread_id).filter(|id| !id.trim().is_empty());
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

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn invoke(&mut self, prompt: &str) -> Result<&mut Self, LouieApiError> {
        self.invoke_streaming(prompt, &InvokeOptions::default(), |_| {})
    }

    pub fn invoke_with(
        &mut self,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<&mut Self, LouieApiError> {
        self.invoke_streaming(prompt, options, |_| {})
    }

    /// Like [`Self::invoke_with`], reporting live block updates to
    /// `on_update`. Display only: the stored turn is the same either way.
    pub fn invoke_streaming<F>(
        &mut self,
        prompt: &str,
        options: &InvokeOptions,
        mut on_update: F,
    ) -> Result<&mut Self, LouieApiError>
    where
        F: FnMut(StreamUpdate),
    {
        let request = self.request_for(prompt, options);
        let mut turn = self.transport.execute(&request, &mut on_update)?;

        if turn.thread_id.is_none() {
            turn.thread_id = self.thread_id.clone();
        }
        let report = hydrate_tables(self.transport.as_ref(), turn.thread_id.as_deref(), &mut turn.blocks);
        tracing::debug!(
            thread_id = ?turn.thread_id,
            blocks = turn.blocks.len(),
            hydrated = report.hydrated,
            failed = report.failed,
            skipped = report.skipped,
            "turn complete"
        );

        if let Some(thread_id) = &turn.thread_id {
            if self.thread_id.as_deref() != Some(thread_id) {
                tracing::info!(thread_id = %thread_id, "using thread");
                self.thread_id = Some(thread_id.clone());
            }
        }
        self.history.push(turn);
        Ok(self)
    }

    fn request_for(&self, prompt: &str, options: &InvokeOptions) -> ChatRequest {
        let mut request = ChatRequest::new(prompt)
            .with_agent(self.agent.clone())
            .with_traces(self.traces)
            .with_share_mode(self.share_mode);
        if let Some(thread_id) = &self.thread_id {
            request = request.with_thread_id(thread_id.clone());
        }
        options.apply(request)
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Browser link for the active thread.
    pub fn url(&self) -> Option<String> {
        self.thread_id
            .as_deref()
            .map(|thread_id| thread_url(&self.transport.base_url(), thread_id))
    }

    pub fn traces(&self) -> bool {
        self.traces
    }

    pub fn set_traces(&mut self, traces: bool) {
        self.traces = traces;
    }

    pub fn share_mode(&self) -> ShareMode {
        self.share_mode
    }

    pub fn set_share_mode(&mut self, share_mode: ShareMode) {
        self.share_mode = share_mode;
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// View over `history[index]`; negative indices count from the latest.
    pub fn turn_at(&self, index: isize) -> TurnView<'_> {
        self.history.view(index)
    }

    pub fn latest(&self) -> TurnView<'_> {
        TurnView::new(self.history.latest())
    }

    pub fn latest_turn(&self) -> Option<&Turn> {
        self.history.latest()
    }

    pub fn blocks(&self) -> &[Block] {
        self.latest().blocks()
    }

    pub fn latest_text(&self) -> Option<&str> {
        self.latest().latest_text()
    }

    pub fn all_texts(&self) -> Vec<&str> {
        self.latest().all_texts()
    }

    pub fn latest_table(&self) -> Option<&TableBlock> {
        self.latest().latest_table()
    }

    pub fn all_tables(&self) -> Vec<&TableBlock> {
        self.latest().all_tables()
    }

    pub fn latest_graph(&self) -> Option<&GraphBlock> {
        self.latest().latest_graph()
    }

    pub fn all_graphs(&self) -> Vec<&GraphBlock> {
        self.latest().all_graphs()
    }

    pub fn errors(&self) -> Vec<&ExceptionBlock> {
        self.latest().errors()
    }

    pub fn has_errors(&self) -> bool {
        self.latest().has_errors()
    }

    pub fn diagnostics(&self) -> Vec<&DiagnosticLine> {
        self.latest().diagnostics()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Louie cursor: thread {}, {} turn(s), share mode {}, traces {}",
            self.thread_id.as_deref().unwrap_or("<new>"),
            self.history.len(),
            self.share_mode,
            if self.traces { "on" } else { "off" },
        )?;
        if !self.history.is_empty() {
            write!(f, "; latest {}", self.latest())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use louie_api::{ChatRequest, LouieApiError, ShareMode, StreamUpdate};
    use louie_elements::{classify, classify_all, Table};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::{Cursor, InvokeOptions};
    use crate::client::Transport;
    use crate::history::HISTORY_CAPACITY;
    use crate::hydrate::ArtifactFetcher;
    use crate::turn::Turn;

    #[derive(Default)]
    struct Shared {
        turns: VecDeque<Result<(Option<String>, Vec<Value>), LouieApiError>>,
        requests: Vec<ChatRequest>,
        fetches: Vec<(String, String)>,
    }

    /// Replays scripted turns and records every request it sees.
    #[derive(Clone, Default)]
    struct FakeTransport {
        shared: Arc<Mutex<Shared>>,
    }

    impl FakeTransport {
        fn script(&self, thread_id: Option<&str>, records: Vec<Value>) {
            self.shared
                .lock()
                .expect("fake state")
                .turns
                .push_back(Ok((thread_id.map(ToOwned::to_owned), records)));
        }

        fn fail_next(&self, error: LouieApiError) {
            self.shared
                .lock()
                .expect("fake state")
                .turns
                .push_back(Err(error));
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.shared.lock().expect("fake state").requests.clone()
        }

        fn fetches(&self) -> Vec<(String, String)> {
            self.shared.lock().expect("fake state").fetches.clone()
        }
    }

    impl Transport for FakeTransport {
        fn execute(
            &self,
            request: &ChatRequest,
            on_update: &mut dyn FnMut(StreamUpdate),
        ) -> Result<Turn, LouieApiError> {
            let mut shared = self.shared.lock().expect("fake state");
            shared.requests.push(request.clone());
            let (thread_id, records) = shared
                .turns
                .pop_front()
                .expect("every invoke must be scripted")?;

            for (position, record) in records.iter().enumerate() {
                on_update(StreamUpdate::BlockUpdated {
                    position,
                    replaced: false,
                    block: classify(record),
                });
            }
            Ok(Turn::new(thread_id, classify_all(&records)))
        }

        fn base_url(&self) -> String {
            "https://louie.example.com".to_owned()
        }
    }

    impl ArtifactFetcher for FakeTransport {
        fn fetch(&self, thread_id: &str, block_id: &str) -> Result<Table, LouieApiError> {
            self.shared
                .lock()
                .expect("fake state")
                .fetches
                .push((thread_id.to_owned(), block_id.to_owned()));
            if block_id == "tbl1" {
                return Err(LouieApiError::decode(block_id, "fetch refused"));
            }
            Ok(Table::new(vec!["id".to_owned()], vec![vec![json!(block_id)]]))
        }
    }

    fn table(id: &str) -> Value {
        json!({"id": id, "type": "DfElement", "df_id": id})
    }

    fn text(id: &str, body: &str) -> Value {
        json!({"id": id, "type": "TextElement", "text": body})
    }

    fn cursor() -> (Cursor, FakeTransport) {
        let fake = FakeTransport::default();
        (Cursor::new(Box::new(fake.clone())), fake)
    }

    #[test]
    fn first_invoke_adopts_server_thread_and_continues_it() {
        let (mut cursor, fake) = cursor();
        fake.script(Some("D1"), vec![text("B1", "Hi there"), table("tbl2")]);
        fake.script(Some("D1"), vec![text("B1", "again")]);

        cursor.invoke("hello").expect("first turn");
        assert_eq!(cursor.thread_id(), Some("D1"));
        assert_eq!(cursor.latest_text(), Some("Hi there"));
        assert!(cursor.latest_table().expect("table").is_hydrated());
        assert_eq!(
            cursor.url().as_deref(),
            Some("https://louie.example.com/?dthread=D1")
        );

        cursor.invoke("and again").expect("second turn");
        let requests = fake.requests();
        assert_eq!(requests[0].thread_id, None);
        assert_eq!(requests[1].thread_id.as_deref(), Some("D1"));
    }

    #[test]
    fn call_overrides_win_over_session_settings() {
        let (cursor, fake) = cursor();
        let mut cursor = cursor.with_share_mode(ShareMode::Organization);
        fake.script(Some("D1"), vec![]);
        fake.script(Some("D1"), vec![]);

        cursor
            .invoke_with(
                "q",
                &InvokeOptions::new()
                    .with_traces(true)
                    .with_share_mode(ShareMode::Public),
            )
            .expect("override turn");
        cursor.invoke("q").expect("session turn");

        let requests = fake.requests();
        assert!(requests[0].traces);
        assert_eq!(requests[0].share_mode, ShareMode::Public);
        assert!(!requests[1].traces);
        assert_eq!(requests[1].share_mode, ShareMode::Organization);
    }

    #[test]
    fn all_accessors_are_scoped_to_one_turn() {
        let (mut cursor, fake) = cursor();
        fake.script(Some("D1"), vec![table("a1"), table("a2")]);
        fake.script(Some("D1"), vec![table("b1"), table("b2"), table("b3")]);

        cursor.invoke("first").expect("turn A");
        cursor.invoke("second").expect("turn B");

        assert_eq!(cursor.all_tables().len(), 3);
        assert_eq!(cursor.turn_at(-2).all_tables().len(), 2);
        assert_eq!(cursor.turn_at(0).all_tables().len(), 2);
    }

    #[test]
    fn latest_table_is_last_in_arrival_order() {
        let (mut cursor, fake) = cursor();
        fake.script(Some("D1"), vec![table("x"), table("y"), table("z")]);

        cursor.invoke("three tables").expect("turn");
        assert_eq!(
            cursor.latest_table().and_then(|table| table.fetch_key()),
            Some("z")
        );
    }

    #[test]
    fn negative_indexing_and_out_of_range_views() {
        let (mut cursor, fake) = cursor();
        for body in ["T1", "T2", "T3"] {
            fake.script(Some("D1"), vec![text("B", body)]);
            cursor.invoke(body).expect("turn");
        }

        assert_eq!(cursor.turn_at(-1).latest_text(), Some("T3"));
        assert_eq!(cursor.turn_at(-2).latest_text(), Some("T2"));
        assert_eq!(cursor.turn_at(-3).latest_text(), Some("T1"));
        let missing = cursor.turn_at(-10);
        assert!(missing.is_empty());
        assert!(missing.latest_text().is_none());
        assert!(missing.all_tables().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let (mut cursor, fake) = cursor();
        for index in 0..=HISTORY_CAPACITY {
            fake.script(Some("D1"), vec![text("B", &format!("turn {index}"))]);
            cursor.invoke("q").expect("turn");
        }

        assert_eq!(cursor.history().len(), HISTORY_CAPACITY);
        assert_eq!(cursor.turn_at(0).latest_text(), Some("turn 1"));
    }

    #[test]
    fn hydration_failure_keeps_turn() {
        let (mut cursor, fake) = cursor();
        fake.script(
            Some("D1"),
            vec![
                text("B1", "Hi"),
                json!({"id": "B2", "type": "DfElement", "df_id": "tbl1", "metadata": {"shape": [10, 2]}}),
            ],
        );

        cursor.invoke("q").expect("turn survives failed fetch");
        let table = cursor.latest_table().expect("table block");
        assert!(!table.is_hydrated());
        assert_eq!(table.advertised_shape(), Some((10, 2)));
        assert_eq!(fake.fetches(), vec![("D1".to_owned(), "tbl1".to_owned())]);
    }

    #[test]
    fn server_errors_are_data() {
        let (mut cursor, fake) = cursor();
        fake.script(
            Some("D1"),
            vec![json!({"id": "E", "type": "ExceptionElement", "message": "bad query"})],
        );

        cursor.invoke("q").expect("exceptions do not fail the turn");
        assert!(cursor.has_errors());
        assert_eq!(cursor.errors()[0].message, "bad query");
    }

    #[test]
    fn transport_failure_leaves_history_untouched() {
        let (mut cursor, fake) = cursor();
        fake.fail_next(LouieApiError::MissingCredentials("no token".to_owned()));

        assert!(cursor.invoke("q").is_err());
        assert!(cursor.history().is_empty());
        assert_eq!(cursor.thread_id(), None);
    }

    #[test]
    fn streaming_variant_stores_the_same_turn() {
        let (mut cursor, fake) = cursor();
        let records = vec![text("B1", "Hi"), table("t")];
        fake.script(Some("D1"), records.clone());
        fake.script(Some("D1"), records);

        let mut updates = 0;
        cursor
            .invoke_streaming("q", &InvokeOptions::default(), |_| updates += 1)
            .expect("streamed turn");
        cursor.invoke("q").expect("plain turn");

        assert_eq!(updates, 2);
        assert_eq!(cursor.turn_at(-1).turn(), cursor.turn_at(-2).turn());
    }

    #[test]
    fn display_summarizes_session() {
        let (mut cursor, fake) = cursor();
        assert_eq!(
            cursor.to_string(),
            "Louie cursor: thread <new>, 0 turn(s), share mode Private, traces off"
        );

        fake.script(Some("D1"), vec![text("B1", "Hi")]);
        cursor.invoke("q").expect("turn");
        assert!(cursor.to_string().contains("latest turn: 1 text, 0 table"));
    }
}
