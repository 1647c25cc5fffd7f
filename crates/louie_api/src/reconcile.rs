//! Last-write-wins reconciliation of streamed block updates.
//!
//! The server resends the same logical block under the same `id` as its
//! content grows. The reconciler keeps only the latest full record per id
//! while preserving the order in which distinct ids first appeared.

use indexmap::IndexMap;
use serde_json::Value;

/// Keys that carry the conversation thread identifier.
pub const THREAD_ID_KEYS: [&str; 3] = ["dthread_id", "thread_id", "thread"];
pub const PAYLOAD_KEY: &str = "payload";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BlockKey {
    Id(String),
    /// Payloads without an id keep their arrival slot and are never merged.
    Anonymous(usize),
}

/// Outcome of ingesting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// Thread identifier recorded (or re-confirmed).
    Thread { id: String },
    /// Thread identifier that conflicts with the one already recorded.
    ConflictingThread { id: String },
    /// Block stored at `position`; `replaced` when the id was already known.
    Block { position: usize, replaced: bool },
    /// Line was not valid JSON.
    Malformed,
    /// Valid JSON carrying neither a thread id nor a payload object.
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct StreamReconciler {
    thread_id: Option<String>,
    blocks: IndexMap<BlockKey, Value>,
    anonymous: usize,
}

impl StreamReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one raw stream line. Never fails: malformed lines are skipped.
    pub fn ingest(&mut self, line: &str) -> Ingest {
        let line = line.trim();
        if line.is_empty() {
            return Ingest::Ignored;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(record) => self.ingest_record(record),
            Err(error) => {
                tracing::debug!(%error, "skipping malformed stream line");
                Ingest::Malformed
            }
        }
    }

    /// Ingest one already-parsed record.
    pub fn ingest_record(&mut self, mut record: Value) -> Ingest {
        if let Some(id) = thread_id_of(&record) {
            return self.record_thread(id);
        }

        let Some(payload) = record
            .get_mut(PAYLOAD_KEY)
            .filter(|payload| payload.is_object())
            .map(Value::take)
        else {
            return Ingest::Ignored;
        };

        let key = match payload_id(&payload) {
            Some(id) => BlockKey::Id(id),
            None => {
                self.anonymous += 1;
                BlockKey::Anonymous(self.anonymous)
            }
        };

        // `insert` keeps the original slot for an existing key.
        let (position, previous) = self.blocks.insert_full(key, payload);
        Ingest::Block {
            position,
            replaced: previous.is_some(),
        }
    }

    fn record_thread(&mut self, id: String) -> Ingest {
        match &self.thread_id {
            Some(existing) if *existing != id => {
                tracing::warn!(
                    existing = %existing,
                    received = %id,
                    "ignoring conflicting thread id in stream"
                );
                Ingest::ConflictingThread { id }
            }
            _ => {
                self.thread_id = Some(id.clone());
                Ingest::Thread { id }
            }
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Latest record stored at `position`.
    pub fn block_at(&self, position: usize) -> Option<&Value> {
        self.blocks.get_index(position).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Thread id and the latest record per block, in first-appearance order.
    /// Does not consume state; repeated calls return the same snapshot.
    pub fn finalize(&self) -> (Option<String>, Vec<Value>) {
        (self.thread_id.clone(), self.blocks.values().cloned().collect())
    }
}

fn thread_id_of(record: &Value) -> Option<String> {
    THREAD_ID_KEYS.iter().find_map(|key| {
        record
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned)
    })
}

fn payload_id(payload: &Value) -> Option<String> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
}
