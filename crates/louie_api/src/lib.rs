//! Transport for the Louie chat service.
//!
//! Owns request construction, credential headers, the streamed response
//! lifecycle (line framing, timeouts, idle completion), last-write-wins block
//! reconciliation, and the dataframe export endpoint. Block classification
//! lives in `louie_elements`; history and cursor state live in the `louie`
//! crate.

pub mod arrow;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod lines;
pub mod reconcile;
pub mod request;
pub mod retry;
pub mod session;
pub mod url;

pub use arrow::decode_arrow_table;
pub use auth::{StaticToken, TokenProvider};
pub use client::{LouieApiClient, ReconciledTurn, StreamUpdate, Thread};
pub use config::LouieApiConfig;
pub use error::LouieApiError;
pub use lines::LineBuffer;
pub use reconcile::{Ingest, StreamReconciler};
pub use request::{ChatRequest, ShareMode};
pub use session::{drive_stream, drive_stream_since, StreamEnd, StreamPolicy, StreamStats};
pub use url::normalize_base_url;
