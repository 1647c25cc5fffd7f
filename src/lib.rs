//! Blocking client for the Louie conversational data-analysis service.
//!
//! A [`Cursor`] sends natural-language queries, continues the server-assigned
//! thread implicitly, and keeps a bounded history of turns. Each turn is the
//! reconciled, classified content of one streamed response, with dataframe
//! blocks hydrated out of band.
//!
//! ```no_run
//! use louie::Cursor;
//!
//! # fn main() -> Result<(), louie::LouieApiError> {
//! let mut cursor = Cursor::from_env()?;
//! cursor.invoke("top 10 source IPs by bytes")?;
//! if let Some(table) = cursor.latest_table().and_then(|block| block.table()) {
//!     println!("{:?}", table.shape());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod cursor;
pub mod global;
pub mod history;
pub mod hydrate;
pub mod logging;
pub mod turn;

pub use client::{LouieClient, Transport};
pub use config::EnvConfig;
pub use cursor::{Cursor, InvokeOptions};
pub use global::{install_global, reset_global, with_global};
pub use history::{History, HISTORY_CAPACITY};
pub use hydrate::{hydrate_tables, ArtifactFetcher, HydrationReport};
pub use logging::init_logging;
pub use turn::{Turn, TurnView};

pub use louie_api::{
    ChatRequest, LouieApiConfig, LouieApiError, ShareMode, StaticToken, StreamUpdate, Thread,
    TokenProvider,
};
pub use louie_elements::{Block, BlockKind, Table};
