//! Typed content blocks for Louie conversation turns.
//!
//! A streamed turn arrives as loosely-shaped JSON records. This crate is the
//! single place that decides what each record *is*: [`classify`] maps a raw
//! record to exactly one [`Block`] variant, and every consumer filters blocks
//! through the variant accessors on [`Block`] rather than inspecting tags.

pub mod block;
pub mod classify;
pub mod table;

pub use block::{
    Block, BlockKind, CodeBlock, DiagnosticLevel, DiagnosticLine, ExceptionBlock, GraphBlock,
    TableBlock, TextBlock, UnknownBlock,
};
pub use classify::{classify, classify_all, display_text};
pub use table::Table;
