use std::fmt;
use std::time::Duration;

use louie_api::ReconciledTurn;
use louie_elements::{Block, DiagnosticLine, ExceptionBlock, GraphBlock, TableBlock};

/// One request/response exchange. Blocks keep first-appearance order; the
/// typed views below are filters recomputed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub thread_id: Option<String>,
    pub blocks: Vec<Block>,
    pub lines_received: usize,
    pub elapsed: Duration,
}

impl Turn {
    pub fn new(thread_id: Option<String>, blocks: Vec<Block>) -> Self {
        Self {
            thread_id,
            blocks,
            lines_received: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn all_texts(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(Block::as_text)
            .map(|text| text.text.as_str())
            .collect()
    }

    pub fn latest_text(&self) -> Option<&str> {
        self.blocks
            .iter()
            .rev()
            .find_map(Block::as_text)
            .map(|text| text.text.as_str())
    }

    pub fn all_tables(&self) -> Vec<&TableBlock> {
        self.blocks.iter().filter_map(Block::as_table).collect()
    }

    pub fn latest_table(&self) -> Option<&TableBlock> {
        self.blocks.iter().rev().find_map(Block::as_table)
    }

    pub fn all_graphs(&self) -> Vec<&GraphBlock> {
        self.blocks.iter().filter_map(Block::as_graph).collect()
    }

    pub fn latest_graph(&self) -> Option<&GraphBlock> {
        self.blocks.iter().rev().find_map(Block::as_graph)
    }

    /// Server-reported failures. These are data, not transport errors.
    pub fn errors(&self) -> Vec<&ExceptionBlock> {
        self.blocks.iter().filter_map(Block::as_exception).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.blocks.iter().any(|block| block.as_exception().is_some())
    }

    pub fn diagnostics(&self) -> Vec<&DiagnosticLine> {
        self.blocks.iter().filter_map(Block::as_diagnostic).collect()
    }
}

impl From<ReconciledTurn> for Turn {
    fn from(turn: ReconciledTurn) -> Self {
        Self {
            thread_id: turn.thread_id,
            blocks: turn.blocks,
            lines_received: turn.lines_received,
            elapsed: turn.elapsed,
        }
    }
}

/// Read-only view over one turn of a history. A view over an out-of-range
/// index is empty: every accessor returns `None` or an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnView<'a> {
    turn: Option<&'a Turn>,
}

impl<'a> TurnView<'a> {
    pub fn new(turn: Option<&'a Turn>) -> Self {
        Self { turn }
    }

    pub fn empty() -> Self {
        Self { turn: None }
    }

    pub fn is_empty(&self) -> bool {
        self.turn.is_none()
    }

    pub fn turn(&self) -> Option<&'a Turn> {
        self.turn
    }

    pub fn thread_id(&self) -> Option<&'a str> {
        self.turn.and_then(|turn| turn.thread_id.as_deref())
    }

    pub fn blocks(&self) -> &'a [Block] {
        self.turn.map(Turn::blocks).unwrap_or(&[])
    }

    pub fn all_texts(&self) -> Vec<&'a str> {
        self.turn.map(Turn::all_texts).unwrap_or_default()
    }

    pub fn latest_text(&self) -> Option<&'a str> {
        self.turn.and_then(Turn::latest_text)
    }

    pub fn all_tables(&self) -> Vec<&'a TableBlock> {
        self.turn.map(Turn::all_tables).unwrap_or_default()
    }

    pub fn latest_table(&self) -> Option<&'a TableBlock> {
        self.turn.and_then(Turn::latest_table)
    }

    pub fn all_graphs(&self) -> Vec<&'a GraphBlock> {
        self.turn.map(Turn::all_graphs).unwrap_or_default()
    }

    pub fn latest_graph(&self) -> Option<&'a GraphBlock> {
        self.turn.and_then(Turn::latest_graph)
    }

    pub fn errors(&self) -> Vec<&'a ExceptionBlock> {
        self.turn.map(Turn::errors).unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.turn.is_some_and(Turn::has_errors)
    }

    pub fn diagnostics(&self) -> Vec<&'a DiagnosticLine> {
        self.turn.map(Turn::diagnostics).unwrap_or_default()
    }
}

impl fmt::Display for TurnView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(turn) = self.turn else {
            return f.write_str("<empty turn>");
        };
        write!(
            f,
            "turn: {} text, {} table, {} graph, {} error",
            turn.all_texts().len(),
            turn.all_tables().len(),
            turn.all_graphs().len(),
            turn.errors().len(),
        )?;
        if let Some(thread_id) = &turn.thread_id {
            write!(f, " (thread {thread_id})")?;
        }
        Ok(())
    }
}
