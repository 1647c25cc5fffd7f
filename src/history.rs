use std::collections::VecDeque;

use crate::turn::{Turn, TurnView};

/// Turns kept per cursor; older turns are evicted first.
pub const HISTORY_CAPACITY: usize = 100;

/// Bounded, append-only sequence of turns.
#[derive(Debug, Clone)]
pub struct History {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity is raised to one so the latest turn is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append, evicting the oldest turn when full. Returns the evicted turn.
    pub fn push(&mut self, turn: Turn) -> Option<Turn> {
        let evicted = if self.turns.len() >= self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        self.turns.push_back(turn);
        evicted
    }

    /// Negative offsets count from the end (`-1` is the most recent);
    /// non-negative offsets count from the oldest retained turn.
    pub fn get(&self, index: isize) -> Option<&Turn> {
        let resolved = if index < 0 {
            self.turns.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        self.turns.get(resolved)
    }

    pub fn latest(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn view(&self, index: isize) -> TurnView<'_> {
        TurnView::new(self.get(index))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator {
        self.turns.iter()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
