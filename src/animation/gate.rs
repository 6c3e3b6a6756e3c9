use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a completion gate owned by a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(pub u64);

impl GateId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate_{}", self.0)
    }
}

/// Counts completions of N parallel animations and opens exactly once.
///
/// A gate expecting zero completions is open from the start.
///
/// ```
/// use tarot_deck::animation::ParallelCompletionGate;
///
/// let mut gate = ParallelCompletionGate::new(2);
/// assert!(!gate.complete_one());
/// assert!(gate.complete_one());
/// assert!(!gate.complete_one());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelCompletionGate {
    expected: usize,
    completed: usize,
    fired: bool,
}

impl ParallelCompletionGate {
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            completed: 0,
            fired: expected == 0,
        }
    }

    /// Record one completion. Returns `true` only for the completion that
    /// opens the gate.
    pub fn complete_one(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.completed += 1;
        if self.completed >= self.expected {
            self.fired = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.expected.saturating_sub(self.completed)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.fired
    }
}
