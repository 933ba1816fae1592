//! Change log handed to the game log when a session commits.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chit::Bin;

/// Chits that changed bin during a session, grouped by destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLog {
    moved: BTreeMap<Bin, Vec<String>>,
}

impl ChangeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a chit ended the session in `bin`.
    pub fn record(&mut self, bin: Bin, label: &str) {
        self.moved.entry(bin).or_default().push(label.to_string());
    }

    /// Labels of chits that moved into `bin`, in the order they arrived.
    pub fn moved_to(&self, bin: Bin) -> &[String] {
        self.moved.get(&bin).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of chits that changed bin.
    pub fn len(&self) -> usize {
        self.moved.values().map(Vec::len).sum()
    }

    /// Whether no chit changed bin.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable lines, one per destination bin.
    pub fn lines(&self) -> Vec<String> {
        self.moved
            .iter()
            .filter(|(_, labels)| !labels.is_empty())
            .map(|(bin, labels)| format!("{bin}: {}", labels.join(", ")))
            .collect()
    }
}

impl fmt::Display for ChangeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No chits changed.");
        }
        write!(f, "{}", self.lines().join("\n"))
    }
}
