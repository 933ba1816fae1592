//! Configuration for ledger sessions.

use serde::{Deserialize, Serialize};

use crate::budget::{Cap, FatigueBudget};

/// Options shared by every ledger session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Fold alerted chits into the Active bin. When false they are held
    /// outside the ledger and written back untouched.
    #[serde(default)]
    pub include_alerted_chits: bool,
}

impl LedgerConfig {
    /// Include or exclude alerted chits.
    pub fn with_alerted_chits(mut self, include: bool) -> Self {
        self.include_alerted_chits = include;
        self
    }
}

/// Caller-supplied conditions for a fatigue session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueRules {
    /// Most move asterisks that may be fatigued (`None` = unconstrained).
    #[serde(default)]
    pub move_cap: Option<u32>,
    /// Most fight asterisks that may be fatigued.
    #[serde(default)]
    pub fight_cap: Option<u32>,
    /// Most magic asterisks that may be fatigued.
    #[serde(default)]
    pub magic_cap: Option<u32>,
    /// Fatigued chits may be wounded once nothing active can pay.
    #[serde(default)]
    pub wound_fatigued: bool,
}

impl FatigueRules {
    /// Limit move asterisks.
    pub fn with_move_cap(mut self, cap: u32) -> Self {
        self.move_cap = Some(cap);
        self
    }

    /// Limit fight asterisks.
    pub fn with_fight_cap(mut self, cap: u32) -> Self {
        self.fight_cap = Some(cap);
        self
    }

    /// Limit magic asterisks.
    pub fn with_magic_cap(mut self, cap: u32) -> Self {
        self.magic_cap = Some(cap);
        self
    }

    /// Allow wounding fatigued chits when no active chit can pay.
    pub fn with_wound_fatigued(mut self, allow: bool) -> Self {
        self.wound_fatigued = allow;
        self
    }

    /// Initial budget for `count` asterisks under these caps.
    pub fn budget(&self, count: i32) -> FatigueBudget {
        FatigueBudget::new(
            count,
            Cap::from(self.move_cap),
            Cap::from(self.fight_cap),
            Cap::from(self.magic_cap),
        )
    }
}

/// Caller-supplied conditions for a rest session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestRules {
    /// The character may not hold active effort chits, so fatigued effort
    /// chits cannot be rested.
    #[serde(default)]
    pub effort_blocked: bool,
}

impl RestRules {
    /// Forbid resting fatigued effort chits.
    pub fn with_effort_blocked(mut self, blocked: bool) -> Self {
        self.effort_blocked = blocked;
        self
    }
}
