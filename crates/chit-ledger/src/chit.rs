//! Action chits, their persisted tags and lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a chit within one character's chit set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChitId(pub String);

impl ChitId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An action tag as stored on the character's chit attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    /// A movement chit.
    Move,
    /// A fight chit.
    Fight,
    /// A fight chit that can be alerted.
    FightAlert,
    /// A magic chit.
    Magic,
    /// A flying chit (counts as movement).
    Fly,
    /// A color chit holding magical color.
    Color,
    /// A chit usable for any kind of effort.
    AnyEffort,
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Move => "MOVE",
            Self::Fight => "FIGHT",
            Self::FightAlert => "FIGHT (alert)",
            Self::Magic => "MAGIC",
            Self::Fly => "FLY",
            Self::Color => "COLOR",
            Self::AnyEffort => "ANY",
        };
        f.write_str(s)
    }
}

/// Persisted lifecycle state of a chit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChitState {
    /// Ready for use.
    Active,
    /// Active and turned to its alerted side.
    Alerted,
    /// Spent; recovers by resting.
    Fatigued,
    /// Damaged; recovers by resting at double cost.
    Wounded,
}

impl ChitState {
    /// The ledger bin a chit in this state starts in.
    pub fn bin(self) -> Bin {
        match self {
            Self::Active | Self::Alerted => Bin::Active,
            Self::Fatigued => Bin::Fatigued,
            Self::Wounded => Bin::Wounded,
        }
    }
}

impl fmt::Display for ChitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Alerted => "alerted",
            Self::Fatigued => "fatigued",
            Self::Wounded => "wounded",
        };
        f.write_str(s)
    }
}

/// One of the three bins a ledger partitions its chits into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bin {
    /// Chits ready for use.
    Active,
    /// Spent chits.
    Fatigued,
    /// Damaged chits.
    Wounded,
}

impl Bin {
    /// All bins in display order.
    pub const ALL: [Bin; 3] = [Bin::Active, Bin::Fatigued, Bin::Wounded];

    /// The persisted state a chit takes when it ends a session in this bin.
    pub fn state(self) -> ChitState {
        match self {
            Self::Active => ChitState::Active,
            Self::Fatigued => ChitState::Fatigued,
            Self::Wounded => ChitState::Wounded,
        }
    }

    /// Array slot used by the ledger's bin storage.
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Active => 0,
            Self::Fatigued => 1,
            Self::Wounded => 2,
        }
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "Active",
            Self::Fatigued => "Fatigued",
            Self::Wounded => "Wounded",
        };
        f.write_str(s)
    }
}

/// An action chit: its tags, effort weight and current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chit {
    /// Unique id within the chit set.
    pub id: ChitId,
    /// Display name (e.g. "MOVE M4**").
    #[serde(default)]
    pub name: String,
    /// Persisted action tags.
    pub tags: Vec<ActionTag>,
    /// Effort weight in asterisks.
    #[serde(default)]
    pub effort: u32,
    /// Current lifecycle state.
    #[serde(default = "default_state")]
    pub state: ChitState,
}

fn default_state() -> ChitState {
    ChitState::Active
}

impl Chit {
    /// Create an active chit with a single tag. The name defaults to the id.
    pub fn new(id: impl Into<String>, tag: ActionTag, effort: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: ChitId(id),
            tags: vec![tag],
            effort,
            state: ChitState::Active,
        }
    }

    /// Create an active chit with no action tags.
    pub fn untagged(id: impl Into<String>, effort: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: ChitId(id),
            tags: Vec::new(),
            effort,
            state: ChitState::Active,
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add another action tag.
    pub fn with_tag(mut self, tag: ActionTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Set the lifecycle state.
    pub fn in_state(mut self, state: ChitState) -> Self {
        self.state = state;
        self
    }

    /// Returns true if the chit carries the given tag.
    pub fn has_tag(&self, tag: ActionTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Display label, falling back to the id when no name was given.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl fmt::Display for Chit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}*)", self.label(), self.effort)
    }
}
