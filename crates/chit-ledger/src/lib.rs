//! Action-chit bookkeeping for fatigue, rest and wound sessions.
//!
//! A character's action chits sit in three bins: Active, Fatigued and
//! Wounded. A [`Ledger`] runs one session over those bins under a
//! [`Policy`]: [`FatiguePolicy`] pays asterisks of effort, [`RestPolicy`]
//! spends rest credits, [`WoundPolicy`] absorbs wounds. Illegal clicks are
//! ignored; the session commits to final chit states and a [`ChangeLog`].
//!
//! [`Session`] wraps the three ledgers for callers that pick the policy at
//! runtime, and [`SessionScript`] replays a recorded session from JSON.

pub mod budget;
pub mod chit;
pub mod classify;
pub mod config;
pub mod error;
pub mod ledger;
pub mod log;
pub mod policy;
pub mod session;

pub use budget::{Budget, Cap, ChangeType, FatigueBudget, RestBudget, WoundBudget};
pub use chit::{ActionTag, Bin, Chit, ChitId, ChitState};
pub use classify::{Category, CategorySet, Pool, categories};
pub use config::{FatigueRules, LedgerConfig, RestRules};
pub use error::{LedgerError, LedgerResult, ScriptError, ScriptResult};
pub use ledger::{BinView, ClickOutcome, Commit, Ledger};
pub use log::ChangeLog;
pub use policy::{Eligibility, FatiguePolicy, Policy, PolicyKind, RestPolicy, WoundPolicy};
pub use session::{PolicySpec, Replay, Session, SessionScript, Step, StepOutcome};
