//! Error types for the chit ledger.
//!
//! Game-rule violations (illegal clicks, overdrawn budgets) never surface
//! here; they are resolved by the active policy. These errors are caller
//! precondition failures.

use crate::chit::{Bin, ChitId};

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A bin position past the end of the bin was requested.
    #[error("position {position} out of range for {bin} bin of {len} chits")]
    IndexOutOfRange {
        /// The bin that was indexed.
        bin: Bin,
        /// The requested position.
        position: usize,
        /// Number of chits currently in the bin.
        len: usize,
    },

    /// A chit id is not part of this ledger.
    #[error("unknown chit: {0}")]
    UnknownChit(ChitId),

    /// Two chits were supplied with the same id.
    #[error("duplicate chit id: {0}")]
    DuplicateChit(ChitId),

    /// The session was committed before its exit condition held.
    #[error("session not complete: {0}")]
    NotComplete(String),

    /// The three bins no longer partition the chit set.
    #[error("bin invariant violated: {0}")]
    InvariantViolated(String),
}

/// Convenience result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised while loading or replaying a session script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("cannot read script: {0}")]
    Io(#[from] std::io::Error),

    /// The script is not valid JSON for the expected shape.
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// The script referenced a chit or position the ledger rejected.
    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

/// Convenience result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
