//! Transition rules plugged into a [`Ledger`](crate::ledger::Ledger).
//!
//! A [`Policy`] decides which chits may be clicked in each bin and what a
//! click does: the destination bin and the next budget. The ledger owns the
//! bins and applies the move; the policy never mutates anything.

pub mod fatigue;
pub mod rest;
pub mod wound;

pub use fatigue::FatiguePolicy;
pub use rest::RestPolicy;
pub use wound::WoundPolicy;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::chit::{Bin, Chit};
use crate::ledger::BinView;

/// Which kind of session a policy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Spend effort.
    Fatigue,
    /// Recover effort.
    Rest,
    /// Absorb damage.
    Wound,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fatigue => "fatigue",
            Self::Rest => "rest",
            Self::Wound => "wound",
        };
        f.write_str(s)
    }
}

/// Whether a chit may be clicked right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The click is legal.
    Allowed,
    /// The click is illegal and will be ignored.
    Refused,
    /// The click is illegal because of a caller rule; the reason is
    /// reported back.
    Blocked(String),
}

impl Eligibility {
    /// Returns true for [`Eligibility::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub(crate) fn when(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Refused }
    }
}

/// Result of a legal click: where the chit goes and the budget after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<B> {
    /// Destination bin.
    pub to: Bin,
    /// Budget after the move.
    pub budget: B,
}

impl<B> Transition<B> {
    /// Move to `to` with the given budget.
    pub fn new(to: Bin, budget: B) -> Self {
        Self { to, budget }
    }
}

/// Rules for one kind of session.
///
/// The `*_click` methods are only called after the matching `can_click_*`
/// returned [`Eligibility::Allowed`] for the same budget and bins.
pub trait Policy {
    /// Budget carried through the session.
    type Budget: Budget;

    /// The session kind.
    fn kind(&self) -> PolicyKind;

    /// Budget for a fresh session with the given target.
    fn initial_budget(&self, target: i32) -> Self::Budget;

    /// Most the chit set can absorb, or `None` if the target is never clamped.
    fn capacity(&self, bins: &BinView<'_>) -> Option<i32>;

    /// May this Active chit be clicked?
    fn can_click_active(
        &self,
        budget: &Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility;

    /// May this Fatigued chit be clicked?
    fn can_click_fatigued(
        &self,
        budget: &Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility;

    /// May this Wounded chit be clicked?
    fn can_click_wounded(
        &self,
        budget: &Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility;

    /// Click an Active chit.
    fn active_click(
        &self,
        budget: Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<Self::Budget>;

    /// Click a Fatigued chit.
    fn fatigued_click(
        &self,
        budget: Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<Self::Budget>;

    /// Click a Wounded chit.
    fn wounded_click(
        &self,
        budget: Self::Budget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<Self::Budget>;

    /// The session's exit condition holds.
    fn is_complete(&self, budget: &Self::Budget) -> bool;

    /// The caller may confirm an early exit from an incomplete session.
    fn allows_forced_commit(&self, _budget: &Self::Budget) -> bool {
        false
    }
}
