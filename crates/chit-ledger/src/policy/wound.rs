//! Wound: move a number of chits into the Wounded bin.
//!
//! Wounds are counted per chit, not per asterisk. Color chits are taken
//! last among Active chits, and Fatigued chits only once nothing is left
//! Active.

use crate::budget::WoundBudget;
use crate::chit::{Bin, Chit};
use crate::classify::categories;
use crate::ledger::BinView;

use super::{Eligibility, Policy, PolicyKind, Transition};

/// Wound session rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct WoundPolicy;

impl Policy for WoundPolicy {
    type Budget = WoundBudget;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Wound
    }

    fn initial_budget(&self, target: i32) -> WoundBudget {
        WoundBudget::new(target)
    }

    fn capacity(&self, bins: &BinView<'_>) -> Option<i32> {
        let woundable = bins.len(Bin::Active) + bins.len(Bin::Fatigued);
        Some(i32::try_from(woundable).unwrap_or(i32::MAX))
    }

    fn can_click_active(
        &self,
        budget: &WoundBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        if budget.count <= 0 {
            return Eligibility::Refused;
        }
        if !categories(chit).is_color() {
            return Eligibility::Allowed;
        }
        Eligibility::when(
            bins.others(Bin::Active, chit)
                .all(|c| categories(c).is_color()),
        )
    }

    fn can_click_fatigued(
        &self,
        budget: &WoundBudget,
        bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Eligibility {
        Eligibility::when(budget.count > 0 && bins.is_empty(Bin::Active))
    }

    fn can_click_wounded(
        &self,
        _budget: &WoundBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Eligibility {
        Eligibility::Refused
    }

    fn active_click(
        &self,
        budget: WoundBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<WoundBudget> {
        Transition::new(Bin::Wounded, budget.wound())
    }

    fn fatigued_click(
        &self,
        budget: WoundBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<WoundBudget> {
        Transition::new(Bin::Wounded, budget.wound())
    }

    fn wounded_click(
        &self,
        budget: WoundBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<WoundBudget> {
        Transition::new(Bin::Wounded, budget)
    }

    fn is_complete(&self, budget: &WoundBudget) -> bool {
        budget.count == 0
    }
}
