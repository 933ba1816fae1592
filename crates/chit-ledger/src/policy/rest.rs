//! Rest: spend rest credits to move chits back toward Active.

use crate::budget::RestBudget;
use crate::chit::{Bin, Chit};
use crate::config::RestRules;
use crate::ledger::BinView;

use super::{Eligibility, Policy, PolicyKind, Transition};

/// Rest session rules.
#[derive(Debug, Clone, Default)]
pub struct RestPolicy {
    rules: RestRules,
}

impl RestPolicy {
    /// Create a policy with the caller's rules.
    pub fn new(rules: RestRules) -> Self {
        Self { rules }
    }

    /// The caller's rules.
    pub fn rules(&self) -> &RestRules {
        &self.rules
    }

    fn can_make_change(bins: &BinView<'_>) -> bool {
        bins.iter(Bin::Active).any(|c| c.effort == 1)
    }
}

/// Credits needed to rest a wounded chit, and the bin it lands in.
///
/// Effortless chits heal straight to Active for one credit. Effort chits
/// cost double their effort and only reach Fatigued.
pub fn wounded_rest(chit: &Chit) -> (i32, Bin) {
    if chit.effort == 0 {
        (1, Bin::Active)
    } else {
        (effort(chit).saturating_mul(2), Bin::Fatigued)
    }
}

fn effort(chit: &Chit) -> i32 {
    i32::try_from(chit.effort).unwrap_or(i32::MAX)
}

impl Policy for RestPolicy {
    type Budget = RestBudget;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Rest
    }

    fn initial_budget(&self, target: i32) -> RestBudget {
        RestBudget::new(target)
    }

    // Unused rest is the caller's choice to confirm, so the target stands.
    fn capacity(&self, _bins: &BinView<'_>) -> Option<i32> {
        None
    }

    fn can_click_active(
        &self,
        budget: &RestBudget,
        _bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        Eligibility::when(budget.needs_to_make_change() && chit.effort == 1)
    }

    fn can_click_fatigued(
        &self,
        budget: &RestBudget,
        _bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        if budget.count <= 0 {
            return Eligibility::Refused;
        }
        if self.rules.effort_blocked && chit.effort > 0 {
            return Eligibility::Blocked(format!(
                "{} cannot be rested while active effort chits are forbidden",
                chit.label()
            ));
        }
        Eligibility::when(budget.affords(effort(chit)))
    }

    fn can_click_wounded(
        &self,
        budget: &RestBudget,
        _bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        let (cost, _) = wounded_rest(chit);
        Eligibility::when(budget.affords(cost))
    }

    fn active_click(
        &self,
        budget: RestBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<RestBudget> {
        Transition::new(Bin::Fatigued, budget.make_change())
    }

    fn fatigued_click(
        &self,
        budget: RestBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<RestBudget> {
        let change = Self::can_make_change(bins);
        Transition::new(Bin::Active, budget.spend(effort(chit), change))
    }

    fn wounded_click(
        &self,
        budget: RestBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<RestBudget> {
        let (cost, to) = wounded_rest(chit);
        let change = Self::can_make_change(bins);
        Transition::new(to, budget.spend(cost, change))
    }

    fn is_complete(&self, budget: &RestBudget) -> bool {
        budget.count == 0
    }

    fn allows_forced_commit(&self, budget: &RestBudget) -> bool {
        budget.count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chit::{ActionTag, ChitId, ChitState};
    use crate::config::LedgerConfig;
    use crate::error::LedgerError;
    use crate::ledger::{ClickOutcome, Ledger};

    fn ledger(chits: Vec<Chit>, target: u32, rules: RestRules) -> Ledger<RestPolicy> {
        Ledger::new(chits, target, RestPolicy::new(rules), LedgerConfig::default()).unwrap()
    }

    fn click(ledger: &mut Ledger<RestPolicy>, id: &str) -> ClickOutcome {
        ledger.click_chit(&ChitId::new(id)).unwrap()
    }

    #[test]
    fn effortless_wound_heals_to_active() {
        let chits = vec![Chit::new("move0", ActionTag::Move, 0).in_state(ChitState::Wounded)];
        let mut l = ledger(chits, 2, RestRules::default());
        assert!(!l.count_too_large());
        let outcome = click(&mut l, "move0");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Active, .. }));
        assert_eq!(l.count(), 1);
        assert!(l.eligible_chits().is_empty());
        assert!(!l.is_complete());
        assert!(l.needs_confirmation());

        let l2 = l.clone();
        assert!(matches!(l2.commit(false), Err(LedgerError::NotComplete(_))));
        let commit = l.commit(true).unwrap();
        assert_eq!(commit.unused, 1);
        assert_eq!(commit.chits[0].state, ChitState::Active);
    }

    #[test]
    fn wounded_effort_chit_costs_double_and_reaches_fatigued() {
        let chits = vec![Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Wounded)];
        let mut l = ledger(chits, 4, RestRules::default());
        let outcome = click(&mut l, "fight2");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Fatigued, .. }));
        assert_eq!(l.count(), 0);
        assert!(l.is_complete());
    }

    #[test]
    fn fatigued_chit_costs_its_effort() {
        let chits = vec![
            Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued),
            Chit::new("move1", ActionTag::Move, 1).in_state(ChitState::Fatigued),
        ];
        let mut l = ledger(chits, 3, RestRules::default());
        click(&mut l, "fight2");
        assert_eq!(l.count(), 1);
        click(&mut l, "move1");
        assert_eq!(l.count(), 0);
        assert_eq!(l.bin(Bin::Active).count(), 2);
    }

    #[test]
    fn overshoot_then_make_change() {
        let chits = vec![
            Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued),
            Chit::new("move1", ActionTag::Move, 1),
        ];
        let mut l = ledger(chits, 1, RestRules::default());
        click(&mut l, "fight2");
        assert_eq!(l.count(), -1);
        assert!(!l.is_complete());
        assert!(!l.needs_confirmation());
        // fight2 is active now but only one-asterisk chits make change.
        assert_eq!(click(&mut l, "fight2"), ClickOutcome::Ignored);
        let outcome = click(&mut l, "move1");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Fatigued, .. }));
        assert_eq!(l.count(), 0);
        assert!(l.is_complete());
    }

    #[test]
    fn overshoot_without_change_is_forgiven() {
        let chits = vec![Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued)];
        let mut l = ledger(chits, 1, RestRules::default());
        click(&mut l, "fight2");
        assert_eq!(l.count(), 0);
        assert_eq!(l.budget().lost_asterisks, 1);
        assert!(l.is_complete());
    }

    #[test]
    fn blocked_effort_is_reported() {
        let chits = vec![
            Chit::new("fight1", ActionTag::Fight, 1).in_state(ChitState::Fatigued),
            Chit::new("move0", ActionTag::Move, 0).in_state(ChitState::Wounded),
        ];
        let mut l = ledger(chits, 2, RestRules::default().with_effort_blocked(true));
        let outcome = click(&mut l, "fight1");
        assert!(matches!(outcome, ClickOutcome::Blocked(_)));
        assert!(!l.is_modified());
        click(&mut l, "move0");
        assert_eq!(l.count(), 1);
    }

    #[test]
    fn too_expensive_wound_refused() {
        let chits = vec![Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Wounded)];
        let mut l = ledger(chits, 2, RestRules::default());
        assert_eq!(click(&mut l, "fight2"), ClickOutcome::Ignored);
        assert_eq!(l.count(), 2);
    }

    #[test]
    fn wounded_rest_costs() {
        assert_eq!(wounded_rest(&Chit::new("a", ActionTag::Move, 0)), (1, Bin::Active));
        assert_eq!(wounded_rest(&Chit::new("b", ActionTag::Move, 2)), (4, Bin::Fatigued));
    }
}
