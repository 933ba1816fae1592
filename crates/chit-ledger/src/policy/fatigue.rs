//! Fatigue: pay a number of asterisks out of the Active bin.
//!
//! Each click on an Active chit pays its effort (color chits pay one) into
//! the Fatigued bin; effortless chits go straight to Wounded for one unit.
//! A payment may overshoot by one asterisk, after which a one-asterisk
//! fatigued chit must come back as change. When no change exists the
//! overshoot is forgiven and counted as lost.

use crate::budget::{Cap, FatigueBudget};
use crate::chit::{Bin, Chit};
use crate::classify::{CategorySet, Pool, categories};
use crate::config::FatigueRules;
use crate::ledger::BinView;

use super::{Eligibility, Policy, PolicyKind, Transition};

/// Fatigue session rules.
#[derive(Debug, Clone, Default)]
pub struct FatiguePolicy {
    rules: FatigueRules,
}

impl FatiguePolicy {
    /// Create a policy with the caller's rules.
    pub fn new(rules: FatigueRules) -> Self {
        Self { rules }
    }

    /// The caller's rules.
    pub fn rules(&self) -> &FatigueRules {
        &self.rules
    }

    /// Whether this Active chit can pay right now, before color priority.
    fn pays(&self, budget: &FatigueBudget, chit: &Chit) -> bool {
        if !budget.needs_to_fatigue() {
            return false;
        }
        let cats = categories(chit);
        let cost = effort_cost(chit, cats);
        budget.affords(cost.max(1)) && budget.charge_pool(cats, cost).is_some()
    }

    /// Whether any Fatigued chit could be returned as change against `budget`.
    fn can_make_change(budget: &FatigueBudget, bins: &BinView<'_>) -> bool {
        bins.iter(Bin::Fatigued)
            .any(|c| budget.accepts_change(categories(c), c.effort))
    }
}

/// Asterisks a chit pays when fatigued: one for color, its effort otherwise.
pub fn effort_cost(chit: &Chit, cats: CategorySet) -> i32 {
    if cats.is_color() {
        1
    } else {
        i32::try_from(chit.effort).unwrap_or(i32::MAX)
    }
}

impl Policy for FatiguePolicy {
    type Budget = FatigueBudget;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Fatigue
    }

    fn initial_budget(&self, target: i32) -> FatigueBudget {
        self.rules.budget(target)
    }

    // An upper bound; the ledger searches below it for a payable target.
    fn capacity(&self, bins: &BinView<'_>) -> Option<i32> {
        let open = self.rules.budget(i32::MAX);
        let mut free = 0i64;
        let mut capped = 0i64;
        let mut effort_bearing = 0i64;
        for chit in bins.iter(Bin::Active) {
            let cats = categories(chit);
            let cost = i64::from(effort_cost(chit, cats));
            let caps: Vec<Cap> = cats.pools().map(|p| open.cap(p)).collect();
            if !caps.iter().any(|c| c.is_open()) {
                continue;
            }
            if cost == 0 {
                free += 1;
                continue;
            }
            effort_bearing += 1;
            if caps.contains(&Cap::Unconstrained) {
                free += cost;
            } else {
                capped += cost;
            }
        }
        let room: i64 = Pool::ALL
            .into_iter()
            .map(|p| match open.cap(p) {
                Cap::Limited(v) => i64::from(v.max(0)),
                Cap::Unconstrained => 0,
            })
            .sum();
        let mut payable = free + capped.min(room);
        if self.rules.wound_fatigued {
            payable += effort_bearing + bins.len(Bin::Fatigued) as i64;
        }
        Some(i32::try_from(payable).unwrap_or(i32::MAX))
    }

    fn can_click_active(
        &self,
        budget: &FatigueBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        if !self.pays(budget, chit) {
            return Eligibility::Refused;
        }
        if !categories(chit).is_color() {
            return Eligibility::Allowed;
        }
        // Color chits wait until no effort-bearing chit can pay.
        let effort_chit_pays = bins.others(Bin::Active, chit).any(|c| {
            !categories(c).is_color() && c.effort > 0 && self.pays(budget, c)
        });
        Eligibility::when(!effort_chit_pays)
    }

    fn can_click_fatigued(
        &self,
        budget: &FatigueBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Eligibility {
        if budget.needs_to_make_change() {
            return Eligibility::when(budget.accepts_change(categories(chit), chit.effort));
        }
        if self.rules.wound_fatigued && budget.needs_to_fatigue() {
            let active_pays = bins
                .iter(Bin::Active)
                .filter(|c| c.effort > 0 || categories(c).is_color())
                .any(|c| self.can_click_active(budget, bins, c).is_allowed());
            return Eligibility::when(!active_pays);
        }
        Eligibility::Refused
    }

    fn can_click_wounded(
        &self,
        _budget: &FatigueBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Eligibility {
        Eligibility::Refused
    }

    fn active_click(
        &self,
        budget: FatigueBudget,
        bins: &BinView<'_>,
        chit: &Chit,
    ) -> Transition<FatigueBudget> {
        let cats = categories(chit);
        let cost = effort_cost(chit, cats);
        if cost == 0 {
            return Transition::new(Bin::Wounded, budget.wound_one());
        }
        let pool = budget.charge_pool(cats, cost);
        let charged = budget.charge(pool, cost);
        let change = Self::can_make_change(&charged, bins);
        Transition::new(Bin::Fatigued, charged.settle(change))
    }

    fn fatigued_click(
        &self,
        budget: FatigueBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<FatigueBudget> {
        if budget.needs_to_make_change() {
            Transition::new(Bin::Active, budget.make_change())
        } else {
            Transition::new(Bin::Wounded, budget.wound_one())
        }
    }

    fn wounded_click(
        &self,
        budget: FatigueBudget,
        _bins: &BinView<'_>,
        _chit: &Chit,
    ) -> Transition<FatigueBudget> {
        Transition::new(Bin::Wounded, budget)
    }

    fn is_complete(&self, budget: &FatigueBudget) -> bool {
        budget.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{Cap, ChangeType};
    use crate::chit::{ActionTag, ChitId, ChitState};
    use crate::config::LedgerConfig;
    use crate::ledger::{ClickOutcome, Ledger};

    fn ledger(chits: Vec<Chit>, target: u32, rules: FatigueRules) -> Ledger<FatiguePolicy> {
        Ledger::new(chits, target, FatiguePolicy::new(rules), LedgerConfig::default()).unwrap()
    }

    fn ids(ledger: &Ledger<FatiguePolicy>, bin: Bin) -> Vec<String> {
        ledger.bin(bin).map(|c| c.id.to_string()).collect()
    }

    fn click(ledger: &mut Ledger<FatiguePolicy>, id: &str) -> ClickOutcome {
        ledger.click_chit(&ChitId::new(id)).unwrap()
    }

    #[test]
    fn pays_three_asterisks_with_two_chits() {
        let mut l = ledger(
            vec![
                Chit::new("move1", ActionTag::Move, 1),
                Chit::new("fight2", ActionTag::Fight, 2),
                Chit::untagged("other0", 0),
            ],
            3,
            FatigueRules::default(),
        );
        click(&mut l, "fight2");
        assert_eq!(l.count(), 1);
        click(&mut l, "move1");
        assert_eq!(l.count(), 0);
        assert!(l.is_complete());
        assert_eq!(ids(&l, Bin::Fatigued), ["fight2", "move1"]);
        assert_eq!(ids(&l, Bin::Active), ["other0"]);
        assert!(ids(&l, Bin::Wounded).is_empty());
    }

    #[test]
    fn unpayable_overshoot_is_forgiven() {
        let mut l = ledger(
            vec![Chit::new("fight3", ActionTag::Fight, 3)],
            2,
            FatigueRules::default().with_fight_cap(3),
        );
        assert!(!l.count_too_large());
        click(&mut l, "fight3");
        let budget = l.budget();
        assert_eq!(budget.count, 0);
        assert_eq!(budget.lost_asterisks, 1);
        assert_eq!(budget.change, ChangeType::None);
        assert!(l.is_complete());
        assert_eq!(ids(&l, Bin::Fatigued), ["fight3"]);
    }

    #[test]
    fn overshoot_with_change_available() {
        let mut l = ledger(
            vec![
                Chit::new("fight2", ActionTag::Fight, 2),
                Chit::new("fight1", ActionTag::Fight, 1).in_state(ChitState::Fatigued),
                Chit::new("move1", ActionTag::Move, 1).in_state(ChitState::Fatigued),
            ],
            1,
            FatigueRules::default(),
        );
        click(&mut l, "fight2");
        assert_eq!(l.count(), -1);
        assert_eq!(l.budget().change, ChangeType::Fight);
        assert!(!l.is_complete());

        // Change must come from the pool that overshot.
        assert_eq!(click(&mut l, "move1"), ClickOutcome::Ignored);
        click(&mut l, "fight1");
        assert_eq!(l.count(), 0);
        assert_eq!(l.budget().change, ChangeType::None);
        assert!(l.is_complete());
        assert_eq!(ids(&l, Bin::Active), ["fight1"]);
    }

    #[test]
    fn cannot_dip_two_into_the_hole() {
        let mut l = ledger(
            vec![
                Chit::new("fight3", ActionTag::Fight, 3),
                Chit::new("move1", ActionTag::Move, 1),
            ],
            1,
            FatigueRules::default(),
        );
        assert_eq!(click(&mut l, "fight3"), ClickOutcome::Ignored);
        click(&mut l, "move1");
        assert!(l.is_complete());
    }

    #[test]
    fn closed_pool_refuses_chit() {
        let mut l = ledger(
            vec![
                Chit::new("move1", ActionTag::Move, 1),
                Chit::new("fight1", ActionTag::Fight, 1),
            ],
            1,
            FatigueRules::default().with_move_cap(0),
        );
        assert_eq!(click(&mut l, "move1"), ClickOutcome::Ignored);
        click(&mut l, "fight1");
        assert!(l.is_complete());
    }

    #[test]
    fn cap_overshoot_forgiven_back_onto_count() {
        let mut l = ledger(
            vec![
                Chit::new("move2", ActionTag::Move, 2),
                Chit::new("fight2", ActionTag::Fight, 2),
            ],
            3,
            FatigueRules::default().with_move_cap(1),
        );
        click(&mut l, "move2");
        let budget = l.budget();
        assert_eq!(budget.move_cap, Cap::Limited(0));
        assert_eq!(budget.lost_asterisks, 1);
        assert_eq!(budget.count, 2);
        click(&mut l, "fight2");
        assert!(l.is_complete());
    }

    #[test]
    fn any_effort_charges_first_open_pool() {
        let mut l = ledger(
            vec![Chit::new("any2", ActionTag::AnyEffort, 2)],
            2,
            FatigueRules::default().with_move_cap(0).with_fight_cap(2),
        );
        click(&mut l, "any2");
        assert_eq!(l.budget().move_cap, Cap::Limited(0));
        assert_eq!(l.budget().fight_cap, Cap::Limited(0));
        assert!(l.is_complete());
    }

    #[test]
    fn effortless_chit_goes_to_wounded() {
        let mut l = ledger(
            vec![
                Chit::new("move0", ActionTag::Move, 0),
                Chit::new("move1", ActionTag::Move, 1),
            ],
            2,
            FatigueRules::default(),
        );
        let outcome = click(&mut l, "move0");
        assert_eq!(
            outcome,
            ClickOutcome::Moved {
                chit: ChitId::new("move0"),
                from: Bin::Active,
                to: Bin::Wounded
            }
        );
        assert_eq!(l.count(), 1);
    }

    #[test]
    fn color_waits_for_effort_chits() {
        let mut l = ledger(
            vec![
                Chit::new("white", ActionTag::Color, 0),
                Chit::new("magic1", ActionTag::Magic, 1),
            ],
            2,
            FatigueRules::default(),
        );
        assert_eq!(click(&mut l, "white"), ClickOutcome::Ignored);
        click(&mut l, "magic1");
        assert_eq!(l.count(), 1);
        // Color pays one asterisk into Fatigued.
        let outcome = click(&mut l, "white");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Fatigued, .. }));
        assert!(l.is_complete());
    }

    #[test]
    fn wound_fatigued_only_when_nothing_active_pays() {
        let chits = vec![
            Chit::new("move1", ActionTag::Move, 1),
            Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued),
        ];
        let rules = FatigueRules::default().with_wound_fatigued(true);
        let mut l = ledger(chits, 2, rules);
        assert_eq!(click(&mut l, "fight2"), ClickOutcome::Ignored);
        click(&mut l, "move1");
        assert_eq!(l.count(), 1);
        // Fatigued chits become wound targets now; move1 is the newest.
        let outcome = click(&mut l, "fight2");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Wounded, .. }));
        assert!(l.is_complete());
    }

    #[test]
    fn wound_fatigued_needs_rule() {
        let chits = vec![Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued)];
        let mut l = ledger(chits, 1, FatigueRules::default());
        // Nothing active: capacity is zero, so the target is clamped.
        assert!(l.count_too_large());
        assert!(l.is_complete());
        assert_eq!(click(&mut l, "fight2"), ClickOutcome::Ignored);
    }

    #[test]
    fn capacity_bounded_by_caps() {
        let l = ledger(
            vec![
                Chit::new("move2", ActionTag::Move, 2),
                Chit::new("fight2", ActionTag::Fight, 2),
                Chit::new("magic2", ActionTag::Magic, 2),
            ],
            9,
            FatigueRules::default()
                .with_move_cap(1)
                .with_fight_cap(1)
                .with_magic_cap(1),
        );
        assert_eq!(l.capacity(), Some(3));
        assert_eq!(l.count(), 3);
        assert!(l.count_too_large());
    }

    #[test]
    fn completed_session_accepts_no_more_clicks() {
        let mut l = ledger(
            vec![
                Chit::new("move1", ActionTag::Move, 1),
                Chit::new("fight1", ActionTag::Fight, 1),
            ],
            1,
            FatigueRules::default(),
        );
        click(&mut l, "move1");
        assert!(l.is_complete());
        assert_eq!(click(&mut l, "fight1"), ClickOutcome::Ignored);
        assert_eq!(click(&mut l, "move1"), ClickOutcome::Ignored);
        assert!(l.eligible_chits().is_empty());
    }

    #[test]
    fn target_clamped_when_only_chit_dips_too_far() {
        let l = ledger(
            vec![Chit::new("fight3", ActionTag::Fight, 3)],
            1,
            FatigueRules::default(),
        );
        assert_eq!(l.capacity(), Some(3));
        assert!(l.count_too_large());
        assert_eq!(l.count(), 0);
        assert!(l.is_complete());
    }

    #[test]
    fn single_cap_bounds_capacity() {
        let mut l = ledger(
            vec![Chit::new("move2", ActionTag::Move, 2)],
            2,
            FatigueRules::default().with_move_cap(1),
        );
        assert_eq!(l.capacity(), Some(1));
        assert!(l.count_too_large());
        assert_eq!(l.count(), 1);
        click(&mut l, "move2");
        assert_eq!(l.budget().lost_asterisks, 1);
        assert!(l.is_complete());
    }

    #[test]
    fn dead_end_allows_confirmed_exit() {
        let mut l = ledger(
            vec![
                Chit::new("move1", ActionTag::Move, 1),
                Chit::new("fight3", ActionTag::Fight, 3),
            ],
            2,
            FatigueRules::default(),
        );
        assert!(!l.count_too_large());
        click(&mut l, "move1");
        assert_eq!(click(&mut l, "fight3"), ClickOutcome::Ignored);
        assert!(l.eligible_chits().is_empty());
        assert!(!l.is_complete());
        assert!(l.needs_confirmation());

        assert!(l.clone().commit(false).is_err());
        let commit = l.commit(true).unwrap();
        assert_eq!(commit.unused, 1);
    }

    #[test]
    fn unbounded_cap_does_not_overflow() {
        let rules = FatigueRules::default()
            .with_move_cap(u32::MAX)
            .with_fight_cap(1)
            .with_magic_cap(1);
        let l = ledger(
            vec![
                Chit::new("move1", ActionTag::Move, 1),
                Chit::new("fight1", ActionTag::Fight, 1),
                Chit::new("magic1", ActionTag::Magic, 1),
            ],
            3,
            rules,
        );
        assert_eq!(l.capacity(), Some(3));
        assert_eq!(l.count(), 3);
        assert!(!l.count_too_large());
    }

    #[test]
    fn effortless_active_chit_does_not_shield_fatigued() {
        let chits = vec![
            Chit::new("move0", ActionTag::Move, 0),
            Chit::new("fight2", ActionTag::Fight, 2).in_state(ChitState::Fatigued),
        ];
        let mut l = ledger(chits, 2, FatigueRules::default().with_wound_fatigued(true));
        let outcome = click(&mut l, "fight2");
        assert!(matches!(outcome, ClickOutcome::Moved { to: Bin::Wounded, .. }));
        click(&mut l, "move0");
        assert_eq!(l.count(), 0);
        assert!(l.is_complete());
    }
}
