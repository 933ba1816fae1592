//! The ledger: three bins partitioning a character's chits.
//!
//! A [`Ledger`] is opened for one session (one fatigue, rest or wound
//! event). Every click is checked against the session's [`Policy`]; legal
//! clicks move one chit and replace the budget, illegal clicks change
//! nothing. The session ends with [`Ledger::commit`], which hands back the
//! final chit states and a [`ChangeLog`], or [`Ledger::abort`].

use std::collections::HashSet;

use serde::Serialize;

use crate::budget::Budget;
use crate::chit::{Bin, Chit, ChitId, ChitState};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::log::ChangeLog;
use crate::policy::{Eligibility, Policy, Transition};

/// Read-only view of the bins, handed to policies.
#[derive(Debug, Clone, Copy)]
pub struct BinView<'a> {
    chits: &'a [Chit],
    bins: &'a [Vec<usize>; 3],
}

impl<'a> BinView<'a> {
    /// Chits in a bin, in bin order.
    pub fn iter(self, bin: Bin) -> impl Iterator<Item = &'a Chit> {
        let chits = self.chits;
        self.bins[bin.slot()].iter().map(move |&i| &chits[i])
    }

    /// Chits in a bin other than `chit`.
    pub fn others(self, bin: Bin, chit: &'a Chit) -> impl Iterator<Item = &'a Chit> {
        self.iter(bin).filter(move |c| c.id != chit.id)
    }

    /// Number of chits in a bin.
    pub fn len(&self, bin: Bin) -> usize {
        self.bins[bin.slot()].len()
    }

    /// Returns true if the bin holds no chits.
    pub fn is_empty(&self, bin: Bin) -> bool {
        self.bins[bin.slot()].is_empty()
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    /// The chit moved between bins.
    Moved {
        /// The chit that moved.
        chit: ChitId,
        /// Bin it left.
        from: Bin,
        /// Bin it entered.
        to: Bin,
    },
    /// The click was illegal and nothing changed.
    Ignored,
    /// The click was refused by a caller rule; nothing changed.
    Blocked(String),
}

/// The result of committing a session.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    /// Every chit supplied at construction, in input order, with its final state.
    pub chits: Vec<Chit>,
    /// Chits that changed bin, grouped by destination.
    pub log: ChangeLog,
    /// Overpaid asterisks that were forgiven.
    pub lost_asterisks: u32,
    /// The requested target was clamped to what the chits could absorb.
    pub count_too_large: bool,
    /// Units left unpaid or unspent (non-zero only for a forced commit).
    pub unused: i32,
}

/// A chit ledger running one session under policy `P`.
#[derive(Debug, Clone)]
pub struct Ledger<P: Policy> {
    policy: P,
    config: LedgerConfig,
    chits: Vec<Chit>,
    tracked: usize,
    bins: [Vec<usize>; 3],
    initial_bins: [Vec<usize>; 3],
    budget: P::Budget,
    initial_budget: P::Budget,
    capacity: Option<i32>,
    count_too_large: bool,
    modified: bool,
}

impl<P: Policy> Ledger<P> {
    /// Open a session over `chits` with the given target.
    ///
    /// The target is clamped to the largest value at or below it that some
    /// sequence of clicks can pay off; clamping sets
    /// [`Ledger::count_too_large`]. Policies without a capacity never clamp.
    /// Alerted chits are left out unless the config includes them.
    pub fn new(
        chits: Vec<Chit>,
        target: u32,
        policy: P,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        let mut seen = HashSet::new();
        for chit in &chits {
            if !seen.insert(&chit.id) {
                return Err(LedgerError::DuplicateChit(chit.id.clone()));
            }
        }

        let mut bins: [Vec<usize>; 3] = Default::default();
        for (i, chit) in chits.iter().enumerate() {
            if chit.state == ChitState::Alerted && !config.include_alerted_chits {
                continue;
            }
            bins[chit.state.bin().slot()].push(i);
        }
        let tracked = bins.iter().map(Vec::len).sum();

        let (capacity, count) = match policy.capacity(&BinView {
            chits: &chits,
            bins: &bins,
        }) {
            Some(bound) => {
                let capacity = reachable_target(&policy, &chits, &bins, bound);
                let requested = i32::try_from(target).unwrap_or(i32::MAX);
                let count = if requested >= capacity {
                    capacity
                } else {
                    reachable_target(&policy, &chits, &bins, requested)
                };
                (Some(capacity), count)
            }
            None => (None, i32::try_from(target).unwrap_or(i32::MAX)),
        };
        let count_too_large = i64::from(count) < i64::from(target);
        if count_too_large {
            tracing::warn!(
                policy = %policy.kind(),
                requested = target,
                count,
                "target exceeds what the chits can absorb, clamping"
            );
        }
        let budget = policy.initial_budget(count);
        tracing::debug!(policy = %policy.kind(), chits = tracked, %budget, "ledger opened");

        Ok(Self {
            policy,
            config,
            chits,
            tracked,
            initial_bins: bins.clone(),
            bins,
            budget,
            initial_budget: budget,
            capacity,
            count_too_large,
            modified: false,
        })
    }

    /// The session's policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The session's config.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current budget.
    pub fn budget(&self) -> &P::Budget {
        &self.budget
    }

    /// Units still to pay or spend.
    pub fn count(&self) -> i32 {
        self.budget.count()
    }

    /// Most the chit set can absorb under this policy, if it is bounded.
    pub fn capacity(&self) -> Option<i32> {
        self.capacity
    }

    /// The requested target was clamped.
    pub fn count_too_large(&self) -> bool {
        self.count_too_large
    }

    /// A chit has moved since the ledger was opened or last reset.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Number of chits in the bins.
    pub fn len(&self) -> usize {
        self.tracked
    }

    /// Returns true if no chit is in any bin.
    pub fn is_empty(&self) -> bool {
        self.tracked == 0
    }

    /// Read-only view of the bins.
    pub fn view(&self) -> BinView<'_> {
        BinView {
            chits: &self.chits,
            bins: &self.bins,
        }
    }

    /// Chits in a bin, in bin order.
    pub fn bin(&self, bin: Bin) -> impl Iterator<Item = &Chit> {
        self.bins[bin.slot()].iter().map(move |&i| &self.chits[i])
    }

    /// Alerted chits held outside the bins.
    pub fn held(&self) -> impl Iterator<Item = &Chit> {
        self.chits
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.bins.iter().any(|b| b.contains(i)))
            .map(|(_, c)| c)
    }

    /// The chit at a position in a bin.
    pub fn chit_at(&self, bin: Bin, position: usize) -> LedgerResult<&Chit> {
        let index = self.index_at(bin, position)?;
        Ok(&self.chits[index])
    }

    /// Bin and position of a chit.
    pub fn position(&self, id: &ChitId) -> LedgerResult<(Bin, usize)> {
        Bin::ALL
            .into_iter()
            .find_map(|bin| {
                self.bins[bin.slot()]
                    .iter()
                    .position(|&i| self.chits[i].id == *id)
                    .map(|pos| (bin, pos))
            })
            .ok_or_else(|| LedgerError::UnknownChit(id.clone()))
    }

    /// Whether the chit at a position may be clicked.
    pub fn eligibility(&self, bin: Bin, position: usize) -> LedgerResult<Eligibility> {
        let index = self.index_at(bin, position)?;
        Ok(self.eligibility_of(bin, index))
    }

    /// Returns true if the chit at a position may be clicked.
    pub fn can_click(&self, bin: Bin, position: usize) -> LedgerResult<bool> {
        Ok(self.eligibility(bin, position)?.is_allowed())
    }

    /// Every chit that may be clicked right now, with its bin.
    pub fn eligible_chits(&self) -> Vec<(Bin, &Chit)> {
        Bin::ALL
            .into_iter()
            .flat_map(move |bin| {
                self.bins[bin.slot()]
                    .iter()
                    .filter(move |&&i| self.eligibility_of(bin, i).is_allowed())
                    .map(move |&i| (bin, &self.chits[i]))
            })
            .collect()
    }

    /// Click the chit at a position in a bin.
    ///
    /// Illegal clicks return [`ClickOutcome::Ignored`] or
    /// [`ClickOutcome::Blocked`] and leave the ledger untouched. Only an
    /// out-of-range position is an error.
    pub fn click(&mut self, bin: Bin, position: usize) -> LedgerResult<ClickOutcome> {
        let index = self.index_at(bin, position)?;
        let chit_id = self.chits[index].id.clone();

        let transition = match self.eligibility_of(bin, index) {
            Eligibility::Allowed => self.transition_of(bin, index),
            Eligibility::Refused => {
                tracing::debug!(chit = %chit_id, %bin, "click ignored");
                return Ok(ClickOutcome::Ignored);
            }
            Eligibility::Blocked(reason) => {
                tracing::debug!(chit = %chit_id, %bin, %reason, "click blocked");
                return Ok(ClickOutcome::Blocked(reason));
            }
        };

        self.move_chit(index, bin, transition.to)?;
        let lost_before = self.budget.lost_asterisks();
        self.budget = transition.budget;
        if self.budget.lost_asterisks() > lost_before {
            tracing::warn!(
                chit = %chit_id,
                lost = self.budget.lost_asterisks() - lost_before,
                "no change available, overpayment forgiven"
            );
        }
        tracing::debug!(chit = %chit_id, from = %bin, to = %transition.to, budget = %self.budget, "chit moved");

        Ok(ClickOutcome::Moved {
            chit: chit_id,
            from: bin,
            to: transition.to,
        })
    }

    /// Click a chit by id, wherever it currently is.
    pub fn click_chit(&mut self, id: &ChitId) -> LedgerResult<ClickOutcome> {
        let (bin, position) = self.position(id)?;
        self.click(bin, position)
    }

    /// Discard every move and restore the opening bins and budget.
    pub fn reset(&mut self) {
        self.bins = self.initial_bins.clone();
        self.budget = self.initial_budget;
        self.modified = false;
        tracing::info!(policy = %self.policy.kind(), "ledger reset");
    }

    /// The session's exit condition holds.
    pub fn is_complete(&self) -> bool {
        self.policy.is_complete(&self.budget)
    }

    /// The session may be committed without confirmation.
    pub fn can_commit(&self) -> bool {
        self.is_complete()
    }

    /// The session is incomplete but the caller may confirm an early exit.
    ///
    /// Besides the policy's own early exit, a session with no legal click
    /// left can always be ended this way.
    pub fn needs_confirmation(&self) -> bool {
        !self.is_complete()
            && (self.policy.allows_forced_commit(&self.budget) || self.eligible_chits().is_empty())
    }

    /// Check that the bins partition the tracked chits.
    pub fn check_invariant(&self) -> LedgerResult<()> {
        let total: usize = self.bins.iter().map(Vec::len).sum();
        if total != self.tracked {
            return Err(LedgerError::InvariantViolated(format!(
                "{total} chits in bins, expected {}",
                self.tracked
            )));
        }
        let mut seen = HashSet::new();
        for &i in self.bins.iter().flatten() {
            if !seen.insert(i) {
                return Err(LedgerError::InvariantViolated(format!(
                    "chit {} is in more than one bin",
                    self.chits[i].id
                )));
            }
        }
        Ok(())
    }

    /// End the session, writing final bins back to chit states.
    ///
    /// `force` confirms an early exit where the policy allows one.
    pub fn commit(self, force: bool) -> LedgerResult<Commit> {
        let confirmed = force && self.needs_confirmation();
        if !self.can_commit() && !confirmed {
            return Err(LedgerError::NotComplete(self.budget.to_string()));
        }

        let mut log = ChangeLog::new();
        for bin in Bin::ALL {
            for &i in &self.bins[bin.slot()] {
                let chit = &self.chits[i];
                if chit.state.bin() != bin {
                    log.record(bin, chit.label());
                }
            }
        }

        let mut chits = self.chits;
        for bin in Bin::ALL {
            for &i in &self.bins[bin.slot()] {
                if chits[i].state.bin() != bin {
                    chits[i].state = bin.state();
                }
            }
        }

        let lost_asterisks = self.budget.lost_asterisks();
        if lost_asterisks > 0 {
            tracing::warn!(lost_asterisks, "session forgave overpaid asterisks");
        }
        tracing::info!(
            policy = %self.policy.kind(),
            moved = log.len(),
            forced = confirmed,
            "session committed"
        );

        Ok(Commit {
            chits,
            log,
            lost_asterisks,
            count_too_large: self.count_too_large,
            unused: self.budget.count(),
        })
    }

    /// Abandon the session and return the chits exactly as supplied.
    pub fn abort(self) -> Vec<Chit> {
        tracing::info!(policy = %self.policy.kind(), "session aborted");
        self.chits
    }

    fn index_at(&self, bin: Bin, position: usize) -> LedgerResult<usize> {
        let slots = &self.bins[bin.slot()];
        slots
            .get(position)
            .copied()
            .ok_or(LedgerError::IndexOutOfRange {
                bin,
                position,
                len: slots.len(),
            })
    }

    fn eligibility_of(&self, bin: Bin, index: usize) -> Eligibility {
        eligibility_in(&self.policy, &self.budget, &self.view(), bin, &self.chits[index])
    }

    fn transition_of(&self, bin: Bin, index: usize) -> Transition<P::Budget> {
        transition_in(&self.policy, self.budget, &self.view(), bin, &self.chits[index])
    }

    fn move_chit(&mut self, index: usize, from: Bin, to: Bin) -> LedgerResult<()> {
        let source = &mut self.bins[from.slot()];
        let position = source
            .iter()
            .position(|&i| i == index)
            .ok_or_else(|| LedgerError::UnknownChit(self.chits[index].id.clone()))?;
        source.remove(position);
        self.bins[to.slot()].push(index);
        self.modified = true;
        self.check_invariant()
    }
}

fn eligibility_in<P: Policy>(
    policy: &P,
    budget: &P::Budget,
    view: &BinView<'_>,
    bin: Bin,
    chit: &Chit,
) -> Eligibility {
    match bin {
        Bin::Active => policy.can_click_active(budget, view, chit),
        Bin::Fatigued => policy.can_click_fatigued(budget, view, chit),
        Bin::Wounded => policy.can_click_wounded(budget, view, chit),
    }
}

fn transition_in<P: Policy>(
    policy: &P,
    budget: P::Budget,
    view: &BinView<'_>,
    bin: Bin,
    chit: &Chit,
) -> Transition<P::Budget> {
    match bin {
        Bin::Active => policy.active_click(budget, view, chit),
        Bin::Fatigued => policy.fatigued_click(budget, view, chit),
        Bin::Wounded => policy.wounded_click(budget, view, chit),
    }
}

/// States the opening search may visit before it settles on a target.
const SEARCH_LIMIT: usize = 50_000;

/// Largest target in `0..=upper` that some click sequence completes.
fn reachable_target<P: Policy>(
    policy: &P,
    chits: &[Chit],
    bins: &[Vec<usize>; 3],
    upper: i32,
) -> i32 {
    let mut visits = SEARCH_LIMIT;
    let mut target = upper.max(0);
    while target > 0
        && !completable(policy, chits, bins, policy.initial_budget(target), &mut visits)
    {
        target -= 1;
    }
    target
}

/// Depth-first search over legal clicks for a completed state.
///
/// Bins are kept sorted so states reached by different click orders
/// compare equal. Eligibility never depends on order within a bin.
fn completable<P: Policy>(
    policy: &P,
    chits: &[Chit],
    bins: &[Vec<usize>; 3],
    budget: P::Budget,
    visits: &mut usize,
) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![(bins.clone(), budget)];
    while let Some((bins, budget)) = stack.pop() {
        if policy.is_complete(&budget) {
            return true;
        }
        if !seen.insert((bins.clone(), budget)) {
            continue;
        }
        if *visits == 0 {
            tracing::debug!(%budget, "completion search exhausted, assuming payable");
            return true;
        }
        *visits -= 1;
        let view = BinView {
            chits,
            bins: &bins,
        };
        for from in Bin::ALL {
            for &i in &bins[from.slot()] {
                if !eligibility_in(policy, &budget, &view, from, &chits[i]).is_allowed() {
                    continue;
                }
                let transition = transition_in(policy, budget, &view, from, &chits[i]);
                let mut next = bins.clone();
                next[from.slot()].retain(|&j| j != i);
                let dest = &mut next[transition.to.slot()];
                let at = dest.partition_point(|&j| j < i);
                dest.insert(at, i);
                stack.push((next, transition.budget));
            }
        }
    }
    false
}
