//! Budget values for fatigue, rest and wound sessions.
//!
//! Budgets are small `Copy` values. Every transition takes a budget by value
//! and returns the next one, so no counter is ever updated in place. The two
//! overflow rules are exposed as [`dip_allowed`] and [`forgive_shortfall`].

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::classify::{CategorySet, Pool};

/// Returns true if paying `cost` out of `available` leaves at most one
/// unit in the hole.
pub fn dip_allowed(available: i32, cost: i32) -> bool {
    available - cost >= -1
}

/// Clamp a negative value to zero. Returns the clamped value and the
/// shortfall that was forgiven.
pub fn forgive_shortfall(value: i32) -> (i32, u32) {
    if value < 0 {
        (0, value.unsigned_abs())
    } else {
        (value, 0)
    }
}

/// Common read access to any session budget.
pub trait Budget: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// Units still to be paid (fatigue, wound) or spent (rest).
    fn count(&self) -> i32;

    /// Units forgiven because change could not be made.
    fn lost_asterisks(&self) -> u32 {
        0
    }
}

/// A per-pool spending cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cap {
    /// No limit on this pool.
    Unconstrained,
    /// At most this many asterisks may still be charged.
    Limited(i32),
}

impl Cap {
    /// Returns true if the pool can still be charged at all.
    pub fn is_open(self) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Limited(v) => v > 0,
        }
    }

    /// Returns true if the pool has been charged past zero.
    pub fn is_overdrawn(self) -> bool {
        matches!(self, Self::Limited(v) if v < 0)
    }

    /// Returns true if the pool is open and `cost` dips at most one into the hole.
    pub fn accepts(self, cost: i32) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Limited(v) => v > 0 && dip_allowed(v, cost),
        }
    }

    fn adjust(self, delta: i32) -> Self {
        match self {
            Self::Unconstrained => Self::Unconstrained,
            Self::Limited(v) => Self::Limited(v + delta),
        }
    }
}

impl From<Option<u32>> for Cap {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(v) => Self::Limited(i32::try_from(v).unwrap_or(i32::MAX)),
            None => Self::Unconstrained,
        }
    }
}

impl fmt::Display for Cap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("-"),
            Self::Limited(v) => write!(f, "{v}"),
        }
    }
}

/// Which pool may still be played once the fatigue count has gone negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// No restriction.
    #[default]
    None,
    /// Change must come from a move chit.
    Move,
    /// Change must come from a fight chit.
    Fight,
}

impl ChangeType {
    fn for_pool(pool: Option<Pool>) -> Self {
        match pool {
            Some(Pool::Move) => Self::Move,
            Some(Pool::Fight) => Self::Fight,
            Some(Pool::Magic) | None => Self::None,
        }
    }

    fn pool(self) -> Option<Pool> {
        match self {
            Self::None => None,
            Self::Move => Some(Pool::Move),
            Self::Fight => Some(Pool::Fight),
        }
    }
}

/// Budget of a fatigue session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FatigueBudget {
    /// Asterisks still to fatigue; -1 while change is owed.
    pub count: i32,
    /// Remaining move allowance.
    pub move_cap: Cap,
    /// Remaining fight allowance.
    pub fight_cap: Cap,
    /// Remaining magic allowance.
    pub magic_cap: Cap,
    /// Overpaid asterisks that could not be returned as change.
    pub lost_asterisks: u32,
    /// Pool restriction while change is owed.
    pub change: ChangeType,
    /// Pool charged by the most recent spend.
    #[serde(skip)]
    charged: Option<Pool>,
}

impl FatigueBudget {
    /// Create a budget for `count` asterisks under the given caps.
    pub fn new(count: i32, move_cap: Cap, fight_cap: Cap, magic_cap: Cap) -> Self {
        Self {
            count,
            move_cap,
            fight_cap,
            magic_cap,
            lost_asterisks: 0,
            change: ChangeType::None,
            charged: None,
        }
    }

    /// The cap of one pool.
    pub fn cap(&self, pool: Pool) -> Cap {
        match pool {
            Pool::Move => self.move_cap,
            Pool::Fight => self.fight_cap,
            Pool::Magic => self.magic_cap,
        }
    }

    fn with_cap(mut self, pool: Pool, cap: Cap) -> Self {
        match pool {
            Pool::Move => self.move_cap = cap,
            Pool::Fight => self.fight_cap = cap,
            Pool::Magic => self.magic_cap = cap,
        }
        self
    }

    fn overdrawn_pool(&self) -> Option<Pool> {
        Pool::ALL.into_iter().find(|p| self.cap(*p).is_overdrawn())
    }

    /// More asterisks must be fatigued and no pool is overdrawn.
    pub fn needs_to_fatigue(&self) -> bool {
        self.count > 0 && self.overdrawn_pool().is_none()
    }

    /// The last spend overpaid and change is owed.
    pub fn needs_to_make_change(&self) -> bool {
        self.count == -1 || self.overdrawn_pool().is_some()
    }

    /// Neither fatigue nor change is owed.
    pub fn is_complete(&self) -> bool {
        !self.needs_to_fatigue() && !self.needs_to_make_change()
    }

    /// The first pool, in charging order, that accepts a chit of `cost`.
    pub fn charge_pool(&self, categories: CategorySet, cost: i32) -> Option<Pool> {
        categories.pools().find(|p| self.cap(*p).accepts(cost))
    }

    /// Returns true if spending `cost` keeps the count at most one in the hole.
    pub fn affords(&self, cost: i32) -> bool {
        dip_allowed(self.count, cost)
    }

    /// Pay `cost` from the count and, when given, from one pool.
    ///
    /// An overshot count marks which pool change must come from. The result
    /// may be overdrawn; call [`FatigueBudget::settle`] once it is known
    /// whether change can be made.
    pub fn charge(mut self, pool: Option<Pool>, cost: i32) -> Self {
        self.count -= cost;
        self.charged = pool;
        if self.count < 0 {
            self.change = ChangeType::for_pool(pool);
        }
        match pool {
            Some(p) => {
                let cap = self.cap(p).adjust(-cost);
                self.with_cap(p, cap)
            }
            None => self,
        }
    }

    /// Resolve an overdrawn budget after a charge.
    ///
    /// With change available the budget stays overdrawn until change is
    /// made. Without it, every shortfall is forgiven into `lost_asterisks`.
    pub fn settle(self, can_make_change: bool) -> Self {
        if can_make_change { self } else { self.forgive() }
    }

    fn forgive(mut self) -> Self {
        for pool in Pool::ALL {
            if let Cap::Limited(v) = self.cap(pool) {
                let (clamped, shortfall) = forgive_shortfall(v);
                if shortfall > 0 {
                    self = self.with_cap(pool, Cap::Limited(clamped));
                    self.lost_asterisks += shortfall;
                    self.count += shortfall as i32;
                }
            }
        }
        let (count, shortfall) = forgive_shortfall(self.count);
        self.count = count;
        self.lost_asterisks += shortfall;
        self.change = ChangeType::None;
        self
    }

    /// The pool a change chit must belong to, if any.
    pub fn change_pool(&self) -> Option<Pool> {
        self.overdrawn_pool().or_else(|| self.change.pool())
    }

    /// Returns true if a chit with these categories and effort can be
    /// returned as change.
    pub fn accepts_change(&self, categories: CategorySet, effort: u32) -> bool {
        effort == 1
            && self
                .change_pool()
                .is_none_or(|p| categories.contains(p.category()))
    }

    /// Return one asterisk of change.
    pub fn make_change(mut self) -> Self {
        let refund = self.overdrawn_pool().or(self.charged);
        self.count += 1;
        if let Some(p) = refund {
            let cap = self.cap(p).adjust(1);
            self = self.with_cap(p, cap);
        }
        if !self.needs_to_make_change() {
            self.change = ChangeType::None;
        }
        self
    }

    /// Pay one unit by wounding a chit.
    pub fn wound_one(mut self) -> Self {
        self.count -= 1;
        self
    }
}

impl Budget for FatigueBudget {
    fn count(&self) -> i32 {
        self.count
    }

    fn lost_asterisks(&self) -> u32 {
        self.lost_asterisks
    }
}

impl fmt::Display for FatigueBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fatigue {} (move {}, fight {}, magic {})",
            self.count, self.move_cap, self.fight_cap, self.magic_cap
        )?;
        if self.lost_asterisks > 0 {
            write!(f, ", {} lost", self.lost_asterisks)?;
        }
        Ok(())
    }
}

/// Budget of a rest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestBudget {
    /// Rest credits still to spend; -1 while change is owed.
    pub count: i32,
    /// Overpaid credits that could not be returned as change.
    pub lost_asterisks: u32,
}

impl RestBudget {
    /// Create a budget of `count` rest credits.
    pub fn new(count: i32) -> Self {
        Self {
            count,
            lost_asterisks: 0,
        }
    }

    /// Returns true if spending `cost` keeps the count at most one in the hole.
    pub fn affords(&self, cost: i32) -> bool {
        self.count > 0 && dip_allowed(self.count, cost)
    }

    /// Spend `cost` credits, forgiving the overdraft when no change exists.
    pub fn spend(mut self, cost: i32, can_make_change: bool) -> Self {
        self.count -= cost;
        if !can_make_change {
            let (count, shortfall) = forgive_shortfall(self.count);
            self.count = count;
            self.lost_asterisks += shortfall;
        }
        self
    }

    /// Return one credit of change.
    pub fn make_change(mut self) -> Self {
        self.count += 1;
        self
    }

    /// Change is owed.
    pub fn needs_to_make_change(&self) -> bool {
        self.count == -1
    }
}

impl Budget for RestBudget {
    fn count(&self) -> i32 {
        self.count
    }

    fn lost_asterisks(&self) -> u32 {
        self.lost_asterisks
    }
}

impl fmt::Display for RestBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rest {}", self.count)?;
        if self.lost_asterisks > 0 {
            write!(f, ", {} lost", self.lost_asterisks)?;
        }
        Ok(())
    }
}

/// Budget of a wound session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WoundBudget {
    /// Chits still to wound.
    pub count: i32,
}

impl WoundBudget {
    /// Create a budget of `count` wounds.
    pub fn new(count: i32) -> Self {
        Self { count }
    }

    /// Absorb one wound.
    pub fn wound(self) -> Self {
        Self {
            count: self.count - 1,
        }
    }
}

impl Budget for WoundBudget {
    fn count(&self) -> i32 {
        self.count
    }
}

impl fmt::Display for WoundBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wounds {}", self.count)
    }
}
