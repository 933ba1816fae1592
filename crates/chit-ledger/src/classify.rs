//! Chit classification into functional categories.
//!
//! [`categories`] is the only place that interprets a chit's action tags.
//! Policies consult the returned [`CategorySet`] instead of inspecting tags.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chit::{ActionTag, Chit};

/// A functional category a chit can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Pays for movement.
    Move,
    /// Pays for fighting.
    Fight,
    /// Pays for magic.
    Magic,
    /// Flying chit.
    Fly,
    /// Color chit.
    Color,
    /// Usable as any kind of effort.
    AnyEffort,
    /// Matches none of Move, Fight or Magic.
    Other,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Category; 7] = [
        Category::Move,
        Category::Fight,
        Category::Magic,
        Category::Fly,
        Category::Color,
        Category::AnyEffort,
        Category::Other,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::Move => 1,
            Self::Fight => 1 << 1,
            Self::Magic => 1 << 2,
            Self::Fly => 1 << 3,
            Self::Color => 1 << 4,
            Self::AnyEffort => 1 << 5,
            Self::Other => 1 << 6,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Move => "move",
            Self::Fight => "fight",
            Self::Magic => "magic",
            Self::Fly => "fly",
            Self::Color => "color",
            Self::AnyEffort => "any",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// One of the three spendable effort pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    /// Movement effort.
    Move,
    /// Fight effort.
    Fight,
    /// Magic effort.
    Magic,
}

impl Pool {
    /// Pools in the order they are tried when charging a chit.
    pub const ALL: [Pool; 3] = [Pool::Move, Pool::Fight, Pool::Magic];

    /// The category that makes a chit eligible for this pool.
    pub fn category(self) -> Category {
        match self {
            Self::Move => Category::Move,
            Self::Fight => Category::Fight,
            Self::Magic => Category::Magic,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.category().fmt(f)
    }
}

/// A set of categories, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(u8);

impl CategorySet {
    /// The empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Add a category.
    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    /// Returns true if the category is in the set.
    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    /// Returns true if no category is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Categories in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Effort pools the chit may be charged to, in charging order.
    pub fn pools(self) -> impl Iterator<Item = Pool> {
        Pool::ALL
            .into_iter()
            .filter(move |p| self.contains(p.category()))
    }

    /// Returns true if the set is a color chit's.
    pub fn is_color(self) -> bool {
        self.contains(Category::Color)
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::empty();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Compute the categories a chit satisfies.
pub fn categories(chit: &Chit) -> CategorySet {
    let mut set = CategorySet::empty();
    for tag in &chit.tags {
        match tag {
            ActionTag::Move => set.insert(Category::Move),
            ActionTag::Fly => {
                set.insert(Category::Move);
                set.insert(Category::Fly);
            }
            ActionTag::Fight | ActionTag::FightAlert => set.insert(Category::Fight),
            ActionTag::Magic => set.insert(Category::Magic),
            ActionTag::Color => {
                set.insert(Category::Magic);
                set.insert(Category::Color);
            }
            ActionTag::AnyEffort => {
                set.insert(Category::Move);
                set.insert(Category::Fight);
                set.insert(Category::Magic);
                set.insert(Category::AnyEffort);
            }
        }
    }
    if set.pools().next().is_none() {
        set.insert(Category::Other);
    }
    set
}
