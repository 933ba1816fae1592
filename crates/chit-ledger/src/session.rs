//! Runtime choice of policy and recorded session scripts.
//!
//! [`Session`] holds a ledger of any of the three kinds behind one type.
//! [`SessionScript`] is the JSON form of a session: the chits, the policy
//! with its target and rules, and the clicks to replay.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::chit::{ActionTag, Bin, Chit, ChitId, ChitState};
use crate::config::{FatigueRules, LedgerConfig, RestRules};
use crate::error::{LedgerResult, ScriptResult};
use crate::ledger::{ClickOutcome, Commit, Ledger};
use crate::policy::{Eligibility, FatiguePolicy, Policy, PolicyKind, RestPolicy, WoundPolicy};

/// The policy of a scripted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    /// Fatigue `target` asterisks.
    Fatigue {
        /// Asterisks to fatigue.
        target: u32,
        /// Caps and the wound-fatigued rule.
        #[serde(default)]
        rules: FatigueRules,
    },
    /// Spend `target` rest credits.
    Rest {
        /// Rest credits available.
        target: u32,
        /// Caller restrictions.
        #[serde(default)]
        rules: RestRules,
    },
    /// Take `target` wounds.
    Wound {
        /// Wounds to absorb.
        target: u32,
    },
}

impl PolicySpec {
    /// The session kind.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Fatigue { .. } => PolicyKind::Fatigue,
            Self::Rest { .. } => PolicyKind::Rest,
            Self::Wound { .. } => PolicyKind::Wound,
        }
    }

    /// The requested target.
    pub fn target(&self) -> u32 {
        match self {
            Self::Fatigue { target, .. } | Self::Rest { target, .. } | Self::Wound { target } => {
                *target
            }
        }
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Click a chit by id.
    Click(ChitId),
    /// Reset the session to its opening state.
    Reset,
}

/// What a replayed step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Result of a click.
    Click(ClickOutcome),
    /// The session was reset.
    Reset,
}

/// A recorded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Character the chits belong to.
    #[serde(default)]
    pub character: Option<String>,
    /// Ledger options.
    #[serde(default)]
    pub config: LedgerConfig,
    /// Policy, target and rules.
    pub policy: PolicySpec,
    /// The character's chits in their persisted states.
    pub chits: Vec<Chit>,
    /// Actions to replay, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Confirm an early exit if the session ends incomplete.
    #[serde(default)]
    pub force: bool,
}

/// A replayed script: the session after its steps and what each step did.
#[derive(Debug, Clone)]
pub struct Replay {
    /// Session state after the last step.
    pub session: Session,
    /// One outcome per step.
    pub outcomes: Vec<StepOutcome>,
}

impl SessionScript {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the script as pretty JSON.
    pub fn to_json(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Open the session described by the script, without replaying steps.
    pub fn start(&self) -> LedgerResult<Session> {
        Session::open(self.chits.clone(), &self.policy, self.config.clone())
    }

    /// Open the session and replay every step.
    pub fn replay(&self) -> ScriptResult<Replay> {
        let mut session = self.start()?;
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let outcome = match step {
                Step::Click(id) => StepOutcome::Click(session.click_chit(id)?),
                Step::Reset => {
                    session.reset();
                    StepOutcome::Reset
                }
            };
            outcomes.push(outcome);
        }
        Ok(Replay { session, outcomes })
    }

    /// A starter script for the given session kind.
    pub fn template(kind: PolicyKind) -> Self {
        let chits = vec![
            Chit::new("move-m4", ActionTag::Move, 1).named("MOVE M4*"),
            Chit::new("move-m3", ActionTag::Move, 2).named("MOVE M3**"),
            Chit::new("fight-h5", ActionTag::Fight, 2).named("FIGHT H5**"),
            Chit::new("fight-m4", ActionTag::FightAlert, 1).named("FIGHT M4*"),
            Chit::new("magic-iii", ActionTag::Magic, 1).named("MAGIC III4*"),
            Chit::new("any-l2", ActionTag::AnyEffort, 0).named("DUCK L2"),
        ];
        let (policy, chits) = match kind {
            PolicyKind::Fatigue => (
                PolicySpec::Fatigue {
                    target: 2,
                    rules: FatigueRules::default(),
                },
                chits,
            ),
            PolicyKind::Rest => (
                PolicySpec::Rest {
                    target: 2,
                    rules: RestRules::default(),
                },
                chits
                    .into_iter()
                    .enumerate()
                    .map(|(i, c)| match i % 3 {
                        0 => c.in_state(ChitState::Fatigued),
                        1 => c.in_state(ChitState::Wounded),
                        _ => c,
                    })
                    .collect(),
            ),
            PolicyKind::Wound => (PolicySpec::Wound { target: 1 }, chits),
        };
        Self {
            character: Some("Amazon".to_string()),
            config: LedgerConfig::default(),
            policy,
            chits,
            steps: Vec::new(),
            force: false,
        }
    }
}

/// A ledger of any session kind.
#[derive(Debug, Clone)]
pub enum Session {
    /// A fatigue session.
    Fatigue(Ledger<FatiguePolicy>),
    /// A rest session.
    Rest(Ledger<RestPolicy>),
    /// A wound session.
    Wound(Ledger<WoundPolicy>),
}

macro_rules! each {
    ($session:expr, $ledger:ident => $body:expr) => {
        match $session {
            Session::Fatigue($ledger) => $body,
            Session::Rest($ledger) => $body,
            Session::Wound($ledger) => $body,
        }
    };
}

impl Session {
    /// Open a session of the kind `spec` describes.
    pub fn open(chits: Vec<Chit>, spec: &PolicySpec, config: LedgerConfig) -> LedgerResult<Self> {
        Ok(match spec {
            PolicySpec::Fatigue { target, rules } => Self::Fatigue(Ledger::new(
                chits,
                *target,
                FatiguePolicy::new(rules.clone()),
                config,
            )?),
            PolicySpec::Rest { target, rules } => Self::Rest(Ledger::new(
                chits,
                *target,
                RestPolicy::new(rules.clone()),
                config,
            )?),
            PolicySpec::Wound { target } => {
                Self::Wound(Ledger::new(chits, *target, WoundPolicy, config)?)
            }
        })
    }

    /// The session kind.
    pub fn kind(&self) -> PolicyKind {
        each!(self, l => l.policy().kind())
    }

    /// Units still to pay or spend.
    pub fn count(&self) -> i32 {
        each!(self, l => l.count())
    }

    /// Forgiven overpayment so far.
    pub fn lost_asterisks(&self) -> u32 {
        each!(self, l => l.budget().lost_asterisks())
    }

    /// Human-readable budget.
    pub fn budget_summary(&self) -> String {
        each!(self, l => l.budget().to_string())
    }

    /// Most the chits can absorb, if bounded.
    pub fn capacity(&self) -> Option<i32> {
        each!(self, l => l.capacity())
    }

    /// The requested target was clamped.
    pub fn count_too_large(&self) -> bool {
        each!(self, l => l.count_too_large())
    }

    /// A chit has moved since opening or the last reset.
    pub fn is_modified(&self) -> bool {
        each!(self, l => l.is_modified())
    }

    /// The exit condition holds.
    pub fn is_complete(&self) -> bool {
        each!(self, l => l.is_complete())
    }

    /// Commit is possible without confirmation.
    pub fn can_commit(&self) -> bool {
        each!(self, l => l.can_commit())
    }

    /// Incomplete, but an early exit may be confirmed.
    pub fn needs_confirmation(&self) -> bool {
        each!(self, l => l.needs_confirmation())
    }

    /// Chits in a bin, in bin order.
    pub fn bin(&self, bin: Bin) -> Vec<&Chit> {
        each!(self, l => l.bin(bin).collect())
    }

    /// Alerted chits held outside the bins.
    pub fn held(&self) -> Vec<&Chit> {
        each!(self, l => l.held().collect())
    }

    /// Whether the chit at a position may be clicked.
    pub fn eligibility(&self, bin: Bin, position: usize) -> LedgerResult<Eligibility> {
        each!(self, l => l.eligibility(bin, position))
    }

    /// Every chit that may be clicked right now.
    pub fn eligible_chits(&self) -> Vec<(Bin, &Chit)> {
        each!(self, l => l.eligible_chits())
    }

    /// Click the chit at a position.
    pub fn click(&mut self, bin: Bin, position: usize) -> LedgerResult<ClickOutcome> {
        each!(self, l => l.click(bin, position))
    }

    /// Click a chit by id.
    pub fn click_chit(&mut self, id: &ChitId) -> LedgerResult<ClickOutcome> {
        each!(self, l => l.click_chit(id))
    }

    /// Restore the opening state.
    pub fn reset(&mut self) {
        each!(self, l => l.reset())
    }

    /// Check that the bins partition the chit set.
    pub fn check_invariant(&self) -> LedgerResult<()> {
        each!(self, l => l.check_invariant())
    }

    /// Commit the session; `force` confirms an early exit.
    pub fn commit(self, force: bool) -> LedgerResult<Commit> {
        each!(self, l => l.commit(force))
    }

    /// Abandon the session and return the chits as supplied.
    pub fn abort(self) -> Vec<Chit> {
        each!(self, l => l.abort())
    }
}
