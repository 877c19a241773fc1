//! Targeting and play legality.
//!
//! A card or hero power declares [`Requirements`]: whether it needs a
//! target and which filters a target must pass. [`TargetSelector`] turns
//! those into an explicit, ordered list of legal targets for the current
//! state, and validates a declared target against it.
//!
//! ## Ordering
//!
//! Candidates are enumerated player by player: the hero first, then the
//! minions of that player's field left to right. The order is stable, so
//! drivers choosing "a random legal target" stay deterministic.
//!
//! ## Purity
//!
//! Selection only reads the state. Commands validate before mutating and
//! the interpreter re-validates a deferred target right before the action
//! runs, because earlier steps of the same command may have changed
//! eligibility.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tags::Tag;
use crate::error::IllegalAction;

/// Whether an action takes a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetNeed {
    /// No target allowed.
    #[default]
    None,
    /// Cannot be played without a legal target.
    Required,
    /// Takes a target when one exists, otherwise plays without.
    IfAvailable,
}

/// Predicate a target must satisfy.
///
/// `Friendly` and `Enemy` are relative to the acting player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    Minion,
    Hero,
    Friendly,
    Enemy,
    Damaged,
    Undamaged,
    /// Excludes the acting entity itself.
    NotSelf,
}

/// A card's or power's target requirements.
///
/// ```
/// use tavern::effects::{Requirements, TargetFilter, TargetNeed};
///
/// let execute = Requirements::minion_target()
///     .with_filter(TargetFilter::Enemy)
///     .with_filter(TargetFilter::Damaged);
///
/// assert_eq!(execute.need, TargetNeed::Required);
/// assert_eq!(execute.filters.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub need: TargetNeed,
    pub filters: SmallVec<[TargetFilter; 3]>,
}

impl Requirements {
    /// No target.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Any character.
    #[must_use]
    pub fn any_target() -> Self {
        Self {
            need: TargetNeed::Required,
            filters: SmallVec::new(),
        }
    }

    /// Any minion.
    #[must_use]
    pub fn minion_target() -> Self {
        Self::any_target().with_filter(TargetFilter::Minion)
    }

    /// Builder: only target when a legal target exists.
    #[must_use]
    pub fn if_available(mut self) -> Self {
        self.need = TargetNeed::IfAvailable;
        self
    }

    /// Builder: add a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether these requirements ever take a target.
    #[must_use]
    pub fn takes_target(&self) -> bool {
        self.need != TargetNeed::None
    }
}

/// Computes legal targets for one acting entity.
pub struct TargetSelector<'a> {
    state: &'a GameState,
    source: EntityId,
    controller: PlayerId,
}

impl<'a> TargetSelector<'a> {
    /// Create a selector for `source`, acting on behalf of `controller`.
    #[must_use]
    pub fn new(state: &'a GameState, source: EntityId, controller: PlayerId) -> Self {
        Self {
            state,
            source,
            controller,
        }
    }

    /// Ordered legal targets. Empty when the requirements take no target.
    #[must_use]
    pub fn legal_targets(&self, requirements: &Requirements) -> Vec<EntityId> {
        if !requirements.takes_target() {
            return Vec::new();
        }
        self.candidates()
            .into_iter()
            .filter(|&e| self.passes(requirements, e))
            .collect()
    }

    /// Whether `target` is legal right now.
    #[must_use]
    pub fn is_legal(&self, requirements: &Requirements, target: EntityId) -> bool {
        requirements.takes_target()
            && self.candidates().contains(&target)
            && self.passes(requirements, target)
    }

    /// Validate a declared target, returning the target to use.
    pub fn validate(
        &self,
        requirements: &Requirements,
        target: Option<EntityId>,
    ) -> Result<Option<EntityId>, IllegalAction> {
        match requirements.need {
            TargetNeed::None => match target {
                Some(t) => Err(IllegalAction::InvalidTarget(t)),
                None => Ok(None),
            },
            TargetNeed::Required | TargetNeed::IfAvailable => {
                let legal = self.legal_targets(requirements);
                if legal.is_empty() {
                    return match (requirements.need, target) {
                        (TargetNeed::IfAvailable, None) => Ok(None),
                        (TargetNeed::IfAvailable, Some(t)) => Err(IllegalAction::InvalidTarget(t)),
                        _ => Err(IllegalAction::NoLegalTarget),
                    };
                }
                match target {
                    None => Err(IllegalAction::TargetRequired),
                    Some(t) if legal.contains(&t) => Ok(Some(t)),
                    Some(t) => Err(IllegalAction::InvalidTarget(t)),
                }
            }
        }
    }

    /// Characters in play, in stable order.
    fn candidates(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        for player in [self.controller, self.controller.opponent()] {
            let hero = self.state.player(player).hero;
            if self.state.in_play(hero) {
                out.push(hero);
            }
            out.extend(self.state.field(player));
        }
        out.retain(|&e| self.visible(e));
        out
    }

    /// Stealthed enemy characters cannot be targeted.
    fn visible(&self, entity: EntityId) -> bool {
        self.state.controller(entity) == Some(self.controller) || !self.state.has_tag(entity, Tag::Stealth)
    }

    fn passes(&self, requirements: &Requirements, entity: EntityId) -> bool {
        let Some(record) = self.state.entity(entity) else {
            return false;
        };
        requirements.filters.iter().all(|filter| match filter {
            TargetFilter::Minion => record.is_minion(),
            TargetFilter::Hero => !record.is_minion(),
            TargetFilter::Friendly => record.controller == self.controller,
            TargetFilter::Enemy => record.controller != self.controller,
            TargetFilter::Damaged => self.state.tag(entity, Tag::Damage) > 0,
            TargetFilter::Undamaged => self.state.tag(entity, Tag::Damage) == 0,
            TargetFilter::NotSelf => entity != self.source,
        })
    }
}
