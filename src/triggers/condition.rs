//! Trigger conditions.
//!
//! Conditions are evaluated relative to the trigger's owner: "friendly"
//! means controlled by the owner's controller, "own turn" means the event
//! player is the owner's controller. That keeps one condition value
//! reusable by every copy of a card.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId};

use super::event::{EventKind, GameEvent};

/// A condition that must hold for a trigger to fire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// Always true.
    Always,

    // === Player Filters ===

    /// Event player is the owner's controller.
    OwnersTurn,

    /// Event player is the owner's opponent.
    OpponentsTurn,

    // === Target Filters ===

    /// Event target is controlled by the owner's controller.
    FriendlyTarget,

    /// Event target is controlled by the opponent.
    EnemyTarget,

    /// Event target is the owner itself.
    TargetIsSelf,

    /// Event target is not the owner.
    TargetNotSelf,

    /// Event target is a minion.
    TargetIsMinion,

    // === Composite ===

    /// All conditions must be true.
    All(Vec<TriggerCondition>),

    /// Any condition must be true.
    Any(Vec<TriggerCondition>),

    /// Condition must be false.
    Not(Box<TriggerCondition>),
}

impl TriggerCondition {
    /// Combine with another condition (AND).
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            TriggerCondition::All(mut conditions) => {
                conditions.push(other);
                TriggerCondition::All(conditions)
            }
            _ => TriggerCondition::All(vec![self, other]),
        }
    }

    /// Combine with another condition (OR).
    #[must_use]
    pub fn or(self, other: TriggerCondition) -> Self {
        match self {
            TriggerCondition::Any(mut conditions) => {
                conditions.push(other);
                TriggerCondition::Any(conditions)
            }
            _ => TriggerCondition::Any(vec![self, other]),
        }
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        TriggerCondition::Not(Box::new(self))
    }
}

impl Default for TriggerCondition {
    fn default() -> Self {
        TriggerCondition::Always
    }
}

/// Common owner-relative event subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hook {
    OwnTurnBegin,
    OwnTurnEnd,
    TurnEnd,
    OwnMinionSummon,
    EnemyMinionSummon,
    SelfDamaged,
    MinionDeath,
}

impl Hook {
    /// Event kind the hook subscribes to.
    #[must_use]
    pub fn kind(self) -> EventKind {
        match self {
            Hook::OwnTurnBegin => EventKind::TurnBegin,
            Hook::OwnTurnEnd | Hook::TurnEnd => EventKind::TurnEnd,
            Hook::OwnMinionSummon | Hook::EnemyMinionSummon => EventKind::Summon,
            Hook::SelfDamaged => EventKind::Damage,
            Hook::MinionDeath => EventKind::Death,
        }
    }

    /// Condition the hook implies.
    #[must_use]
    pub fn condition(self) -> TriggerCondition {
        match self {
            Hook::OwnTurnBegin | Hook::OwnTurnEnd => TriggerCondition::OwnersTurn,
            Hook::TurnEnd => TriggerCondition::Always,
            Hook::OwnMinionSummon => TriggerCondition::FriendlyTarget
                .and(TriggerCondition::TargetNotSelf)
                .and(TriggerCondition::TargetIsMinion),
            Hook::EnemyMinionSummon => {
                TriggerCondition::EnemyTarget.and(TriggerCondition::TargetIsMinion)
            }
            Hook::SelfDamaged => TriggerCondition::TargetIsSelf,
            Hook::MinionDeath => TriggerCondition::TargetIsMinion,
        }
    }
}

/// Context for evaluating a condition.
pub struct ConditionContext<'a> {
    /// The game state.
    pub state: &'a GameState,

    /// The event being checked.
    pub event: &'a GameEvent,

    /// The entity owning the trigger.
    pub owner: EntityId,

    /// The owner's controller.
    pub controller: PlayerId,
}

/// Evaluates conditions against context.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a condition.
    #[must_use]
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext<'_>) -> bool {
        match condition {
            TriggerCondition::Always => true,

            TriggerCondition::OwnersTurn => ctx.event.player == Some(ctx.controller),
            TriggerCondition::OpponentsTurn => {
                ctx.event.player == Some(ctx.controller.opponent())
            }

            TriggerCondition::FriendlyTarget => ctx
                .event
                .target
                .and_then(|t| ctx.state.controller(t))
                .is_some_and(|c| c == ctx.controller),
            TriggerCondition::EnemyTarget => ctx
                .event
                .target
                .and_then(|t| ctx.state.controller(t))
                .is_some_and(|c| c != ctx.controller),
            TriggerCondition::TargetIsSelf => ctx.event.target == Some(ctx.owner),
            TriggerCondition::TargetNotSelf => ctx.event.target != Some(ctx.owner),
            TriggerCondition::TargetIsMinion => ctx
                .event
                .target
                .and_then(|t| ctx.state.entity(t))
                .is_some_and(|e| e.is_minion()),

            TriggerCondition::All(conditions) => {
                conditions.iter().all(|c| Self::evaluate(c, ctx))
            }
            TriggerCondition::Any(conditions) => {
                conditions.iter().any(|c| Self::evaluate(c, ctx))
            }
            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),
        }
    }
}
