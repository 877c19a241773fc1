//! Game event types.
//!
//! Events are raised by every rule mutation that a card may react to.
//! The payload fields are optional and their meaning depends on the kind:
//!
//! | kind         | player              | source       | target        | amount |
//! |--------------|---------------------|--------------|---------------|--------|
//! | `TurnBegin`  | player starting     |              |               |        |
//! | `TurnEnd`    | player ending       |              |               |        |
//! | `Summon`     | summoned controller |              | summoned      |        |
//! | `Damage`     | target controller   | dealer       | damaged       | damage |
//! | `Heal`       | target controller   | healer       | healed        | healed |
//! | `Death`      | dead controller     |              | dead entity   |        |
//! | `CardDrawn`  | drawing player      |              | drawn card    |        |
//! | `CardPlayed` | playing player      | card         | chosen target |        |
//! | `Attack`     | attacking player    | attacker     | defender      |        |

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Kinds of game event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    TurnBegin,
    TurnEnd,
    Summon,
    Damage,
    Heal,
    Death,
    CardDrawn,
    CardPlayed,
    Attack,
}

/// A game event with contextual data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The kind of event.
    pub kind: EventKind,

    /// The player associated with the event.
    pub player: Option<PlayerId>,

    /// The entity that caused the event.
    pub source: Option<EntityId>,

    /// The entity affected by the event.
    pub target: Option<EntityId>,

    /// Numeric payload (damage dealt, health restored).
    pub amount: i32,
}

impl GameEvent {
    /// Create an event with no payload.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            player: None,
            source: None,
            target: None,
            amount: 0,
        }
    }

    /// Start or end of `player`'s turn.
    #[must_use]
    pub fn turn(kind: EventKind, player: PlayerId) -> Self {
        Self::new(kind).with_player(player)
    }

    /// `target` took `amount` damage from `source`.
    #[must_use]
    pub fn damage(source: EntityId, target: EntityId, controller: PlayerId, amount: i32) -> Self {
        Self::new(EventKind::Damage)
            .with_source(source)
            .with_target(target)
            .with_player(controller)
            .with_amount(amount)
    }

    /// Builder: set player.
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Builder: set source.
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Builder: set target.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder: set amount.
    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = GameEvent::new(EventKind::Summon)
            .with_player(PlayerId::new(1))
            .with_target(EntityId(20));

        assert_eq!(event.kind, EventKind::Summon);
        assert_eq!(event.player, Some(PlayerId::new(1)));
        assert_eq!(event.source, None);
        assert_eq!(event.target, Some(EntityId(20)));
        assert_eq!(event.amount, 0);
    }

    #[test]
    fn test_damage_event() {
        let event = GameEvent::damage(EntityId(10), EntityId(20), PlayerId::new(0), 5);

        assert_eq!(event.kind, EventKind::Damage);
        assert_eq!(event.source, Some(EntityId(10)));
        assert_eq!(event.target, Some(EntityId(20)));
        assert_eq!(event.amount, 5);
    }

    #[test]
    fn test_turn_event() {
        let event = GameEvent::turn(EventKind::TurnEnd, PlayerId::new(1));
        assert_eq!(event.player, Some(PlayerId::new(1)));
        assert!(event.target.is_none());
    }
}
