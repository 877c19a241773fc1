//! Effect definitions.
//!
//! Effects are the atomic rule operations card scripts queue. Each one
//! names its targets explicitly; selection (random picks, "all minions")
//! happens in the script before the effect exists, so an area effect is
//! a list of single-target effects built from one snapshot of the board.

use serde::{Deserialize, Serialize};

use crate::cards::definition::CardId;
use crate::core::{EntityId, PlayerId};

/// What a summon puts into play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummonSource {
    /// A fresh entity of this card.
    Card(CardId),
    /// An entity already in the game (deck, hand).
    Existing(EntityId),
}

/// An atomic game effect.
///
/// ## Character effects
///
/// - `Hit`: damage after multiplier, divine shield and armor
/// - `Heal`: remove damage, never below zero
/// - `GainArmor`: additive hero armor
///
/// ## Zone effects
///
/// - `Summon`, `Destroy`, `Bounce`, `Draw`, `Give`
///
/// ## Modifier effects
///
/// - `Buff`: attach an enchantment
/// - `Silence`: strip enchantments, auras, triggers and keywords
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Hit {
        source: EntityId,
        target: EntityId,
        amount: i32,
    },
    Heal {
        source: EntityId,
        target: EntityId,
        amount: i32,
    },
    GainArmor {
        target: EntityId,
        amount: i32,
    },
    /// Temporary mana for the current turn.
    GainMana {
        player: PlayerId,
        amount: i32,
    },
    Summon {
        controller: PlayerId,
        what: SummonSource,
    },
    Buff {
        source: EntityId,
        target: EntityId,
        buff: CardId,
    },
    Destroy {
        target: EntityId,
    },
    Bounce {
        target: EntityId,
    },
    Silence {
        target: EntityId,
    },
    Draw {
        player: PlayerId,
    },
    Give {
        player: PlayerId,
        card: CardId,
    },
}

impl Effect {
    /// The entity this effect acts on, if it targets one.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Effect::Hit { target, .. }
            | Effect::Heal { target, .. }
            | Effect::GainArmor { target, .. }
            | Effect::Buff { target, .. }
            | Effect::Destroy { target }
            | Effect::Bounce { target }
            | Effect::Silence { target } => Some(*target),
            Effect::Summon {
                what: SummonSource::Existing(entity),
                ..
            } => Some(*entity),
            _ => None,
        }
    }
}
