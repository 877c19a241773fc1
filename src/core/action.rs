//! Player commands and the command history.
//!
//! A [`Command`] is one request on the turn surface: mulligan, play a card,
//! use the hero power, attack, end the turn. Commands are plain data so
//! drivers can enumerate them and histories can be replayed.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::EntityId;
use super::player::PlayerId;

/// A request from a player.
///
/// ```
/// use tavern::core::{Command, EntityId};
///
/// let play = Command::play(EntityId(12)).with_target(EntityId(3));
/// assert_eq!(play.target(), Some(EntityId(3)));
/// assert!(Command::EndTurn.target().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Replace the listed cards of the starting hand.
    Mulligan {
        player: PlayerId,
        replace: SmallVec<[EntityId; 4]>,
    },
    /// Play a card from hand, with an optional target and choose-one index.
    PlayCard {
        card: EntityId,
        target: Option<EntityId>,
        choice: Option<usize>,
    },
    UsePower {
        target: Option<EntityId>,
    },
    Attack {
        attacker: EntityId,
        defender: EntityId,
    },
    EndTurn,
}

impl Command {
    /// Play a card without target or choice.
    #[must_use]
    pub fn play(card: EntityId) -> Self {
        Command::PlayCard { card, target: None, choice: None }
    }

    /// Builder: set the target of a play or power command.
    #[must_use]
    pub fn with_target(mut self, new_target: EntityId) -> Self {
        match &mut self {
            Command::PlayCard { target, .. } | Command::UsePower { target } => {
                *target = Some(new_target);
            }
            _ => {}
        }
        self
    }

    /// Builder: set the choose-one index of a play command.
    #[must_use]
    pub fn with_choice(mut self, index: usize) -> Self {
        if let Command::PlayCard { choice, .. } = &mut self {
            *choice = Some(index);
        }
        self
    }

    /// The declared target, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Command::PlayCard { target, .. } | Command::UsePower { target } => *target,
            Command::Attack { defender, .. } => Some(*defender),
            _ => None,
        }
    }
}

/// A recorded command with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who issued the command.
    pub player: PlayerId,

    /// The command.
    pub command: Command,

    /// Turn number when the command was applied.
    pub turn: u32,

    /// Sequence number within the game (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, command: Command, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            command,
            turn,
            sequence,
        }
    }
}
