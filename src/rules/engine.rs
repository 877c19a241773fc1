//! Rules engine trait and game results.
//!
//! Drivers (the random-play simulator, tests, benches) talk to a game
//! through `RulesEngine`:
//! - What commands are legal right now
//! - How a command changes the game
//! - Whether the game is over

use serde::{Deserialize, Serialize};

use crate::core::action::Command;
use crate::core::config::GameConfig;
use crate::core::player::PlayerId;
use crate::error::EngineResult;

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Both heroes died at the same time.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_commands`: Every command `apply_command` would accept for the
///   player to act, in a stable order. Empty once the game is over.
/// - `apply_command`: Validates before mutating. A rejected command
///   leaves the game unchanged.
/// - `is_terminal`: Return None if the game continues
pub trait RulesEngine {
    /// Get the game configuration.
    fn config(&self) -> &GameConfig;

    /// Enumerate the legal commands of the acting player.
    fn legal_commands(&self) -> Vec<Command>;

    /// Apply a command.
    ///
    /// Must be deterministic given the game's seed.
    fn apply_command(&mut self, command: &Command) -> EngineResult<()>;

    /// Check if the game is over.
    fn is_terminal(&self) -> Option<GameResult>;
}
