//! Game configuration.
//!
//! Rule constants (board and hand limits, mana cap, starting life) live
//! here rather than in the engine so tests and simulations can shrink or
//! stretch them. The resolution iteration cap is configured here too.
//!
//! ```
//! use tavern::core::GameConfig;
//!
//! let config = GameConfig::new()
//!     .with_field_limit(5)
//!     .with_iteration_limit(500);
//!
//! assert_eq!(config.field_limit, 5);
//! assert_eq!(config.hand_limit, 10);
//! ```

use serde::{Deserialize, Serialize};

/// Rule constants for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minions per side of the field.
    pub field_limit: usize,
    /// Cards per hand. Cards drawn beyond it are burned.
    pub hand_limit: usize,
    /// Mana crystal cap.
    pub max_mana: i32,
    /// Starting hero health unless the hero card says otherwise.
    pub starting_health: i32,
    /// Cards in a constructed or drafted deck.
    pub deck_size: usize,
    /// Cards dealt to the first and second player before the mulligan.
    pub starting_hand: [usize; 2],
    /// Card given to the second player after the mulligan. `None` disables it.
    pub coin_card: Option<String>,
    /// Interpreter steps allowed per command before the game is aborted.
    pub iteration_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_limit: 7,
            hand_limit: 10,
            max_mana: 10,
            starting_health: 30,
            deck_size: 30,
            starting_hand: [3, 4],
            coin_card: Some("GAME_005".to_string()),
            iteration_limit: 10_000,
        }
    }
}

impl GameConfig {
    /// Standard rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field_limit(mut self, limit: usize) -> Self {
        self.field_limit = limit;
        self
    }

    #[must_use]
    pub fn with_hand_limit(mut self, limit: usize) -> Self {
        self.hand_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_mana(mut self, mana: i32) -> Self {
        self.max_mana = mana;
        self
    }

    #[must_use]
    pub fn with_starting_health(mut self, health: i32) -> Self {
        self.starting_health = health;
        self
    }

    #[must_use]
    pub fn with_deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self
    }

    #[must_use]
    pub fn with_starting_hand(mut self, first: usize, second: usize) -> Self {
        self.starting_hand = [first, second];
        self
    }

    /// Disable the coin for the second player.
    #[must_use]
    pub fn without_coin(mut self) -> Self {
        self.coin_card = None;
        self
    }

    #[must_use]
    pub fn with_iteration_limit(mut self, limit: u32) -> Self {
        self.iteration_limit = limit;
        self
    }
}
