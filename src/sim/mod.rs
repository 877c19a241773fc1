//! Game setup and a random-play driver.
//!
//! The driver is a smoke tester and benchmark workload: it issues only
//! commands the game itself lists as legal, so every error it surfaces
//! is an engine bug.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use tavern::cards::CardRegistry;
//! use tavern::core::GameRng;
//! use tavern::sim::{self, SimConfig};
//!
//! let registry = Arc::new(CardRegistry::standard());
//! let mut game = sim::setup_random_game(registry, 42).unwrap();
//! let mut rng = GameRng::new(7);
//! sim::play_random_game(&mut game, &mut rng, &SimConfig::new().with_max_turns(6)).unwrap();
//! assert!(game.state().turn() >= 6 || game.result().is_some());
//! ```

mod random_play;
mod setup;

pub use random_play::{play_random_game, play_turn, SimConfig};
pub use setup::{setup_game, setup_random_game};
