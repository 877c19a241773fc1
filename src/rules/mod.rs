//! Game rules: the command surface and turn structure.
//!
//! - `Game`: one match. Validates commands, drives the resolution stack,
//!   keeps a checkpoint for fatal errors
//! - `RulesEngine`: the trait drivers program against
//! - `GameResult`: how a finished game ended

mod combat;
pub mod engine;
pub mod game;

pub use engine::{GameResult, RulesEngine};
pub use game::{Game, PlayerSetup};
