//! Core engine types: entities, tags, players, state, commands, RNG,
//! configuration.

pub mod action;
pub mod config;
pub mod entity;
pub mod player;
pub mod rng;
pub mod state;
pub mod tags;

pub use action::{ActionRecord, Command};
pub use config::GameConfig;
pub use entity::{Entity, EntityId};
pub use player::{Player, PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, Phase, PublicState};
pub use tags::{Tag, TagChange, TagStore};
