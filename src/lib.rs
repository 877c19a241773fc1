//! # tavern
//!
//! A headless rules engine for a Hearthstone-style collectible card game.
//!
//! ## Design Principles
//!
//! 1. **Validate, then mutate**: every command is checked against the
//!    current state first. A rejected command changes nothing.
//!
//! 2. **One resolution stack per command**: effects, event dispatch,
//!    death processing and deathrattles are frames on an explicit stack
//!    with an iteration budget, never native recursion.
//!
//! 3. **Derived values**: a tag read adds attached enchantments to the
//!    entity's own value, then applies the aura table.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) state clones via `im-rs`, used
//!   as the checkpoint every command rolls back to on failure.
//!
//! - **Handles, not pointers**: entities are integer ids; controller and
//!   opponent are lookups through the game state.
//!
//! - **Deterministic**: one seeded ChaCha RNG per game. The same seed and
//!   commands replay the same game.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, tags, state, commands, RNG, configuration
//! - `zones`: Zone membership and ordering
//! - `cards`: Definitions, scripts, the registry and the shipped sets
//! - `auras`: Continuous modifiers recomputed from their sources
//! - `triggers`: Events, hooks and the listener registry
//! - `effects`: Atomic effects, the resolver and targeting
//! - `stack`: The resolution stack interpreter
//! - `rules`: Games, turns, combat and the `RulesEngine` trait
//! - `sampler`: Weighted sampling without replacement
//! - `sim`: Game setup and the random-play driver
//! - `view`: Serializable snapshots

pub mod auras;
pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod rules;
pub mod sampler;
pub mod sim;
pub mod stack;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod triggers;
pub mod view;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    ActionRecord, Command, Entity, EntityId, GameConfig, GameRng, GameRngState, GameState, Phase, Player, PlayerId,
    PlayerMap, PublicState, Tag, TagStore,
};

pub use crate::zones::{Zone, ZoneManager, ZonePosition};

pub use crate::cards::{CardClass, CardDefinition, CardId, CardRegistry, CardScript, CardType, Race, ScriptContext};

pub use crate::auras::{AuraDescriptor, AuraEngine, AuraModifier, AuraScope};

pub use crate::triggers::{EventKind, GameEvent, Hook, Trigger, TriggerCondition, TriggerRegistry};

pub use crate::effects::{Effect, EffectResolver, Requirements, SummonSource, TargetSelector};

pub use crate::stack::ResolutionStack;

pub use crate::rules::{Game, GameResult, PlayerSetup, RulesEngine};

pub use crate::error::{EngineError, EngineResult, IllegalAction, ScriptError};

pub use crate::sampler::{sample, sample_clamped, SamplerError, WeightedPool};

pub use crate::view::{EntityView, GameSnapshot, PlayerView};
