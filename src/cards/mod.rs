//! Card system: definitions, scripts, registry and the shipped sets.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardDefinition`: Static card data (type, class, base tags, targeting)
//! - `CardScript`: Play action, deathrattle, event hooks, aura
//! - `ScriptContext`: What a running script reads and queues
//! - `CardRegistry`: Definition and script lookup by id or code

pub mod definition;
pub mod registry;
pub mod script;
mod sets;

pub use definition::{CardClass, CardDefinition, CardId, CardType, Race};
pub use registry::CardRegistry;
pub use script::{event_handler, ActionFn, CardScript, DeathrattleFn, EventHandler, EventHook, ScriptContext};
