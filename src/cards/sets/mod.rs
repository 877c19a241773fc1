//! Card sets shipped with the engine.
//!
//! Each set module exposes `register`, which adds its cards to a
//! registry. Set contents are data plus closures; nothing here is known
//! to the engine beyond the definition and script shapes.

mod balanced;
mod basic;
mod naxxramas;

use tracing::warn;

use super::definition::CardDefinition;
use super::registry::CardRegistry;
use super::script::CardScript;

/// Register every shipped set.
pub(crate) fn register_all(registry: &mut CardRegistry) {
    basic::register(registry);
    naxxramas::register(registry);
    balanced::register(registry);
}

fn add(registry: &mut CardRegistry, definition: CardDefinition, script: CardScript) {
    if let Err(error) = registry.register(definition, script) {
        warn!(%error, "card not registered");
    }
}

/// Register a card with no behavior.
fn vanilla(registry: &mut CardRegistry, definition: CardDefinition) {
    add(registry, definition, CardScript::new());
}
