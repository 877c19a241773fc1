//! Continuous effects.
//!
//! - [`AuraDescriptor`]: scope, predicate and modifier declared by a card
//! - [`AuraEngine`]: live auras and the modifier table they produce
//!
//! The engine never caches a derived value across a mutation: the game
//! state marks auras dirty on every change and the resolution stack
//! recomputes before the next handler reads anything.

mod descriptor;
mod engine;

pub use descriptor::{AuraContext, AuraDescriptor, AuraModifier, AuraPredicate, AuraScope, ValueFn};
pub use engine::{AuraEngine, AuraId};
