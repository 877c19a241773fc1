//! Aura engine: continuous modifiers recomputed from scratch.
//!
//! ## Model
//!
//! Registered auras are kept in registration order. A recomputation pass
//! throws away every previously applied modifier and rebuilds the table
//! from the current state, so applying and retracting an aura leaves no
//! residue: derived values are a pure function of (state, live auras).
//!
//! ## Composition
//!
//! For one entity and tag the derived value is
//! `base + enchantments`, then every `Add` in aura registration order,
//! then every `Set` override in registration order, then flags.
//!
//! ## Liveness
//!
//! An aura contributes only while its source is in play and not silenced.
//! Sources that leave play retract their auras through the game state.
//!
//! ## Failure isolation
//!
//! A predicate returning `Err` removes that aura (logged with `warn!`);
//! modifiers it produced during the failing pass are discarded and the
//! rest of the pass continues.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{trace, warn};

use super::descriptor::{AuraContext, AuraDescriptor, AuraModifier, AuraScope, ValueFn};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tags::Tag;

/// Unique identifier for a registered aura.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuraId(pub u32);

impl fmt::Display for AuraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aura({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct AuraInstance {
    id: AuraId,
    source: EntityId,
    descriptor: Arc<AuraDescriptor>,
}

/// Modifiers currently applied to one entity.
#[derive(Clone, Default)]
struct AppliedMods {
    adds: SmallVec<[(Tag, i32); 4]>,
    sets: SmallVec<[(Tag, ValueFn); 2]>,
    flags: SmallVec<[Tag; 2]>,
}

impl fmt::Debug for AppliedMods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppliedMods")
            .field("adds", &self.adds)
            .field("sets", &self.sets.iter().map(|(t, _)| *t).collect::<Vec<_>>())
            .field("flags", &self.flags)
            .finish()
    }
}

/// Registry of live auras plus the table of modifiers they produce.
#[derive(Clone, Debug, Default)]
pub struct AuraEngine {
    auras: Vec<AuraInstance>,
    applied: FxHashMap<EntityId, AppliedMods>,
    next_id: u32,
}

impl AuraEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aura owned by `source`. Takes effect on the next pass.
    pub fn apply(&mut self, source: EntityId, descriptor: Arc<AuraDescriptor>) -> AuraId {
        let id = AuraId(self.next_id);
        self.next_id += 1;
        trace!(%id, %source, name = %descriptor.name, "aura registered");
        self.auras.push(AuraInstance { id, source, descriptor });
        id
    }

    /// Remove every aura owned by `source`, returning how many were removed.
    pub fn retract(&mut self, source: EntityId) -> usize {
        let before = self.auras.len();
        self.auras.retain(|a| a.source != source);
        before - self.auras.len()
    }

    /// Number of registered auras.
    #[must_use]
    pub fn len(&self) -> usize {
        self.auras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    /// Apply the current modifier table to a pre-aura value.
    #[must_use]
    pub fn modify(&self, entity: EntityId, tag: Tag, value: i32) -> i32 {
        let Some(mods) = self.applied.get(&entity) else {
            return value;
        };
        let mut value = mods
            .adds
            .iter()
            .filter(|(t, _)| *t == tag)
            .fold(value, |acc, (_, n)| acc.saturating_add(*n));
        for (t, f) in &mods.sets {
            if *t == tag {
                value = f(value);
            }
        }
        if mods.flags.contains(&tag) {
            value = value.max(1);
        }
        value
    }

    /// Rebuild the modifier table from `state`.
    ///
    /// `state` must not be the state this engine is stored in: callers take
    /// the engine out first, which also means predicates read base values.
    pub(crate) fn recompute(&mut self, state: &GameState) {
        let mut applied: FxHashMap<EntityId, AppliedMods> = FxHashMap::default();
        let mut failed: Vec<AuraId> = Vec::new();

        for aura in &self.auras {
            let Some(source) = state.entity(aura.source) else {
                continue;
            };
            if !state.in_play(aura.source) || source.is_silenced() {
                continue;
            }
            let controller = source.controller;

            let mut hits: SmallVec<[EntityId; 8]> = SmallVec::new();
            let mut error = None;
            for target in Self::candidates(state, aura, controller) {
                let ctx = AuraContext {
                    state,
                    source: aura.source,
                    controller,
                    target,
                };
                match aura.descriptor.matches(&ctx) {
                    Ok(true) => hits.push(target),
                    Ok(false) => {}
                    Err(e) => {
                        error = Some(e);
                        break;
                    }
                }
            }

            if let Some(e) = error {
                warn!(aura = %aura.id, name = %aura.descriptor.name, error = %e, "aura predicate failed; removing aura");
                failed.push(aura.id);
                continue;
            }

            for target in hits {
                let mods = applied.entry(target).or_default();
                match &aura.descriptor.modifier {
                    AuraModifier::Add(tag, n) => mods.adds.push((*tag, *n)),
                    AuraModifier::Set(tag, f) => mods.sets.push((*tag, Arc::clone(f))),
                    AuraModifier::Flag(tag) => mods.flags.push(*tag),
                }
            }
        }

        if !failed.is_empty() {
            self.auras.retain(|a| !failed.contains(&a.id));
        }
        trace!(auras = self.auras.len(), affected = applied.len(), "auras recomputed");
        self.applied = applied;
    }

    fn candidates(state: &GameState, aura: &AuraInstance, controller: PlayerId) -> Vec<EntityId> {
        let opponent = controller.opponent();
        match aura.descriptor.scope {
            AuraScope::FriendlyMinions => state.field(controller),
            AuraScope::EnemyMinions => state.field(opponent),
            AuraScope::AllMinions => {
                let mut all = state.field(controller);
                all.extend(state.field(opponent));
                all
            }
            AuraScope::FriendlyHand => state.hand(controller).to_vec(),
            AuraScope::EnemyHand => state.hand(opponent).to_vec(),
            AuraScope::AllHands => {
                let mut all = state.hand(controller).to_vec();
                all.extend_from_slice(state.hand(opponent));
                all
            }
            AuraScope::FriendlyHero => vec![state.player(controller).hero],
            AuraScope::EnemyHero => vec![state.player(opponent).hero],
            AuraScope::Attached => state
                .entity(aura.source)
                .and_then(|e| e.attached_to)
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRegistry;
    use crate::error::ScriptError;
    use crate::testing::Fixture;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    fn plus_attack(n: i32) -> Arc<AuraDescriptor> {
        Arc::new(AuraDescriptor::new("Test Banner", AuraScope::FriendlyMinions, AuraModifier::Add(Tag::Atk, n)))
    }

    #[test]
    fn test_apply_then_retract_round_trip() {
        // Arrange
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let ally = fx.summon(P0, "CS2_182");
        let enemy = fx.summon(P1, "CS2_182");
        let before: Vec<_> = [source, ally, enemy]
            .iter()
            .map(|&e| fx.game.state().tag(e, Tag::Atk))
            .collect();

        // Act
        fx.game.state_mut().add_aura(source, plus_attack(2));
        fx.game.state_mut().refresh_auras();

        // Assert
        assert_eq!(fx.game.state().tag(ally, Tag::Atk), before[1] + 2);
        assert_eq!(fx.game.state().tag(source, Tag::Atk), before[0] + 2);
        assert_eq!(fx.game.state().tag(enemy, Tag::Atk), before[2]);

        fx.game.state_mut().retract_auras(source);
        fx.game.state_mut().refresh_auras();

        let after: Vec<_> = [source, ally, enemy]
            .iter()
            .map(|&e| fx.game.state().tag(e, Tag::Atk))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_additive_before_override_regardless_of_registration() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let card = fx.give(P0, "CS2_182");
        let base = fx.game.state().tag(card, Tag::Cost);

        let state = fx.game.state_mut();
        // Override registered first, additive second
        state.add_aura(
            source,
            Arc::new(AuraDescriptor::new("Double", AuraScope::FriendlyHand, AuraModifier::set(Tag::Cost, |c| c * 2))),
        );
        state.add_aura(
            source,
            Arc::new(AuraDescriptor::new("Plus one", AuraScope::FriendlyHand, AuraModifier::Add(Tag::Cost, 1))),
        );
        state.refresh_auras();

        assert_eq!(fx.game.state().tag(card, Tag::Cost), (base + 1) * 2);
    }

    #[test]
    fn test_source_leaving_play_removes_modifier() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let ally = fx.summon(P0, "CS2_182");
        fx.game.state_mut().add_aura(source, plus_attack(1));
        fx.game.state_mut().refresh_auras();
        assert_eq!(fx.game.state().tag(ally, Tag::Atk), 5);
        let registered = fx.game.state().auras().len();

        fx.destroy(source);

        assert_eq!(fx.game.state().tag(ally, Tag::Atk), 4);
        assert_eq!(fx.game.state().auras().len(), registered - 1);
    }

    #[test]
    fn test_silenced_source_stops_contributing() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let ally = fx.summon(P0, "CS2_182");
        fx.game.state_mut().add_aura(source, plus_attack(3));
        fx.game.state_mut().refresh_auras();
        assert_eq!(fx.game.state().tag(ally, Tag::Atk), 7);

        fx.silence(source);
        assert_eq!(fx.game.state().tag(ally, Tag::Atk), 4);
    }

    #[test]
    fn test_failing_predicate_removes_only_that_aura() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let ally = fx.summon(P0, "CS2_182");

        let state = fx.game.state_mut();
        state.add_aura(
            source,
            Arc::new(
                AuraDescriptor::new("Broken", AuraScope::FriendlyMinions, AuraModifier::Add(Tag::Atk, 10))
                    .with_predicate(|_| Err(ScriptError::Malformed("bad predicate".into()))),
            ),
        );
        state.add_aura(source, plus_attack(1));
        state.refresh_auras();

        assert_eq!(fx.game.state().tag(ally, Tag::Atk), 5);
        assert_eq!(fx.game.state().auras().len(), 1);
    }

    #[test]
    fn test_flag_modifier() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let source = fx.summon(P0, "CS2_120");
        let ally = fx.summon(P0, "CS2_182");

        let state = fx.game.state_mut();
        state.add_aura(
            source,
            Arc::new(
                AuraDescriptor::new("Echo", AuraScope::FriendlyMinions, AuraModifier::Flag(Tag::ExtraDeathrattles))
                    .with_predicate(|ctx| Ok(!ctx.is_source())),
            ),
        );
        state.refresh_auras();

        assert!(fx.game.state().has_tag(ally, Tag::ExtraDeathrattles));
        assert!(!fx.game.state().has_tag(source, Tag::ExtraDeathrattles));
    }
}
