//! Game state: entities, zones, players, and the engine registries.
//!
//! ## PublicState
//!
//! Observable progression data: phase, turn, current player, result and
//! the command history.
//!
//! ## GameState
//!
//! Complete game state:
//! - Public state
//! - Entity arena (`im::OrdMap`, O(1) clone for checkpoints)
//! - Zone manager (entity locations)
//! - Players (hero, mana, fatigue)
//! - Trigger registry and aura engine
//!
//! Entities never point at each other or at the game; controller and
//! opponent are lookups through this state.
//!
//! ## Derived tags
//!
//! [`GameState::tag`] is the only correct way to read a tag: it adds the
//! attached enchantments to the entity's own value and then applies the
//! aura table. Any tag write or zone move marks the aura table stale; the
//! resolution loop refreshes it before the next step.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::action::{ActionRecord, Command};
use super::entity::{Entity, EntityId};
use super::player::{Player, PlayerId, PlayerMap};
use super::rng::GameRng;
use super::tags::{Tag, TagChange, TagStore};
use crate::auras::{AuraDescriptor, AuraEngine, AuraId};
use crate::cards::definition::{CardId, CardType};
use crate::cards::script::CardScript;
use crate::error::{EngineError, EngineResult};
use crate::rules::GameResult;
use crate::triggers::{Trigger, TriggerRegistry};
use crate::zones::{Zone, ZoneManager, ZonePosition};

use std::sync::Arc;

/// Game phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Entities created, starting hands not dealt.
    Setup,
    /// Waiting for both players' mulligan choices.
    Mulligan,
    Main,
    Over,
}

/// Public game state - observable by all players.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicState {
    /// Current phase.
    pub phase: Phase,

    /// Turn number (0 before the first turn).
    pub turn: u32,

    /// Player whose turn it is.
    pub current_player: PlayerId,

    /// Set when the game ends.
    pub result: Option<GameResult>,

    /// Commands applied so far.
    pub sequence: u32,

    /// Command history for replay and debugging.
    pub history: Vector<ActionRecord>,
}

impl PublicState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Setup,
            turn: 0,
            current_player: PlayerId::new(0),
            result: None,
            sequence: 0,
            history: Vector::new(),
        }
    }

    /// Record a command in history.
    pub fn record(&mut self, player: PlayerId, command: Command) {
        self.history.push_back(ActionRecord::new(player, command, self.turn, self.sequence));
        self.sequence += 1;
    }
}

impl Default for PublicState {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete game state.
///
/// Cloning is cheap (persistent maps plus small registries), which the
/// game uses to checkpoint before every command.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Public information.
    pub public: PublicState,

    entities: OrdMap<EntityId, Entity>,
    zones: ZoneManager,
    players: PlayerMap<Player>,
    triggers: TriggerRegistry,
    auras: AuraEngine,
    next_entity_id: u32,
    aura_dirty: bool,
}

impl GameState {
    /// Create an empty two-player state. Heroes are attached by setup.
    #[must_use]
    pub fn new() -> Self {
        Self {
            public: PublicState::new(),
            entities: OrdMap::new(),
            zones: ZoneManager::new(),
            players: PlayerMap::from_fn(|p| {
                Player::new(format!("Player{}", p.0 + 1), EntityId::new(0), EntityId::new(0))
            }),
            triggers: TriggerRegistry::new(),
            auras: AuraEngine::new(),
            next_entity_id: EntityId::FIRST.raw(),
            aura_dirty: false,
        }
    }

    // === Progression ===

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.public.phase
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.public.turn
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.public.current_player
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.public.result
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &Player {
        &self.players[player]
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player]
    }

    /// Iterate over (PlayerId, &Player) pairs.
    pub fn players(&self) -> impl Iterator<Item = (PlayerId, &Player)> {
        self.players.iter()
    }

    // === Entities ===

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> EngineResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| EngineError::InvariantViolation(format!("{id} does not exist")))
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn card_of(&self, id: EntityId) -> Option<CardId> {
        self.entity(id).map(|e| e.card)
    }

    #[must_use]
    pub fn controller(&self, id: EntityId) -> Option<PlayerId> {
        self.entity(id).map(|e| e.controller)
    }

    #[must_use]
    pub fn zone_of(&self, id: EntityId) -> Option<Zone> {
        self.entity(id).map(|e| e.zone)
    }

    /// In the play zone.
    #[must_use]
    pub fn in_play(&self, id: EntityId) -> bool {
        self.zone_of(id) == Some(Zone::Play)
    }

    /// In a zone whose triggers stay subscribed (play or secret).
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.zone_of(id).is_some_and(Zone::is_live)
    }

    // === Derived tags ===

    /// Effective tag value: own value, plus enchantments, then auras.
    #[must_use]
    pub fn tag(&self, id: EntityId, tag: Tag) -> i32 {
        let Some(entity) = self.entity(id) else {
            return 0;
        };
        let value = entity
            .enchantments
            .iter()
            .filter_map(|e| self.entity(*e))
            .fold(entity.tags.get(tag), |acc, ench| acc.saturating_add(ench.tags.get(tag)));
        self.auras.modify(id, tag, value)
    }

    #[must_use]
    pub fn has_tag(&self, id: EntityId, tag: Tag) -> bool {
        self.tag(id, tag) != 0
    }

    /// Remaining health of a character.
    #[must_use]
    pub fn health(&self, id: EntityId) -> i32 {
        self.tag(id, Tag::Health) - self.tag(id, Tag::Damage)
    }

    /// Attack value; a hero adds its weapon's attack on its own turn.
    #[must_use]
    pub fn attack(&self, id: EntityId) -> i32 {
        let Some(entity) = self.entity(id) else {
            return 0;
        };
        let mut atk = self.tag(id, Tag::Atk);
        if entity.card_type == CardType::Hero && entity.controller == self.current_player() {
            if let Some(weapon) = self.player(entity.controller).weapon {
                atk += self.tag(weapon, Tag::Atk);
            }
        }
        atk.max(0)
    }

    /// Mana cost after modifiers, never negative.
    #[must_use]
    pub fn cost(&self, id: EntityId) -> i32 {
        self.tag(id, Tag::Cost).max(0)
    }

    /// Whether an entity in play should be destroyed by the next death check.
    #[must_use]
    pub fn is_mortally_wounded(&self, id: EntityId) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        if entity.zone != Zone::Play {
            return false;
        }
        if entity.tags.has(Tag::ToBeDestroyed) {
            return matches!(entity.card_type, CardType::Hero | CardType::Minion | CardType::Weapon);
        }
        match entity.card_type {
            CardType::Hero | CardType::Minion => self.health(id) <= 0,
            CardType::Weapon => self.tag(id, Tag::Durability) <= 0,
            _ => false,
        }
    }

    /// Whether this entity's deathrattle may fire.
    #[must_use]
    pub fn has_deathrattle(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|e| !e.is_silenced() && self.has_tag(id, Tag::Deathrattle))
    }

    // === Zones ===

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    /// Minions in play for a player, left to right.
    #[must_use]
    pub fn field(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones
            .entities(player, Zone::Play)
            .iter()
            .copied()
            .filter(|&e| self.entity(e).is_some_and(Entity::is_minion))
            .collect()
    }

    /// Both fields: first player's minions, then second player's.
    #[must_use]
    pub fn board(&self) -> Vec<EntityId> {
        let mut all = self.field(PlayerId::new(0));
        all.extend(self.field(PlayerId::new(1)));
        all
    }

    /// Hero followed by the field.
    #[must_use]
    pub fn characters(&self, player: PlayerId) -> Vec<EntityId> {
        let mut all = vec![self.player(player).hero];
        all.extend(self.field(player));
        all
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[EntityId] {
        self.zones.entities(player, Zone::Hand)
    }

    /// Deck, bottom first; the last entry is the next draw.
    #[must_use]
    pub fn deck(&self, player: PlayerId) -> &[EntityId] {
        self.zones.entities(player, Zone::Deck)
    }

    #[must_use]
    pub fn secrets(&self, player: PlayerId) -> &[EntityId] {
        self.zones.entities(player, Zone::Secret)
    }

    #[must_use]
    pub fn graveyard(&self, player: PlayerId) -> &[EntityId] {
        self.zones.entities(player, Zone::Graveyard)
    }

    // === Mutation ===

    pub(crate) fn shuffle_deck(&mut self, player: PlayerId, rng: &mut GameRng) {
        self.zones.shuffle(player, Zone::Deck, rng);
    }

    /// Create a new entity in a zone.
    pub(crate) fn create_entity(
        &mut self,
        card: CardId,
        card_type: CardType,
        controller: PlayerId,
        zone: Zone,
        position: ZonePosition,
        tags: TagStore,
    ) -> EngineResult<EntityId> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.zones.add(id, controller, zone, position)?;
        self.entities.insert(id, Entity::new(id, card, card_type, controller, zone, tags));
        self.aura_dirty = true;
        trace!(%id, %card, ?zone, "entity created");
        Ok(id)
    }

    /// Move an entity to `zone` under `controller`.
    ///
    /// Leaving the live zones unsubscribes the entity's triggers, retracts
    /// its auras and sends its enchantments to the graveyard.
    pub(crate) fn move_entity(
        &mut self,
        id: EntityId,
        controller: PlayerId,
        zone: Zone,
        position: ZonePosition,
    ) -> EngineResult<Zone> {
        let (_, old_zone) = self.zones.move_to(id, controller, zone, position)?;
        {
            let entity = self.entity_mut(id)?;
            entity.zone = zone;
            entity.controller = controller;
        }
        if old_zone.is_live() && !zone.is_live() {
            self.deactivate(id);
            for ench in self.strip_enchantments(id)? {
                let owner = self.controller(ench).unwrap_or(controller);
                self.move_entity(ench, owner, Zone::Graveyard, ZonePosition::Top)?;
            }
        }
        self.aura_dirty = true;
        trace!(%id, from = ?old_zone, to = ?zone, "entity moved");
        Ok(old_zone)
    }

    /// Write an entity's own tag.
    pub(crate) fn set_tag(&mut self, id: EntityId, tag: Tag, value: i32) -> EngineResult<Option<TagChange>> {
        let change = self.entity_mut(id)?.tags.set(tag, value);
        if change.is_some() {
            self.aura_dirty = true;
        }
        Ok(change)
    }

    /// Add to an entity's own tag.
    pub(crate) fn add_tag(&mut self, id: EntityId, tag: Tag, delta: i32) -> EngineResult<Option<TagChange>> {
        let value = self.entity(id).map_or(0, |e| e.tags.get(tag)).saturating_add(delta);
        self.set_tag(id, tag, value)
    }

    /// Replace every own tag (bounce, transform back to base).
    pub(crate) fn reset_tags(&mut self, id: EntityId, tags: TagStore) -> EngineResult<()> {
        self.entity_mut(id)?.tags = tags;
        self.aura_dirty = true;
        Ok(())
    }

    /// Link an enchantment to its target.
    pub(crate) fn attach(&mut self, enchantment: EntityId, target: EntityId) -> EngineResult<()> {
        self.entity_mut(enchantment)?.attached_to = Some(target);
        self.entity_mut(target)?.enchantments.push(enchantment);
        self.aura_dirty = true;
        Ok(())
    }

    /// Unlink every enchantment from `id`, returning them oldest first.
    pub(crate) fn strip_enchantments(&mut self, id: EntityId) -> EngineResult<Vec<EntityId>> {
        let stripped: Vec<_> = self.entity_mut(id)?.enchantments.drain(..).collect();
        for &ench in &stripped {
            self.entity_mut(ench)?.attached_to = None;
        }
        if !stripped.is_empty() {
            self.aura_dirty = true;
        }
        Ok(stripped)
    }

    /// Unlink one enchantment from whatever it is attached to.
    pub(crate) fn detach(&mut self, enchantment: EntityId) -> EngineResult<()> {
        if let Some(target) = self.entity_mut(enchantment)?.attached_to.take() {
            self.entity_mut(target)?.enchantments.retain(|e| *e != enchantment);
            self.aura_dirty = true;
        }
        Ok(())
    }

    // === Triggers and auras ===

    #[must_use]
    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    /// Subscribe an entity's script hooks and aura.
    pub(crate) fn activate(&mut self, id: EntityId, name: &str, script: &CardScript) {
        for hook in &script.hooks {
            let trigger = Trigger::new(name, id, hook.kind, Arc::clone(&hook.handler))
                .with_condition(hook.condition.clone());
            self.triggers.register(trigger);
        }
        if let Some(aura) = &script.aura {
            self.add_aura(id, Arc::clone(aura));
        }
    }

    /// Unsubscribe every trigger and aura an entity owns.
    pub(crate) fn deactivate(&mut self, id: EntityId) {
        let triggers = self.triggers.remove_for_owner(id);
        let auras = self.auras.retract(id);
        if triggers + auras > 0 {
            trace!(%id, triggers, auras, "entity deactivated");
            self.aura_dirty = true;
        }
    }

    #[must_use]
    pub fn auras(&self) -> &AuraEngine {
        &self.auras
    }

    /// Register an aura owned by `source`.
    pub fn add_aura(&mut self, source: EntityId, descriptor: Arc<AuraDescriptor>) -> AuraId {
        self.aura_dirty = true;
        self.auras.apply(source, descriptor)
    }

    /// Retract every aura owned by `source`.
    pub fn retract_auras(&mut self, source: EntityId) -> usize {
        self.aura_dirty = true;
        self.auras.retract(source)
    }

    /// Whether the aura table may be stale.
    #[must_use]
    pub fn auras_dirty(&self) -> bool {
        self.aura_dirty
    }

    /// Recompute the aura table if anything changed since the last pass.
    pub fn refresh_auras(&mut self) {
        if !self.aura_dirty {
            return;
        }
        let mut engine = std::mem::take(&mut self.auras);
        engine.recompute(self);
        self.auras = engine;
        self.aura_dirty = false;
    }

    // === Checks ===

    /// Verify zone bookkeeping against the entity records.
    pub fn check_consistency(&self) -> EngineResult<()> {
        self.zones.check_consistency()?;
        for entity in self.entities.values() {
            match self.zones.location(entity.id) {
                Some((player, zone)) if zone == entity.zone && player == entity.controller => {}
                other => {
                    return Err(EngineError::InvariantViolation(format!(
                        "{} records {:?} of {} but zones say {:?}",
                        entity.id, entity.zone, entity.controller, other
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    fn minion(state: &mut GameState, player: PlayerId, atk: i32, health: i32) -> EntityId {
        let tags = TagStore::new().with(Tag::Atk, atk).with(Tag::Health, health);
        state
            .create_entity(CardId(0), CardType::Minion, player, Zone::Play, ZonePosition::Top, tags)
            .unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new();
        assert_eq!(state.phase(), Phase::Setup);
        assert_eq!(state.turn(), 0);
        assert_eq!(state.entity_count(), 0);
        assert!(state.result().is_none());
    }

    #[test]
    fn test_create_and_field_order() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 1, 1);
        let b = minion(&mut state, P0, 2, 2);
        let c = minion(&mut state, P1, 3, 3);

        assert_eq!(state.field(P0), vec![a, b]);
        assert_eq!(state.board(), vec![a, b, c]);
        assert!(state.in_play(a));
        state.check_consistency().unwrap();
    }

    #[test]
    fn test_tag_change_marks_auras_dirty() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 1, 3);
        state.refresh_auras();
        assert!(!state.auras_dirty());

        let change = state.set_tag(a, Tag::Damage, 2).unwrap();
        assert_eq!(change, Some(TagChange { tag: Tag::Damage, old: 0, new: 2 }));
        assert!(state.auras_dirty());
        assert_eq!(state.health(a), 1);

        // Writing the same value again is not a change
        state.refresh_auras();
        assert_eq!(state.set_tag(a, Tag::Damage, 2).unwrap(), None);
        assert!(!state.auras_dirty());
    }

    #[test]
    fn test_enchantments_add_to_derived_tags() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 2, 2);
        let buff = state
            .create_entity(
                CardId(1),
                CardType::Enchantment,
                P0,
                Zone::Play,
                ZonePosition::Top,
                TagStore::new().with(Tag::Atk, 1).with(Tag::Health, 1),
            )
            .unwrap();
        state.attach(buff, a).unwrap();

        assert_eq!(state.tag(a, Tag::Atk), 3);
        assert_eq!(state.health(a), 3);
        // Enchantments are not minions
        assert_eq!(state.field(P0), vec![a]);
    }

    #[test]
    fn test_leaving_play_discards_enchantments() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 2, 2);
        let buff = state
            .create_entity(CardId(1), CardType::Enchantment, P0, Zone::Play, ZonePosition::Top, TagStore::new().with(Tag::Atk, 4))
            .unwrap();
        state.attach(buff, a).unwrap();

        state.move_entity(a, P0, Zone::Hand, ZonePosition::Top).unwrap();

        assert_eq!(state.zone_of(buff), Some(Zone::Graveyard));
        assert_eq!(state.tag(a, Tag::Atk), 2);
        assert!(state.entity(a).unwrap().enchantments.is_empty());
        state.check_consistency().unwrap();
    }

    #[test]
    fn test_mortal_wounds() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 1, 2);
        assert!(!state.is_mortally_wounded(a));

        state.add_tag(a, Tag::Damage, 2).unwrap();
        assert!(state.is_mortally_wounded(a));

        state.move_entity(a, P0, Zone::Graveyard, ZonePosition::Top).unwrap();
        assert!(!state.is_mortally_wounded(a));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = GameState::new();
        let a = minion(&mut state, P0, 1, 5);
        let checkpoint = state.clone();

        state.add_tag(a, Tag::Damage, 3).unwrap();
        state.move_entity(a, P0, Zone::Graveyard, ZonePosition::Top).unwrap();

        assert_eq!(checkpoint.health(a), 5);
        assert!(checkpoint.in_play(a));
        checkpoint.check_consistency().unwrap();
    }

    #[test]
    fn test_history() {
        let mut public = PublicState::new();
        public.record(P0, Command::EndTurn);
        public.record(P1, Command::EndTurn);
        assert_eq!(public.history.len(), 2);
        assert_eq!(public.history[1].sequence, 1);
    }
}
