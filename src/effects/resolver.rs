//! Effect resolution - applying one effect to the game state.
//!
//! [`EffectResolver::apply`] performs a single effect atomically and
//! reports what the resolution stack has to do next: the events it raised
//! (dispatched once the surrounding batch finishes) and the deaths it
//! caused. Neither lethal damage nor `Destroy` removes anything: both only
//! *mark* the entity, which stays in play until the batch ends. Every hit
//! of an area effect lands on the same board, and every death of a batch
//! is snapshotted (auras included) before any of them leaves play.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::effect::{Effect, SummonSource};
use crate::cards::definition::{CardDefinition, CardId, CardType};
use crate::cards::registry::CardRegistry;
use crate::core::config::GameConfig;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tags::Tag;
use crate::error::{EngineError, EngineResult};
use crate::triggers::{EventKind, GameEvent};
use crate::zones::{Zone, ZonePosition};

/// Read-only collaborators an effect may need.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub registry: &'a CardRegistry,
    pub config: &'a GameConfig,
}

impl<'a> ResolverContext<'a> {
    #[must_use]
    pub fn new(registry: &'a CardRegistry, config: &'a GameConfig) -> Self {
        Self { registry, config }
    }
}

/// What an entity looked like at the moment it died.
///
/// Deathrattles run from this record: the entity itself is already in the
/// graveyard and its auras no longer apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSnapshot {
    pub entity: EntityId,
    pub card: CardId,
    pub card_type: CardType,
    pub controller: PlayerId,
    /// Deathrattle present and not silenced.
    pub deathrattle: bool,
    /// How many times the deathrattle runs.
    pub multiplier: u32,
}

/// A death waiting for batch end. The entity is still in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingDeath {
    /// Lethally damaged.
    Marked(EntityId),
    /// Flagged by `Destroy`.
    Destroyed(EntityId),
}

impl PendingDeath {
    #[must_use]
    pub fn entity(self) -> EntityId {
        match self {
            PendingDeath::Marked(id) | PendingDeath::Destroyed(id) => id,
        }
    }
}

/// Outcome of one applied effect.
#[derive(Clone, Debug, Default)]
pub struct Resolved {
    pub events: SmallVec<[GameEvent; 2]>,
    pub deaths: SmallVec<[PendingDeath; 1]>,
}

/// Applies effects to game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply one effect.
    ///
    /// Effects aimed at entities that are no longer valid targets (left
    /// play, wrong type) do nothing. Errors are engine invariant failures.
    pub fn apply(state: &mut GameState, ctx: ResolverContext<'_>, effect: &Effect) -> EngineResult<Resolved> {
        let mut out = Resolved::default();
        match *effect {
            Effect::Hit { source, target, amount } => Self::hit(state, source, target, amount, &mut out)?,
            Effect::Heal { source, target, amount } => Self::heal(state, source, target, amount, &mut out)?,
            Effect::GainArmor { target, amount } => {
                if state.in_play(target) && amount > 0 {
                    state.add_tag(target, Tag::Armor, amount)?;
                }
            }
            Effect::GainMana { player, amount } => {
                state.player_mut(player).temp_mana += amount;
            }
            Effect::Summon { controller, what } => Self::summon(state, ctx, controller, what, &mut out)?,
            Effect::Buff { source, target, buff } => Self::buff(state, ctx, source, target, buff)?,
            Effect::Destroy { target } => Self::destroy(state, target, &mut out)?,
            Effect::Bounce { target } => Self::bounce(state, ctx, target)?,
            Effect::Silence { target } => Self::silence(state, target)?,
            Effect::Draw { player } => Self::draw(state, ctx, player, &mut out)?,
            Effect::Give { player, card } => {
                if state.hand(player).len() >= ctx.config.hand_limit {
                    debug!(%player, %card, "hand full; given card dropped");
                } else {
                    let def = Self::definition(ctx, card)?;
                    Self::create(state, def, player, Zone::Hand)?;
                }
            }
        }
        Ok(out)
    }

    fn hit(state: &mut GameState, source: EntityId, target: EntityId, amount: i32, out: &mut Resolved) -> EngineResult<()> {
        let Some(entity) = state.entity(target) else {
            return Ok(());
        };
        if entity.zone != Zone::Play || !entity.is_character() {
            return Ok(());
        }
        let controller = entity.controller;

        let percent = match state.tag(target, Tag::IncomingDamageMultiplier) {
            0 => 100,
            p => p,
        };
        let mut amount = amount.saturating_mul(percent) / 100;
        if amount <= 0 {
            return Ok(());
        }

        if state.has_tag(target, Tag::DivineShield) {
            state.set_tag(target, Tag::DivineShield, 0)?;
            debug!(%target, "divine shield absorbed the hit");
            return Ok(());
        }

        let armor = state.tag(target, Tag::Armor);
        if armor > 0 {
            let absorbed = armor.min(amount);
            state.add_tag(target, Tag::Armor, -absorbed)?;
            amount -= absorbed;
        }
        if amount == 0 {
            return Ok(());
        }

        state.add_tag(target, Tag::Damage, amount)?;
        out.events.push(GameEvent::damage(source, target, controller, amount));
        if state.is_mortally_wounded(target) {
            out.deaths.push(PendingDeath::Marked(target));
        }
        Ok(())
    }

    fn heal(state: &mut GameState, source: EntityId, target: EntityId, amount: i32, out: &mut Resolved) -> EngineResult<()> {
        let Some(entity) = state.entity(target) else {
            return Ok(());
        };
        if entity.zone != Zone::Play || !entity.is_character() || amount <= 0 {
            return Ok(());
        }
        let controller = entity.controller;
        let healed = entity.tags.get(Tag::Damage).min(amount);
        if healed > 0 {
            state.add_tag(target, Tag::Damage, -healed)?;
            out.events.push(
                GameEvent::new(EventKind::Heal)
                    .with_player(controller)
                    .with_source(source)
                    .with_target(target)
                    .with_amount(healed),
            );
        }
        Ok(())
    }

    fn summon(
        state: &mut GameState,
        ctx: ResolverContext<'_>,
        controller: PlayerId,
        what: SummonSource,
        out: &mut Resolved,
    ) -> EngineResult<()> {
        let (id, secret) = match what {
            SummonSource::Card(card) => {
                let def = Self::definition(ctx, card)?;
                let secret = def.is_secret();
                if !secret && state.field(controller).len() >= ctx.config.field_limit {
                    debug!(%controller, card = %def.code, "field full; summon dropped");
                    return Ok(());
                }
                let zone = if secret { Zone::Secret } else { Zone::Play };
                (Self::create(state, def, controller, zone)?, secret)
            }
            SummonSource::Existing(id) => {
                let Some(entity) = state.entity(id) else {
                    return Ok(());
                };
                if entity.zone.is_live() {
                    return Ok(());
                }
                let secret = entity.tags.has(Tag::Secret);
                if !secret && state.field(controller).len() >= ctx.config.field_limit {
                    debug!(%controller, %id, "field full; summon dropped");
                    return Ok(());
                }
                let zone = if secret { Zone::Secret } else { Zone::Play };
                state.move_entity(id, controller, zone, ZonePosition::Top)?;
                (id, secret)
            }
        };

        Self::activate(state, ctx.registry, id);
        if secret {
            debug!(%controller, %id, "secret put into play");
            return Ok(());
        }
        state.set_tag(id, Tag::Exhausted, 1)?;
        debug!(%controller, %id, "summoned");
        out.events.push(
            GameEvent::new(EventKind::Summon)
                .with_player(controller)
                .with_target(id),
        );
        Ok(())
    }

    fn buff(
        state: &mut GameState,
        ctx: ResolverContext<'_>,
        source: EntityId,
        target: EntityId,
        buff: CardId,
    ) -> EngineResult<()> {
        let Some(zone) = state.zone_of(target) else {
            return Ok(());
        };
        if !matches!(zone, Zone::Play | Zone::Hand) {
            return Ok(());
        }
        let def = Self::definition(ctx, buff)?;
        if def.card_type != CardType::Enchantment {
            return Err(EngineError::InvariantViolation(format!("{} is not an enchantment", def.code)));
        }
        let controller = state
            .controller(source)
            .or_else(|| state.controller(target))
            .ok_or_else(|| EngineError::InvariantViolation(format!("{target} has no controller")))?;
        let ench = Self::create(state, def, controller, Zone::Play)?;
        state.attach(ench, target)?;
        Self::activate(state, ctx.registry, ench);
        debug!(%target, buff = %def.code, "buffed");
        Ok(())
    }

    fn destroy(state: &mut GameState, target: EntityId, out: &mut Resolved) -> EngineResult<()> {
        let Some(entity) = state.entity(target) else {
            return Ok(());
        };
        let controller = entity.controller;
        match (entity.card_type, entity.zone) {
            (CardType::Enchantment, Zone::Play) => {
                state.detach(target)?;
                state.move_entity(target, controller, Zone::Graveyard, ZonePosition::Top)?;
                debug!(%target, "enchantment removed");
            }
            (_, Zone::Secret) => {
                state.move_entity(target, controller, Zone::Graveyard, ZonePosition::Top)?;
            }
            (CardType::Hero | CardType::Minion | CardType::Weapon, Zone::Play) => {
                state.set_tag(target, Tag::ToBeDestroyed, 1)?;
                debug!(%target, "marked for destruction");
                out.deaths.push(PendingDeath::Destroyed(target));
            }
            _ => {}
        }
        Ok(())
    }

    fn bounce(state: &mut GameState, ctx: ResolverContext<'_>, target: EntityId) -> EngineResult<()> {
        let Some(entity) = state.entity(target) else {
            return Ok(());
        };
        if entity.zone != Zone::Play || !entity.is_minion() {
            return Ok(());
        }
        let owner = entity.owner;
        let card = entity.card;
        if state.hand(owner).len() >= ctx.config.hand_limit {
            debug!(%target, "hand full; bounced minion discarded");
            state.move_entity(target, owner, Zone::Graveyard, ZonePosition::Top)?;
            return Ok(());
        }
        state.move_entity(target, owner, Zone::Hand, ZonePosition::Top)?;
        let def = Self::definition(ctx, card)?;
        state.reset_tags(target, def.tags.clone())?;
        debug!(%target, "returned to hand");
        Ok(())
    }

    fn silence(state: &mut GameState, target: EntityId) -> EngineResult<()> {
        let Some(entity) = state.entity(target) else {
            return Ok(());
        };
        if entity.zone != Zone::Play || !entity.is_character() {
            return Ok(());
        }
        let controller = entity.controller;
        for ench in state.strip_enchantments(target)? {
            state.move_entity(ench, controller, Zone::Graveyard, ZonePosition::Top)?;
        }
        state.deactivate(target);
        for tag in Tag::SILENCEABLE {
            state.set_tag(target, tag, 0)?;
        }
        state.set_tag(target, Tag::Silenced, 1)?;
        debug!(%target, "silenced");
        Ok(())
    }

    fn draw(state: &mut GameState, ctx: ResolverContext<'_>, player: PlayerId, out: &mut Resolved) -> EngineResult<()> {
        let Some(card) = state.zones().top(player, Zone::Deck) else {
            let hero = state.player(player).hero;
            let fatigue = {
                let p = state.player_mut(player);
                p.fatigue += 1;
                p.fatigue
            };
            debug!(%player, fatigue, "fatigue");
            return Self::hit(state, hero, hero, fatigue, out);
        };
        if state.hand(player).len() >= ctx.config.hand_limit {
            debug!(%player, %card, "hand full; drawn card burned");
            state.move_entity(card, player, Zone::Graveyard, ZonePosition::Top)?;
            return Ok(());
        }
        state.move_entity(card, player, Zone::Hand, ZonePosition::Top)?;
        out.events.push(
            GameEvent::new(EventKind::CardDrawn)
                .with_player(player)
                .with_target(card),
        );
        Ok(())
    }

    /// Record how an in-play entity dies, before anything moves.
    #[must_use]
    pub fn snapshot(state: &GameState, id: EntityId) -> Option<DeathSnapshot> {
        let entity = state.entity(id)?;
        let extra = state.has_tag(id, Tag::ExtraDeathrattles);
        Some(DeathSnapshot {
            entity: id,
            card: entity.card,
            card_type: entity.card_type,
            controller: entity.controller,
            deathrattle: state.has_deathrattle(id),
            multiplier: if extra { 2 } else { 1 },
        })
    }

    /// Move a dead entity to the graveyard and update its player.
    pub fn kill(state: &mut GameState, snapshot: &DeathSnapshot) -> EngineResult<()> {
        let id = snapshot.entity;
        let controller = snapshot.controller;
        state.move_entity(id, controller, Zone::Graveyard, ZonePosition::Top)?;
        state.set_tag(id, Tag::ToBeDestroyed, 0)?;
        match snapshot.card_type {
            CardType::Hero => {
                debug!(player = %controller, "hero destroyed");
                state.player_mut(controller).lost = true;
            }
            CardType::Weapon => {
                let player = state.player_mut(controller);
                if player.weapon == Some(id) {
                    player.weapon = None;
                }
            }
            _ => {}
        }
        debug!(%id, "died");
        Ok(())
    }

    /// Subscribe an entity's script, if its card has one.
    pub fn activate(state: &mut GameState, registry: &CardRegistry, id: EntityId) {
        let Some(card) = state.card_of(id) else {
            return;
        };
        if let (Some(def), Some(script)) = (registry.definition(card), registry.script(card)) {
            state.activate(id, &def.name, script);
        }
    }

    /// Create an entity from a definition's base tags.
    pub fn create(state: &mut GameState, def: &CardDefinition, controller: PlayerId, zone: Zone) -> EngineResult<EntityId> {
        state.create_entity(def.id, def.card_type, controller, zone, ZonePosition::Top, def.tags.clone())
    }

    fn definition<'r>(ctx: ResolverContext<'r>, card: CardId) -> EngineResult<&'r CardDefinition> {
        ctx.registry
            .definition(card)
            .ok_or_else(|| EngineError::InvariantViolation(format!("{card} is not registered")))
    }
}
