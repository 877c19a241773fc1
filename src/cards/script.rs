//! Card behavior: play actions, deathrattles, event hooks and auras.
//!
//! A [`CardScript`] is plain data holding closures. Scripts never mutate
//! the game directly: every handler receives a [`ScriptContext`] that
//! reads the current state and queues [`Effect`]s. The resolution stack
//! applies the queue after the handler returns, so a handler that fails
//! part-way leaves no trace.
//!
//! ```
//! use tavern::cards::CardScript;
//! use tavern::triggers::Hook;
//!
//! // Shade of Naxxramas: grows at the start of its controller's turn
//! let shade = CardScript::new().on(Hook::OwnTurnBegin, |ctx, _event| {
//!     let me = ctx.source();
//!     ctx.buff(me, "FP1_005e")
//! });
//! assert_eq!(shade.hooks.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use super::definition::{CardDefinition, CardId};
use super::registry::CardRegistry;
use crate::auras::AuraDescriptor;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::core::state::GameState;
use crate::core::tags::Tag;
use crate::effects::{Effect, SummonSource};
use crate::error::ScriptError;
use crate::triggers::{EventKind, GameEvent, Hook, TriggerCondition};

/// Play action (battlecry or spell text). Receives the validated target.
pub type ActionFn =
    Arc<dyn Fn(&mut ScriptContext<'_>, Option<EntityId>) -> Result<(), ScriptError> + Send + Sync>;

/// Deathrattle; the context's source is the dead entity.
pub type DeathrattleFn = Arc<dyn Fn(&mut ScriptContext<'_>) -> Result<(), ScriptError> + Send + Sync>;

/// Event hook handler.
pub type EventHandler =
    Arc<dyn Fn(&mut ScriptContext<'_>, &GameEvent) -> Result<(), ScriptError> + Send + Sync>;

/// Wrap a closure as an [`EventHandler`].
pub fn event_handler(
    f: impl Fn(&mut ScriptContext<'_>, &GameEvent) -> Result<(), ScriptError> + Send + Sync + 'static,
) -> EventHandler {
    Arc::new(f)
}

/// One event subscription declared by a script.
#[derive(Clone)]
pub struct EventHook {
    pub kind: EventKind,
    pub condition: TriggerCondition,
    pub handler: EventHandler,
}

/// Behavior attached to a card definition. Absent parts are no-ops.
#[derive(Clone, Default)]
pub struct CardScript {
    pub action: Option<ActionFn>,
    pub deathrattle: Option<DeathrattleFn>,
    pub hooks: Vec<EventHook>,
    pub aura: Option<Arc<AuraDescriptor>>,
}

impl CardScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: play action.
    #[must_use]
    pub fn on_play(
        mut self,
        f: impl Fn(&mut ScriptContext<'_>, Option<EntityId>) -> Result<(), ScriptError> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Arc::new(f));
        self
    }

    /// Builder: deathrattle.
    #[must_use]
    pub fn deathrattle(
        mut self,
        f: impl Fn(&mut ScriptContext<'_>) -> Result<(), ScriptError> + Send + Sync + 'static,
    ) -> Self {
        self.deathrattle = Some(Arc::new(f));
        self
    }

    /// Builder: subscribe through a predefined [`Hook`].
    #[must_use]
    pub fn on(
        self,
        hook: Hook,
        f: impl Fn(&mut ScriptContext<'_>, &GameEvent) -> Result<(), ScriptError> + Send + Sync + 'static,
    ) -> Self {
        self.on_event(hook.kind(), hook.condition(), f)
    }

    /// Builder: subscribe to any event kind with an explicit condition.
    #[must_use]
    pub fn on_event(
        mut self,
        kind: EventKind,
        condition: TriggerCondition,
        f: impl Fn(&mut ScriptContext<'_>, &GameEvent) -> Result<(), ScriptError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push(EventHook {
            kind,
            condition,
            handler: Arc::new(f),
        });
        self
    }

    /// Builder: continuous aura while in play.
    #[must_use]
    pub fn aura(mut self, descriptor: AuraDescriptor) -> Self {
        self.aura = Some(Arc::new(descriptor));
        self
    }

    /// Whether the script does nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.deathrattle.is_none() && self.hooks.is_empty() && self.aura.is_none()
    }
}

impl fmt::Debug for CardScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardScript")
            .field("action", &self.action.is_some())
            .field("deathrattle", &self.deathrattle.is_some())
            .field("hooks", &self.hooks.iter().map(|h| h.kind).collect::<Vec<_>>())
            .field("aura", &self.aura.as_ref().map(|a| a.name.as_str()))
            .finish()
    }
}

/// What a running handler sees and how it requests changes.
///
/// Reads go to the state as it was when the handler started. Queued
/// effects are applied in order once the handler returns `Ok`.
pub struct ScriptContext<'a> {
    state: &'a GameState,
    registry: &'a CardRegistry,
    rng: &'a mut GameRng,
    source: EntityId,
    controller: PlayerId,
    effects: Vec<Effect>,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        state: &'a GameState,
        registry: &'a CardRegistry,
        rng: &'a mut GameRng,
        source: EntityId,
        controller: PlayerId,
    ) -> Self {
        Self {
            state,
            registry,
            rng,
            source,
            controller,
            effects: Vec::new(),
        }
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    // === Reads ===

    #[must_use]
    pub fn state(&self) -> &'a GameState {
        self.state
    }

    /// The entity whose script is running.
    #[must_use]
    pub fn source(&self) -> EntityId {
        self.source
    }

    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.controller
    }

    #[must_use]
    pub fn opponent(&self) -> PlayerId {
        self.controller.opponent()
    }

    #[must_use]
    pub fn hero(&self, player: PlayerId) -> EntityId {
        self.state.player(player).hero
    }

    #[must_use]
    pub fn field(&self, player: PlayerId) -> Vec<EntityId> {
        self.state.field(player)
    }

    /// Every minion in play, first player's field first.
    #[must_use]
    pub fn all_minions(&self) -> Vec<EntityId> {
        self.state.board()
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &'a [EntityId] {
        self.state.hand(player)
    }

    #[must_use]
    pub fn deck(&self, player: PlayerId) -> &'a [EntityId] {
        self.state.deck(player)
    }

    #[must_use]
    pub fn tag(&self, entity: EntityId, tag: Tag) -> i32 {
        self.state.tag(entity, tag)
    }

    #[must_use]
    pub fn has_deathrattle(&self, entity: EntityId) -> bool {
        self.state.has_deathrattle(entity)
    }

    /// Definition of an entity's card.
    #[must_use]
    pub fn definition(&self, entity: EntityId) -> Option<&'a CardDefinition> {
        self.state.card_of(entity).and_then(|card| self.registry.definition(card))
    }

    /// Definition of the running entity's card.
    pub fn own_definition(&self) -> Result<&'a CardDefinition, ScriptError> {
        self.definition(self.source)
            .ok_or_else(|| ScriptError::Malformed(format!("{} has no definition", self.source)))
    }

    /// Resolve a card code.
    pub fn card(&self, code: &str) -> Result<CardId, ScriptError> {
        self.registry.lookup(code)
    }

    // === Randomness ===

    /// Uniform pick; `None` on an empty slice.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        self.rng.choose(items).copied()
    }

    // === Effects ===

    /// Queue a raw effect.
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn hit(&mut self, target: EntityId, amount: i32) {
        self.push(Effect::Hit {
            source: self.source,
            target,
            amount,
        });
    }

    pub fn heal(&mut self, target: EntityId, amount: i32) {
        self.push(Effect::Heal {
            source: self.source,
            target,
            amount,
        });
    }

    pub fn gain_armor(&mut self, target: EntityId, amount: i32) {
        self.push(Effect::GainArmor { target, amount });
    }

    /// Mana usable this turn only.
    pub fn gain_mana(&mut self, player: PlayerId, amount: i32) {
        self.push(Effect::GainMana { player, amount });
    }

    /// Summon a fresh copy of a card by code.
    pub fn summon(&mut self, controller: PlayerId, code: &str) -> Result<(), ScriptError> {
        let card = self.card(code)?;
        self.summon_card(controller, card);
        Ok(())
    }

    pub fn summon_card(&mut self, controller: PlayerId, card: CardId) {
        self.push(Effect::Summon {
            controller,
            what: SummonSource::Card(card),
        });
    }

    /// Put an existing entity (from deck or hand) into play.
    pub fn summon_existing(&mut self, controller: PlayerId, entity: EntityId) {
        self.push(Effect::Summon {
            controller,
            what: SummonSource::Existing(entity),
        });
    }

    /// Attach an enchantment card by code.
    pub fn buff(&mut self, target: EntityId, code: &str) -> Result<(), ScriptError> {
        let buff = self.card(code)?;
        self.push(Effect::Buff {
            source: self.source,
            target,
            buff,
        });
        Ok(())
    }

    pub fn destroy(&mut self, target: EntityId) {
        self.push(Effect::Destroy { target });
    }

    pub fn bounce(&mut self, target: EntityId) {
        self.push(Effect::Bounce { target });
    }

    pub fn silence(&mut self, target: EntityId) {
        self.push(Effect::Silence { target });
    }

    pub fn draw(&mut self, player: PlayerId) {
        self.push(Effect::Draw { player });
    }

    /// Create a card by code in a player's hand.
    pub fn give(&mut self, player: PlayerId, code: &str) -> Result<(), ScriptError> {
        let card = self.card(code)?;
        self.push(Effect::Give { player, card });
        Ok(())
    }

    /// Number of effects queued so far.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auras::{AuraModifier, AuraScope};

    #[test]
    fn test_builders() {
        let script = CardScript::new()
            .on_play(|_, _| Ok(()))
            .deathrattle(|_| Ok(()))
            .on(Hook::OwnTurnEnd, |_, _| Ok(()))
            .aura(AuraDescriptor::new("Banner", AuraScope::FriendlyMinions, AuraModifier::Add(Tag::Atk, 1)));

        assert!(script.action.is_some());
        assert!(script.deathrattle.is_some());
        assert_eq!(script.hooks.len(), 1);
        assert_eq!(script.hooks[0].kind, EventKind::TurnEnd);
        assert_eq!(script.hooks[0].condition, TriggerCondition::OwnersTurn);
        assert!(!script.is_empty());
        assert!(CardScript::new().is_empty());
    }

    #[test]
    fn test_context_queues_in_order() {
        let registry = CardRegistry::standard();
        let state = GameState::new();
        let mut rng = GameRng::new(1);
        let mut ctx = ScriptContext::new(&state, &registry, &mut rng, EntityId(3), PlayerId(0));

        ctx.hit(EntityId(7), 2);
        ctx.summon(PlayerId(0), "FP1_002t").unwrap();
        ctx.draw(PlayerId(1));

        let effects = ctx.into_effects();
        assert_eq!(effects.len(), 3);
        assert_eq!(
            effects[0],
            Effect::Hit {
                source: EntityId(3),
                target: EntityId(7),
                amount: 2
            }
        );
        assert!(matches!(effects[1], Effect::Summon { what: SummonSource::Card(_), .. }));
        assert_eq!(effects[2], Effect::Draw { player: PlayerId(1) });
    }

    #[test]
    fn test_unknown_card_is_a_script_error() {
        let registry = CardRegistry::standard();
        let state = GameState::new();
        let mut rng = GameRng::new(1);
        let mut ctx = ScriptContext::new(&state, &registry, &mut rng, EntityId(3), PlayerId(0));

        let err = ctx.summon(PlayerId(0), "NOPE_404").unwrap_err();
        assert_eq!(err, ScriptError::UnknownCard("NOPE_404".into()));
        assert_eq!(ctx.queued(), 0);
    }

    #[test]
    fn test_choose_empty() {
        let registry = CardRegistry::standard();
        let state = GameState::new();
        let mut rng = GameRng::new(1);
        let mut ctx = ScriptContext::new(&state, &registry, &mut rng, EntityId(3), PlayerId(0));

        let empty: [EntityId; 0] = [];
        assert_eq!(ctx.choose(&empty), None);
        assert_eq!(ctx.choose(&[EntityId(9)]), Some(EntityId(9)));
    }
}
