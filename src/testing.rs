//! Scenario helpers for tests, built under `cfg(test)` or the `testing`
//! feature.
//!
//! A [`Fixture`] is a game already in its first turn with empty decks
//! and empty hands, so a test can build the exact board it needs.
//! Helpers panic on failure; they are test tooling, not engine API.

use std::sync::Arc;

use crate::cards::registry::CardRegistry;
use crate::core::config::GameConfig;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::tags::Tag;
use crate::effects::{Effect, SummonSource};
use crate::rules::{Game, PlayerSetup};

/// A started game on turn one, first player to act.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub game: Game,
}

impl Fixture {
    /// Mage versus Warrior, no starting cards and no coin.
    #[must_use]
    pub fn new(registry: impl Into<Arc<CardRegistry>>) -> Self {
        Self::with_config(registry, GameConfig::new().with_starting_hand(0, 0).without_coin())
    }

    #[must_use]
    pub fn with_config(registry: impl Into<Arc<CardRegistry>>, config: GameConfig) -> Self {
        let players = [PlayerSetup::new("Jaina", "HERO_08"), PlayerSetup::new("Garrosh", "HERO_01")];
        let mut game = Game::new(registry, config, 0x5EED, players).unwrap_or_else(|e| panic!("fixture setup: {e}"));
        game.start_game().unwrap_or_else(|e| panic!("fixture start: {e}"));
        for player in [PlayerId(0), PlayerId(1)] {
            game.mulligan(player, &[]).unwrap_or_else(|e| panic!("fixture mulligan: {e}"));
        }

        // The opening draw from an empty deck dealt fatigue
        let state = game.state_mut();
        for player in [PlayerId(0), PlayerId(1)] {
            let hero = state.player(player).hero;
            state.set_tag(hero, Tag::Damage, 0).unwrap_or_else(|e| panic!("fixture reset: {e}"));
            state.player_mut(player).fatigue = 0;
        }
        Self { game }
    }

    #[must_use]
    pub fn hero(&self, player: PlayerId) -> EntityId {
        self.game.state().player(player).hero
    }

    /// Summon a fresh minion; returns it (rightmost on the field).
    pub fn summon(&mut self, player: PlayerId, code: &str) -> EntityId {
        let card = self.lookup(code);
        self.apply(
            player,
            Effect::Summon {
                controller: player,
                what: SummonSource::Card(card),
            },
        );
        *self
            .game
            .state()
            .field(player)
            .last()
            .unwrap_or_else(|| panic!("{code} was not summoned"))
    }

    /// Put a fresh card into a hand; returns it.
    pub fn give(&mut self, player: PlayerId, code: &str) -> EntityId {
        let card = self.lookup(code);
        self.apply(player, Effect::Give { player, card });
        *self
            .game
            .state()
            .hand(player)
            .last()
            .unwrap_or_else(|| panic!("{code} was not given"))
    }

    /// Damage from the opposing hero.
    pub fn damage(&mut self, target: EntityId, amount: i32) {
        let player = self.controller(target);
        let source = self.hero(player.opponent());
        self.apply(player.opponent(), Effect::Hit { source, target, amount });
    }

    pub fn destroy(&mut self, target: EntityId) {
        let player = self.controller(target);
        self.apply(player, Effect::Destroy { target });
    }

    pub fn silence(&mut self, target: EntityId) {
        let player = self.controller(target);
        self.apply(player, Effect::Silence { target });
    }

    /// Set a player's crystals, all unspent.
    pub fn set_mana(&mut self, player: PlayerId, mana: i32) {
        let seat = self.game.state_mut().player_mut(player);
        seat.max_mana = mana;
        seat.used_mana = 0;
    }

    fn controller(&self, entity: EntityId) -> PlayerId {
        self.game
            .state()
            .controller(entity)
            .unwrap_or_else(|| panic!("{entity} does not exist"))
    }

    fn lookup(&self, code: &str) -> crate::cards::CardId {
        self.game
            .registry()
            .lookup(code)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn apply(&mut self, player: PlayerId, effect: Effect) {
        let source = self.hero(player);
        self.game
            .apply_effects(source, vec![effect])
            .unwrap_or_else(|e| panic!("fixture effect failed: {e}"));
    }
}
