//! Serializable views of a game.
//!
//! Views hold resolved values (enchantments and auras applied), so a
//! client never needs the registries to show a board.

use serde::{Deserialize, Serialize};

use crate::cards::definition::CardType;
use crate::cards::registry::CardRegistry;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::{GameState, Phase};
use crate::core::tags::Tag;
use crate::rules::{Game, GameResult};
use crate::zones::Zone;

/// Tags shown in views, in this order.
const SHOWN: [Tag; 16] = [
    Tag::Cost,
    Tag::Atk,
    Tag::Health,
    Tag::Damage,
    Tag::Armor,
    Tag::Durability,
    Tag::Taunt,
    Tag::Charge,
    Tag::DivineShield,
    Tag::Windfury,
    Tag::Stealth,
    Tag::Frozen,
    Tag::Silenced,
    Tag::Exhausted,
    Tag::Deathrattle,
    Tag::ExtraDeathrattles,
];

/// One entity with its resolved tags; zero-valued tags are omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub card_type: CardType,
    pub controller: PlayerId,
    pub zone: Zone,
    pub tags: Vec<(Tag, i32)>,
}

impl EntityView {
    #[must_use]
    pub fn capture(state: &GameState, registry: &CardRegistry, id: EntityId) -> Option<Self> {
        let entity = state.entity(id)?;
        let def = registry.definition(entity.card)?;
        Some(Self {
            id,
            code: def.code.clone(),
            name: def.name.clone(),
            card_type: entity.card_type,
            controller: entity.controller,
            zone: entity.zone,
            tags: SHOWN
                .iter()
                .map(|&tag| (tag, state.tag(id, tag)))
                .filter(|&(_, value)| value != 0)
                .collect(),
        })
    }

    #[must_use]
    pub fn get(&self, tag: Tag) -> i32 {
        self.tags
            .iter()
            .find(|(t, _)| *t == tag)
            .map_or(0, |&(_, value)| value)
    }
}

/// One seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub name: String,
    pub mana: i32,
    pub max_mana: i32,
    pub fatigue: i32,
    pub hero: Option<EntityView>,
    pub power: Option<EntityView>,
    pub weapon: Option<EntityView>,
    pub field: Vec<EntityView>,
    pub hand: Vec<EntityView>,
    pub secrets: Vec<EntityView>,
    pub deck_size: usize,
    pub graveyard_size: usize,
}

impl PlayerView {
    #[must_use]
    pub fn capture(state: &GameState, registry: &CardRegistry, player: PlayerId) -> Self {
        let seat = state.player(player);
        let views = |ids: &[EntityId]| -> Vec<EntityView> {
            ids.iter()
                .filter_map(|&id| EntityView::capture(state, registry, id))
                .collect()
        };
        Self {
            player,
            name: seat.name.clone(),
            mana: seat.mana(),
            max_mana: seat.max_mana,
            fatigue: seat.fatigue,
            hero: EntityView::capture(state, registry, seat.hero),
            power: EntityView::capture(state, registry, seat.power),
            weapon: seat.weapon.and_then(|w| EntityView::capture(state, registry, w)),
            field: views(&state.field(player)),
            hand: views(state.hand(player)),
            secrets: views(state.secrets(player)),
            deck_size: state.deck(player).len(),
            graveyard_size: state.graveyard(player).len(),
        }
    }
}

/// Whole-game view.
///
/// ```
/// use tavern::cards::CardRegistry;
/// use tavern::core::GameConfig;
/// use tavern::rules::{Game, PlayerSetup};
/// use tavern::view::GameSnapshot;
///
/// let players = [PlayerSetup::new("A", "HERO_08"), PlayerSetup::new("B", "HERO_01")];
/// let game = Game::new(CardRegistry::standard(), GameConfig::new(), 7, players).unwrap();
/// let snapshot = GameSnapshot::capture(&game);
/// assert_eq!(snapshot.players.len(), 2);
/// assert_eq!(snapshot.turn, 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub turn: u32,
    pub current_player: PlayerId,
    pub result: Option<GameResult>,
    pub aborted: bool,
    pub players: Vec<PlayerView>,
}

impl GameSnapshot {
    #[must_use]
    pub fn capture(game: &Game) -> Self {
        let state = game.state();
        let registry = game.registry();
        Self {
            phase: state.phase(),
            turn: state.turn(),
            current_player: state.current_player(),
            result: state.result(),
            aborted: game.is_aborted(),
            players: state
                .players()
                .map(|(player, _)| PlayerView::capture(state, registry, player))
                .collect(),
        }
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|view| view.player == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    #[test]
    fn test_view_reports_resolved_tags() {
        let mut fx = Fixture::new(CardRegistry::standard());
        fx.summon(P0, "CS2_122");
        let raptor = fx.summon(P0, "CS2_172");
        fx.damage(raptor, 1);

        let snapshot = GameSnapshot::capture(&fx.game);
        let mine = snapshot.player(P0).unwrap();
        let view = mine.field.iter().find(|v| v.id == raptor).unwrap();

        // Raid Leader's aura applies
        assert_eq!(view.get(Tag::Atk), 4);
        assert_eq!(view.get(Tag::Damage), 1);
        assert_eq!(view.get(Tag::Taunt), 0);
        assert_eq!(view.code, "CS2_172");
        assert_eq!(view.zone, Zone::Play);
        assert_eq!(snapshot.player(P1).unwrap().field.len(), 0);
    }

    #[test]
    fn test_view_of_fresh_game() {
        let fx = Fixture::new(CardRegistry::standard());
        let snapshot = GameSnapshot::capture(&fx.game);
        assert_eq!(snapshot.phase, Phase::Main);
        assert_eq!(snapshot.turn, 1);
        let first = snapshot.player(P0).unwrap();
        assert_eq!(first.hero.as_ref().map(|h| h.get(Tag::Health)), Some(30));
        assert_eq!(first.power.as_ref().map(|p| p.code.as_str()), Some("CS2_034"));
        assert!(first.weapon.is_none());
        assert_eq!(first.deck_size, 0);
    }
}
