use std::sync::Arc;

use tracing::debug;

use crate::cards::definition::CardClass;
use crate::cards::registry::CardRegistry;
use crate::core::config::GameConfig;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::error::EngineResult;
use crate::rules::{Game, PlayerSetup};

/// Cards above this cost are sent back during the mulligan.
const MULLIGAN_ABOVE: i32 = 3;

/// Create a game and play it into the first turn: decks shuffled, hands
/// dealt, expensive cards mulliganed, coin handed out.
pub fn setup_game(
    registry: Arc<CardRegistry>,
    config: GameConfig,
    seed: u64,
    players: [PlayerSetup; 2],
) -> EngineResult<Game> {
    let mut game = Game::new(registry, config, seed, players)?;
    game.start_game()?;
    for player in [PlayerId(0), PlayerId(1)] {
        let state = game.state();
        let replace: Vec<EntityId> = state
            .hand(player)
            .iter()
            .copied()
            .filter(|&card| state.cost(card) > MULLIGAN_ABOVE)
            .collect();
        game.mulligan(player, &replace)?;
    }
    Ok(game)
}

/// Mage against Warrior with randomly drafted decks.
pub fn setup_random_game(registry: Arc<CardRegistry>, seed: u64) -> EngineResult<Game> {
    let config = GameConfig::new();
    let mut rng = GameRng::new(seed);
    let mut draft = rng.fork();
    let mage = registry.random_draft(CardClass::Mage, &mut draft, config.deck_size)?;
    let warrior = registry.random_draft(CardClass::Warrior, &mut draft, config.deck_size)?;
    debug!(seed, "decks drafted");

    let players = [
        PlayerSetup::new("Mage", "HERO_08").with_deck(mage),
        PlayerSetup::new("Warrior", "HERO_01").with_deck(warrior),
    ];
    setup_game(registry, config, seed, players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Phase;

    #[test]
    fn test_random_game_reaches_first_turn() {
        let game = setup_random_game(Arc::new(CardRegistry::standard()), 5).unwrap();
        let state = game.state();

        assert_eq!(state.phase(), Phase::Main);
        assert_eq!(state.turn(), 1);
        // 30 cards each: 3 + 1 drawn for the first player, 4 for the second
        assert_eq!(state.deck(PlayerId(0)).len() + state.hand(PlayerId(0)).len(), 30);
        assert_eq!(state.deck(PlayerId(1)).len() + state.hand(PlayerId(1)).len(), 31);
        assert_eq!(state.hand(PlayerId(1)).len(), 5);
    }

    #[test]
    fn test_same_seed_same_decks() {
        let registry = Arc::new(CardRegistry::standard());
        let a = setup_random_game(Arc::clone(&registry), 9).unwrap();
        let b = setup_random_game(registry, 9).unwrap();

        let cards = |game: &Game, player| -> Vec<_> {
            let state = game.state();
            state.hand(player).iter().filter_map(|&e| state.card_of(e)).collect()
        };
        assert_eq!(cards(&a, PlayerId(0)), cards(&b, PlayerId(0)));
        assert_eq!(cards(&a, PlayerId(1)), cards(&b, PlayerId(1)));
    }
}
