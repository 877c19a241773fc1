//! Death processing and deathrattle integration tests.
//!
//! Each scenario builds a board with the test fixture, kills something
//! and checks the board after the whole resolution has settled.

use tavern::cards::CardRegistry;
use tavern::core::{EntityId, GameState, PlayerId, Tag};
use tavern::effects::Effect;
use tavern::testing::Fixture;
use tavern::zones::Zone;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

fn code_of(fx: &Fixture, entity: EntityId) -> String {
    let card = fx.game.state().card_of(entity).unwrap();
    fx.game.registry().definition(card).unwrap().code.clone()
}

fn codes(fx: &Fixture, entities: &[EntityId]) -> Vec<String> {
    entities.iter().map(|&e| code_of(fx, e)).collect()
}

fn live_copies(state: &GameState, entity: EntityId) -> usize {
    let card = state.card_of(entity).unwrap();
    state
        .entities()
        .filter(|e| e.card == card && matches!(e.zone, Zone::Play | Zone::Hand | Zone::Deck))
        .count()
}

/// Haunted Creeper leaves exactly two spiders and no copy of itself.
#[test]
fn test_haunted_creeper_summons_two_spiders() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let creeper = fx.summon(P0, "FP1_002");

    fx.destroy(creeper);

    let field = fx.game.state().field(P0);
    assert_eq!(codes(&fx, &field), vec!["FP1_002t", "FP1_002t"]);
    assert_eq!(fx.game.state().zone_of(creeper), Some(Zone::Graveyard));
    assert_eq!(live_copies(fx.game.state(), creeper), 0);
}

/// Lethal damage goes through the same deathrattle path as destroy.
#[test]
fn test_deathrattle_after_lethal_damage() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let egg = fx.summon(P0, "FP1_007");

    fx.damage(egg, 2);

    let state = fx.game.state();
    let field = state.field(P0);
    assert_eq!(codes(&fx, &field), vec!["FP1_007t"]);
    assert_eq!(state.attack(field[0]), 4);
    assert_eq!(state.health(field[0]), 4);
}

/// Baron Rivendare makes other deathrattles fire twice.
#[test]
fn test_rivendare_doubles_deathrattles() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.summon(P0, "FP1_031");
    let creeper = fx.summon(P0, "FP1_002");
    assert!(fx.game.state().has_tag(creeper, Tag::ExtraDeathrattles));

    fx.destroy(creeper);

    let field = fx.game.state().field(P0);
    assert_eq!(
        codes(&fx, &field),
        vec!["FP1_031", "FP1_002t", "FP1_002t", "FP1_002t", "FP1_002t"]
    );
}

/// Rivendare dying alongside the creeper still doubles it: the
/// multiplier is read when the creeper dies, before anything leaves play.
#[test]
fn test_rivendare_multiplier_snapshotted_at_death() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let baron = fx.summon(P0, "FP1_031");
    let creeper = fx.summon(P0, "FP1_002");
    let source = fx.hero(P1);

    fx.game
        .apply_effects(
            source,
            vec![
                Effect::Hit { source, target: baron, amount: 7 },
                Effect::Hit { source, target: creeper, amount: 2 },
            ],
        )
        .unwrap();

    let state = fx.game.state();
    assert_eq!(state.zone_of(baron), Some(Zone::Graveyard));
    assert_eq!(codes(&fx, &state.field(P0)), vec!["FP1_002t"; 4]);
}

fn destroy_together(fx: &mut Fixture, first: EntityId, second: EntityId) {
    let source = fx.hero(P1);
    fx.game
        .apply_effects(
            source,
            vec![Effect::Destroy { target: first }, Effect::Destroy { target: second }],
        )
        .unwrap();
}

/// Destroying Rivendare first in the same batch still doubles the creeper.
#[test]
fn test_rivendare_destroyed_first_in_batch() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let baron = fx.summon(P0, "FP1_031");
    let creeper = fx.summon(P0, "FP1_002");

    destroy_together(&mut fx, baron, creeper);

    let state = fx.game.state();
    assert_eq!(state.zone_of(baron), Some(Zone::Graveyard));
    assert_eq!(state.zone_of(creeper), Some(Zone::Graveyard));
    assert!(!state.has_tag(creeper, Tag::ToBeDestroyed));
    assert_eq!(codes(&fx, &state.field(P0)), vec!["FP1_002t"; 4]);
}

/// Same batch, creeper first: the order of the kills does not matter.
#[test]
fn test_rivendare_destroyed_second_in_batch() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let baron = fx.summon(P0, "FP1_031");
    let creeper = fx.summon(P0, "FP1_002");

    destroy_together(&mut fx, creeper, baron);

    assert_eq!(codes(&fx, &fx.game.state().field(P0)), vec!["FP1_002t"; 4]);
}

/// Destroy and Bounce in one batch: the minion ends in hand either way
/// and its deathrattle never runs.
#[test]
fn test_destroy_then_bounce_in_one_batch() {
    for destroy_first in [true, false] {
        let mut fx = Fixture::new(CardRegistry::standard());
        let creeper = fx.summon(P0, "FP1_002");
        let source = fx.hero(P1);
        let mut effects = vec![Effect::Destroy { target: creeper }, Effect::Bounce { target: creeper }];
        if !destroy_first {
            effects.reverse();
        }

        fx.game.apply_effects(source, effects).unwrap();

        let state = fx.game.state();
        assert_eq!(state.zone_of(creeper), Some(Zone::Hand), "destroy first: {destroy_first}");
        assert!(state.field(P0).is_empty(), "destroy first: {destroy_first}");
        assert!(!state.has_tag(creeper, Tag::ToBeDestroyed));
    }
}

/// A destroyed minion's aura lasts until its batch is over.
#[test]
fn test_destroyed_aura_source_holds_until_batch_end() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let baron = fx.summon(P0, "FP1_031");
    let creeper = fx.summon(P0, "FP1_002");
    let egg = fx.summon(P0, "FP1_007");
    let source = fx.hero(P1);

    fx.game
        .apply_effects(
            source,
            vec![
                Effect::Destroy { target: baron },
                Effect::Hit { source, target: egg, amount: 2 },
                Effect::Destroy { target: creeper },
            ],
        )
        .unwrap();

    let field = fx.game.state().field(P0);
    let mut found = codes(&fx, &field);
    found.sort();
    assert_eq!(found, vec!["FP1_002t", "FP1_002t", "FP1_002t", "FP1_002t", "FP1_007t", "FP1_007t"]);
}

/// Rivendare does not double his own deathrattle-free death or enemy ones.
#[test]
fn test_rivendare_only_affects_friendly_minions() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.summon(P0, "FP1_031");
    let enemy = fx.summon(P1, "FP1_002");

    fx.destroy(enemy);

    assert_eq!(fx.game.state().field(P1).len(), 2);
}

/// Unstable Ghoul's blast resolves against one board.
#[test]
fn test_unstable_ghoul_hits_every_minion() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let ghoul = fx.summon(P0, "FP1_024");
    let raptor = fx.summon(P0, "CS2_172");
    let archers = [fx.summon(P1, "CS2_189"), fx.summon(P1, "CS2_189")];

    fx.destroy(ghoul);

    let state = fx.game.state();
    assert_eq!(state.health(raptor), 1);
    for archer in archers {
        assert_eq!(state.zone_of(archer), Some(Zone::Graveyard));
    }
    assert!(state.field(P1).is_empty());
}

/// Two ghouls dying to each other's blast chain until the board settles.
#[test]
fn test_ghoul_chain_reaction() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let first = fx.summon(P0, "FP1_024");
    let second = fx.summon(P1, "FP1_024");
    let creeper = fx.summon(P1, "FP1_002");
    fx.damage(second, 2);

    fx.destroy(first);

    // second ghoul dies to the blast, its blast kills the creeper, the
    // spiders it leaves arrive after both blasts
    let state = fx.game.state();
    assert_eq!(state.zone_of(second), Some(Zone::Graveyard));
    assert_eq!(state.zone_of(creeper), Some(Zone::Graveyard));
    assert_eq!(codes(&fx, &state.field(P1)), vec!["FP1_002t", "FP1_002t"]);
}

#[test]
fn test_zombie_chow_heals_enemy_hero() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let chow = fx.summon(P0, "FP1_001");
    let enemy = fx.hero(P1);
    fx.damage(enemy, 10);

    fx.destroy(chow);

    assert_eq!(fx.game.state().health(enemy), 25);
}

#[test]
fn test_sludge_belcher_leaves_taunt() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let belcher = fx.summon(P0, "FP1_012");

    fx.destroy(belcher);

    let field = fx.game.state().field(P0);
    assert_eq!(codes(&fx, &field), vec!["FP1_012t"]);
    assert!(fx.game.state().has_tag(field[0], Tag::Taunt));
}

#[test]
fn test_dark_cultist_buffs_a_friendly_minion() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let cultist = fx.summon(P0, "FP1_023");
    let raptor = fx.summon(P0, "CS2_172");

    fx.destroy(cultist);

    assert_eq!(fx.game.state().health(raptor), 5);
}

#[test]
fn test_anubar_ambusher_returns_a_minion() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let ambusher = fx.summon(P0, "FP1_026");
    let raptor = fx.summon(P0, "CS2_172");

    fx.destroy(ambusher);

    let state = fx.game.state();
    assert_eq!(state.zone_of(raptor), Some(Zone::Hand));
    assert!(state.field(P0).is_empty());
}

#[test]
fn test_voidcaller_puts_demon_into_play() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let caller = fx.summon(P0, "FP1_022");
    let walker = fx.give(P0, "CS2_065");
    let raptor = fx.give(P0, "CS2_172");

    fx.destroy(caller);

    let state = fx.game.state();
    assert_eq!(state.zone_of(walker), Some(Zone::Play));
    assert_eq!(state.zone_of(raptor), Some(Zone::Hand));
}

#[test]
fn test_dancing_swords_draws_for_opponent() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let swords = fx.summon(P0, "FP1_029");

    fx.destroy(swords);

    // Empty deck: the draw is fatigue
    let state = fx.game.state();
    assert_eq!(state.player(P1).fatigue, 1);
    assert_eq!(state.health(fx.hero(P1)), 29);
}

#[test]
fn test_webspinner_gives_an_entourage_card() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let spinner = fx.summon(P0, "FP1_011");

    fx.destroy(spinner);

    let hand = fx.game.state().hand(P0).to_vec();
    assert_eq!(hand.len(), 1);
    assert!(["CS2_120", "CS2_172", "FP1_011"].contains(&code_of(&fx, hand[0]).as_str()));
}

/// A silenced minion dies without its deathrattle.
#[test]
fn test_silence_removes_deathrattle() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let creeper = fx.summon(P0, "FP1_002");
    fx.silence(creeper);

    fx.destroy(creeper);

    assert!(fx.game.state().field(P0).is_empty());
}

/// Death's Bite breaks after its second swing and blasts the board.
#[test]
fn test_deaths_bite_deathrattle_on_break() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.set_mana(P0, 10);
    let bite = fx.give(P0, "FP1_021");
    fx.game.play_card(bite, None, None).unwrap();
    let hero = fx.hero(P0);
    let enemy = fx.hero(P1);

    fx.game.attack(hero, enemy).unwrap();
    fx.game.end_turn().unwrap();
    let archer = fx.summon(P1, "CS2_189");
    fx.game.end_turn().unwrap();
    let raptor = fx.summon(P0, "CS2_172");
    fx.game.attack(hero, enemy).unwrap();

    let state = fx.game.state();
    assert_eq!(state.zone_of(bite), Some(Zone::Graveyard));
    assert_eq!(state.player(P0).weapon, None);
    assert_eq!(state.zone_of(archer), Some(Zone::Graveyard));
    assert_eq!(state.health(raptor), 1);
}

/// Equipping a second weapon destroys the first, running its deathrattle.
#[test]
fn test_replacing_weapon_destroys_old_one() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.set_mana(P0, 10);
    let bite = fx.give(P0, "FP1_021");
    let axe = fx.give(P0, "CS2_106");
    let raptor = fx.summon(P1, "CS2_172");

    fx.game.play_card(bite, None, None).unwrap();
    fx.game.play_card(axe, None, None).unwrap();

    let state = fx.game.state();
    assert_eq!(state.player(P0).weapon, Some(axe));
    assert_eq!(state.zone_of(bite), Some(Zone::Graveyard));
    assert_eq!(state.health(raptor), 1);
    assert_eq!(state.attack(fx.hero(P0)), 3);
}
