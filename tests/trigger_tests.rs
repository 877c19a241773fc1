//! Event dispatch integration tests.
//!
//! Listener order, liveness and the summon-trigger scenario, all driven
//! through real turns and card plays.

use tavern::cards::{CardDefinition, CardRegistry, CardScript};
use tavern::core::{PlayerId, Tag};
use tavern::testing::Fixture;
use tavern::triggers::Hook;
use tavern::zones::Zone;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

/// Standard cards plus a minion that clears its own board at turn start
/// and one that draws a coin at turn start.
fn registry_with_test_cards() -> CardRegistry {
    let mut registry = CardRegistry::standard();
    registry
        .register(
            CardDefinition::minion("TEST_REAPER", "Grim Reaper", 1, 1, 1),
            CardScript::new().on(Hook::OwnTurnBegin, |ctx, _| {
                let me = ctx.source();
                for minion in ctx.field(ctx.controller()) {
                    if minion != me {
                        ctx.destroy(minion);
                    }
                }
                Ok(())
            }),
        )
        .unwrap();
    registry
        .register(
            CardDefinition::minion("TEST_TALLY", "Tally Clerk", 1, 1, 1),
            CardScript::new().on(Hook::OwnTurnBegin, |ctx, _| ctx.give(ctx.controller(), "GAME_005")),
        )
        .unwrap();
    registry
}

fn pass_round(fx: &mut Fixture) {
    fx.game.end_turn().unwrap();
    fx.game.end_turn().unwrap();
}

/// A listener destroyed by an earlier listener of the same event is skipped.
#[test]
fn test_destroyed_listener_does_not_fire() {
    let mut fx = Fixture::new(registry_with_test_cards());
    let reaper = fx.summon(P0, "TEST_REAPER");
    let clerk = fx.summon(P0, "TEST_TALLY");

    pass_round(&mut fx);

    let state = fx.game.state();
    assert_eq!(state.zone_of(reaper), Some(Zone::Play));
    assert_eq!(state.zone_of(clerk), Some(Zone::Graveyard));
    assert!(state.hand(P0).is_empty());
}

/// Listeners run oldest first: the clerk registered earlier gets its coin
/// before the reaper clears it.
#[test]
fn test_listeners_run_in_registration_order() {
    let mut fx = Fixture::new(registry_with_test_cards());
    let clerk = fx.summon(P0, "TEST_TALLY");
    fx.summon(P0, "TEST_REAPER");

    pass_round(&mut fx);

    let state = fx.game.state();
    assert_eq!(state.zone_of(clerk), Some(Zone::Graveyard));
    assert_eq!(state.hand(P0).len(), 1);
}

/// Own-turn hooks ignore the opponent's turns.
#[test]
fn test_shade_grows_on_own_turns_only() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let shade = fx.summon(P0, "FP1_005");

    fx.game.end_turn().unwrap();
    assert_eq!(fx.game.state().attack(shade), 2);
    fx.game.end_turn().unwrap();
    assert_eq!(fx.game.state().attack(shade), 3);
    pass_round(&mut fx);

    let state = fx.game.state();
    assert_eq!(state.attack(shade), 4);
    assert_eq!(state.health(shade), 4);
    assert!(state.has_tag(shade, Tag::Stealth));
}

#[test]
fn test_stoneskin_gargoyle_heals_at_turn_start() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let gargoyle = fx.summon(P0, "FP1_027");
    fx.damage(gargoyle, 3);

    fx.game.end_turn().unwrap();
    assert_eq!(fx.game.state().health(gargoyle), 1);
    fx.game.end_turn().unwrap();

    assert_eq!(fx.game.state().health(gargoyle), 4);
}

/// Undertaker gains attack once from a deathrattle minion's summon; the
/// spiders from the creeper's deathrattle land before the turn ends and
/// do not count.
#[test]
fn test_undertaker_scenario() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.set_mana(P0, 10);
    let undertaker = fx.give(P0, "FP1_028");
    let creeper = fx.give(P0, "FP1_002");
    let raptor = fx.give(P0, "CS2_172");

    fx.game.play_card(undertaker, None, None).unwrap();
    fx.game.play_card(creeper, None, None).unwrap();
    assert_eq!(fx.game.state().attack(undertaker), 2);
    fx.game.play_card(raptor, None, None).unwrap();
    assert_eq!(fx.game.state().attack(undertaker), 2);

    fx.game.use_power(Some(creeper)).unwrap();
    fx.damage(creeper, 1);

    let state = fx.game.state();
    assert_eq!(state.zone_of(creeper), Some(Zone::Graveyard));
    assert_eq!(state.field(P0).len(), 4);
    assert_eq!(state.attack(undertaker), 2);
    assert_eq!(state.current_player(), P0);
}

/// Undertaker ignores the enemy's summons.
#[test]
fn test_undertaker_ignores_enemy_summons() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let undertaker = fx.summon(P0, "FP1_028");
    fx.summon(P1, "FP1_002");

    assert_eq!(fx.game.state().attack(undertaker), 1);
}

/// Snipe waits in the secret zone and fires on the enemy's summon.
#[test]
fn test_snipe_fires_on_enemy_summon() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.set_mana(P0, 10);
    let snipe = fx.give(P0, "EX1_609");
    fx.game.play_card(snipe, None, None).unwrap();
    assert_eq!(fx.game.state().secrets(P0), &[snipe]);

    // Own summons do not trigger it
    fx.summon(P0, "CS2_172");
    assert_eq!(fx.game.state().zone_of(snipe), Some(Zone::Secret));

    fx.game.end_turn().unwrap();
    fx.set_mana(P1, 10);
    let yeti = fx.give(P1, "CS2_182");
    fx.game.play_card(yeti, None, None).unwrap();

    let state = fx.game.state();
    assert_eq!(state.health(yeti), 1);
    assert_eq!(state.zone_of(snipe), Some(Zone::Graveyard));
    assert!(state.secrets(P0).is_empty());
}

#[test]
fn test_wailing_soul_silences_friendly_minions() {
    let mut fx = Fixture::new(CardRegistry::standard());
    fx.set_mana(P0, 10);
    let grunt = fx.summon(P0, "CS2_121");
    let enemy = fx.summon(P1, "CS2_121");
    let soul = fx.give(P0, "FP1_016");

    fx.game.play_card(soul, None, None).unwrap();

    let state = fx.game.state();
    assert!(!state.has_tag(grunt, Tag::Taunt));
    assert!(state.has_tag(grunt, Tag::Silenced));
    assert!(!state.has_tag(soul, Tag::Silenced));
    assert!(state.has_tag(enemy, Tag::Taunt));
}
