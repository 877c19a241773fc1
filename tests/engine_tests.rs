//! Engine-level guarantees: rollback, aborts, determinism, isolation
//! between games, and serializable snapshots.

use std::sync::Arc;
use std::thread;

use tavern::cards::{CardDefinition, CardRegistry, CardScript};
use tavern::core::{Command, GameConfig, GameRng, PlayerId, Tag};
use tavern::effects::Effect;
use tavern::error::EngineError;
use tavern::rules::{Game, GameResult, RulesEngine};
use tavern::sim::{self, SimConfig};
use tavern::testing::Fixture;
use tavern::triggers::{EventKind, TriggerCondition};
use tavern::view::GameSnapshot;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

/// A minion that heals itself when damaged and damages itself when healed.
fn feedback_registry() -> CardRegistry {
    let mut registry = CardRegistry::standard();
    registry
        .register(
            CardDefinition::minion("TEST_LOOP", "Feedback Golem", 1, 1, 5),
            CardScript::new()
                .on_event(EventKind::Damage, TriggerCondition::TargetIsSelf, |ctx, _| {
                    let me = ctx.source();
                    ctx.heal(me, 1);
                    Ok(())
                })
                .on_event(EventKind::Heal, TriggerCondition::TargetIsSelf, |ctx, _| {
                    let me = ctx.source();
                    ctx.hit(me, 1);
                    Ok(())
                }),
        )
        .unwrap();
    registry
}

fn random_game(registry: &Arc<CardRegistry>, seed: u64) -> (Game, Option<GameResult>) {
    let mut game = sim::setup_random_game(Arc::clone(registry), seed).unwrap();
    let mut rng = GameRng::new(seed.wrapping_mul(31).wrapping_add(7));
    let result = sim::play_random_game(&mut game, &mut rng, &SimConfig::new()).unwrap();
    (game, result)
}

/// An endless trigger loop hits the iteration cap, rolls back and aborts
/// only that game.
#[test]
fn test_trigger_loop_aborts_game() {
    let registry = Arc::new(feedback_registry());
    let mut fx = Fixture::new(Arc::clone(&registry));
    let mut bystander = Fixture::new(registry);
    let golem = fx.summon(P0, "TEST_LOOP");
    let source = fx.hero(P1);
    let turn = fx.game.state().turn();

    let err = fx
        .game
        .apply_effects(source, vec![Effect::Hit { source, target: golem, amount: 1 }])
        .unwrap_err();

    assert_eq!(err, EngineError::IterationLimit { limit: 10_000 });
    assert!(err.is_fatal());
    assert!(fx.game.is_aborted());
    assert_eq!(fx.game.state().tag(golem, Tag::Damage), 0);
    assert_eq!(fx.game.state().turn(), turn);
    assert_eq!(fx.game.end_turn(), Err(EngineError::GameAborted));
    assert!(fx.game.legal_commands().is_empty());

    bystander.summon(P0, "TEST_LOOP");
    bystander.game.end_turn().unwrap();
    assert!(!bystander.game.is_aborted());
}

/// A lower iteration cap trips sooner but the same way.
#[test]
fn test_iteration_limit_is_configurable() {
    let config = GameConfig::new().with_starting_hand(0, 0).without_coin().with_iteration_limit(50);
    let mut fx = Fixture::with_config(feedback_registry(), config);
    let golem = fx.summon(P0, "TEST_LOOP");
    let source = fx.hero(P1);

    let err = fx
        .game
        .apply_effects(source, vec![Effect::Hit { source, target: golem, amount: 1 }])
        .unwrap_err();

    assert_eq!(err, EngineError::IterationLimit { limit: 50 });
}

/// A rejected command changes nothing, the history included.
#[test]
fn test_rejected_command_leaves_state_untouched() {
    let mut fx = Fixture::new(CardRegistry::standard());
    let yeti = fx.give(P0, "CS2_182");
    let before = GameSnapshot::capture(&fx.game);
    let history = fx.game.state().public.history.len();

    assert!(fx.game.play_card(yeti, None, None).is_err());
    assert!(fx.game.use_power(None).is_err());

    assert_eq!(GameSnapshot::capture(&fx.game), before);
    assert_eq!(fx.game.state().public.history.len(), history);
}

/// Same seed, same driver: the same game, move for move.
#[test]
fn test_games_are_deterministic() {
    let registry = Arc::new(CardRegistry::standard());
    let (a, result_a) = random_game(&registry, 17);
    let (b, result_b) = random_game(&registry, 17);

    assert_eq!(result_a, result_b);
    assert_eq!(GameSnapshot::capture(&a), GameSnapshot::capture(&b));
    assert_eq!(a.rng_state(), b.rng_state());
    let commands = |game: &Game| -> Vec<Command> {
        game.state().public.history.iter().map(|r| r.command.clone()).collect()
    };
    assert_eq!(commands(&a), commands(&b));
}

/// Replaying the recorded commands on a fresh game reproduces it.
#[test]
fn test_history_replays() {
    let registry = Arc::new(CardRegistry::standard());
    let (played, _) = random_game(&registry, 23);

    let mut replay = sim::setup_random_game(registry, 23).unwrap();
    let start = replay.state().public.history.len();
    for record in played.state().public.history.iter().skip(start) {
        replay.apply_command(&record.command).unwrap();
    }

    assert_eq!(GameSnapshot::capture(&replay), GameSnapshot::capture(&played));
}

/// Games on separate threads share one registry and do not interfere.
#[test]
fn test_parallel_games_match_sequential() {
    fn assert_send<T: Send>() {}
    assert_send::<Game>();

    let registry = Arc::new(CardRegistry::standard());
    let seeds: Vec<u64> = (100..104).collect();

    let sequential: Vec<GameSnapshot> = seeds
        .iter()
        .map(|&seed| GameSnapshot::capture(&random_game(&registry, seed).0))
        .collect();

    let handles: Vec<_> = seeds
        .iter()
        .map(|&seed| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || GameSnapshot::capture(&random_game(&registry, seed).0))
        })
        .collect();
    let parallel: Vec<GameSnapshot> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(parallel, sequential);
}

/// Every listed command is accepted, all through a random game.
#[test]
fn test_legal_commands_always_apply() {
    let registry = Arc::new(CardRegistry::standard());
    let mut game = sim::setup_random_game(registry, 55).unwrap();
    let mut rng = GameRng::new(56);

    for _ in 0..200 {
        if game.is_terminal().is_some() {
            break;
        }
        let commands = game.legal_commands();
        assert!(!commands.is_empty());
        for command in &commands {
            let mut trial = game.clone();
            trial.apply_command(command).unwrap();
        }
        let pick = rng.choose(&commands).unwrap().clone();
        game.apply_command(&pick).unwrap();
    }
}

#[test]
fn test_snapshot_json_round_trip() {
    let registry = Arc::new(CardRegistry::standard());
    let (game, _) = random_game(&registry, 8);
    let snapshot = GameSnapshot::capture(&game);

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: GameSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(back, snapshot);
}

#[test]
fn test_config_json_round_trip() {
    let config = GameConfig::new().with_field_limit(5).without_coin();
    let json = serde_json::to_string(&config).unwrap();
    let back: GameConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(back.field_limit, 5);
    assert_eq!(back.coin_card, None);
    assert_eq!(back.iteration_limit, config.iteration_limit);
}
