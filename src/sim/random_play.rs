use tracing::debug;

use crate::core::action::Command;
use crate::core::entity::EntityId;
use crate::core::rng::GameRng;
use crate::error::EngineResult;
use crate::rules::{Game, GameResult};

/// Random driver settings.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Chance to use the hero power at the start of a turn.
    pub power_chance: f64,

    /// Chance to play each card in hand.
    pub play_chance: f64,

    /// Turns played before giving up on a result.
    pub max_turns: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            power_chance: 0.1,
            play_chance: 0.5,
            max_turns: 100,
        }
    }
}

impl SimConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_power_chance(mut self, chance: f64) -> Self {
        self.power_chance = chance;
        self
    }

    #[must_use]
    pub fn with_play_chance(mut self, chance: f64) -> Self {
        self.play_chance = chance;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }
}

/// Play one turn for the current player, then end it.
///
/// 1. Maybe use the hero power on a random legal target
/// 2. Maybe play each card in hand (random target and choice)
/// 3. Attack with every ready character at random defenders
pub fn play_turn(game: &mut Game, rng: &mut GameRng, config: &SimConfig) -> EngineResult<()> {
    if game.result().is_some() {
        return Ok(());
    }

    if rng.gen_bool(config.power_chance) {
        pick_and_run(game, rng, |c| matches!(c, Command::UsePower { .. }))?;
    }

    let player = game.current_player();
    let hand: Vec<EntityId> = game.state().hand(player).to_vec();
    for card in hand {
        if game.result().is_some() {
            return Ok(());
        }
        if rng.gen_bool(config.play_chance) {
            pick_and_run(game, rng, |c| matches!(c, Command::PlayCard { card: played, .. } if *played == card))?;
        }
    }

    let characters = game.state().characters(player);
    for attacker in characters {
        // Windfury characters keep swinging while they are allowed to
        loop {
            if game.result().is_some() {
                return Ok(());
            }
            let swung = pick_and_run(game, rng, |c| {
                matches!(c, Command::Attack { attacker: a, .. } if *a == attacker)
            })?;
            if !swung {
                break;
            }
        }
    }

    if game.result().is_none() {
        game.end_turn()?;
    }
    Ok(())
}

/// Play until the game ends or the turn limit runs out.
pub fn play_random_game(game: &mut Game, rng: &mut GameRng, config: &SimConfig) -> EngineResult<Option<GameResult>> {
    for _ in 0..config.max_turns {
        if game.result().is_some() {
            break;
        }
        play_turn(game, rng, config)?;
    }
    let result = game.result();
    debug!(?result, turn = game.state().turn(), "random game finished");
    Ok(result)
}

/// Run a random legal command matching `wanted`; false if none matched.
fn pick_and_run(game: &mut Game, rng: &mut GameRng, wanted: impl Fn(&Command) -> bool) -> EngineResult<bool> {
    let options: Vec<Command> = game.legal_commands().into_iter().filter(|c| wanted(c)).collect();
    match rng.choose(&options) {
        Some(command) => {
            game.execute(command)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
