//! One match: setup, the command surface and the turn structure.
//!
//! ## Commands
//!
//! Every command is validated against the current state first and
//! rejected with an [`IllegalAction`] before anything changes. A
//! validated command then runs inside a transaction:
//!
//! 1. The state and RNG are checkpointed (a persistent-map clone).
//! 2. The command's steps push work onto one [`ResolutionStack`] and run
//!    it. All steps of one command share the stack's iteration budget.
//! 3. Deaths are checked one last time, auras refreshed, the result
//!    settled and zone bookkeeping verified.
//!
//! Any error restores the checkpoint. A fatal error (invariant
//! violation, iteration cap) also marks the game aborted; every later
//! command returns [`EngineError::GameAborted`].
//!
//! ## Turn structure
//!
//! Turn start: mana crystal, refresh, `TurnBegin` dispatched, then the
//! draw. Turn end: `TurnEnd` dispatched, frozen characters that did not
//! attack thaw, then the opponent's turn starts.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, error};

use super::combat;
use super::engine::{GameResult, RulesEngine};
use crate::cards::definition::{CardDefinition, CardType};
use crate::cards::registry::CardRegistry;
use crate::cards::script::ActionFn;
use crate::core::action::Command;
use crate::core::config::GameConfig;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::{GameRng, GameRngState};
use crate::core::state::{GameState, Phase};
use crate::core::tags::Tag;
use crate::effects::{Effect, EffectResolver, Requirements, TargetSelector};
use crate::error::{EngineError, EngineResult, IllegalAction, ScriptError};
use crate::stack::ResolutionStack;
use crate::triggers::{EventKind, GameEvent};
use crate::zones::{Zone, ZonePosition};

const FIRST: PlayerId = PlayerId(0);
const SECOND: PlayerId = PlayerId(1);

/// Seat description: name, hero card and deck list.
///
/// ```
/// use tavern::rules::PlayerSetup;
///
/// let seat = PlayerSetup::new("Jaina", "HERO_08").with_deck(["CS2_182", "CS2_182"]);
/// assert_eq!(seat.deck.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSetup {
    pub name: String,
    pub hero: String,
    pub deck: Vec<String>,
}

impl PlayerSetup {
    #[must_use]
    pub fn new(name: impl Into<String>, hero: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hero: hero.into(),
            deck: Vec::new(),
        }
    }

    /// Builder: deck list by card code.
    #[must_use]
    pub fn with_deck<S: Into<String>>(mut self, deck: impl IntoIterator<Item = S>) -> Self {
        self.deck = deck.into_iter().map(Into::into).collect();
        self
    }
}

/// A validated play, hero power use included.
struct PlayPlan {
    card: EntityId,
    card_type: CardType,
    secret: bool,
    cost: i32,
    target: Option<EntityId>,
    requirements: Requirements,
    action: Option<ActionFn>,
}

/// One game between two players.
///
/// `Game` owns its state and RNG and shares the card registry, so
/// independent games can run on separate threads.
#[derive(Clone)]
pub struct Game {
    state: GameState,
    rng: GameRng,
    registry: Arc<CardRegistry>,
    config: GameConfig,
    aborted: bool,
}

impl Game {
    /// Seat both players: heroes and hero powers in play, decks created in
    /// list order. Call [`start_game`](Self::start_game) next.
    pub fn new(
        registry: impl Into<Arc<CardRegistry>>,
        config: GameConfig,
        seed: u64,
        players: [PlayerSetup; 2],
    ) -> EngineResult<Self> {
        let registry = registry.into();
        let mut state = GameState::new();
        for (player, setup) in [FIRST, SECOND].into_iter().zip(players) {
            Self::seat(&mut state, &registry, &config, player, setup)?;
        }
        state.refresh_auras();
        state.check_consistency()?;
        debug!(seed, entities = state.entity_count(), "game created");
        Ok(Self {
            state,
            rng: GameRng::new(seed),
            registry,
            config,
            aborted: false,
        })
    }

    fn seat(
        state: &mut GameState,
        registry: &CardRegistry,
        config: &GameConfig,
        player: PlayerId,
        setup: PlayerSetup,
    ) -> EngineResult<()> {
        let hero_def = registry
            .find(&setup.hero)
            .ok_or_else(|| ScriptError::UnknownCard(setup.hero.clone()))?;
        if hero_def.card_type != CardType::Hero {
            return Err(EngineError::InvalidDeck(format!("{} is not a hero", setup.hero)));
        }
        let power_code = hero_def
            .hero_power
            .as_deref()
            .ok_or_else(|| ScriptError::Malformed(format!("hero {} has no hero power", hero_def.code)))?;
        let power_def = registry
            .find(power_code)
            .ok_or_else(|| ScriptError::UnknownCard(power_code.to_string()))?;
        if setup.deck.len() > config.deck_size {
            return Err(EngineError::InvalidDeck(format!(
                "{} cards, at most {} allowed",
                setup.deck.len(),
                config.deck_size
            )));
        }
        let deck = registry.resolve_deck(&setup.deck)?;

        let hero = EffectResolver::create(state, hero_def, player, Zone::Play)?;
        if hero_def.base_tag(Tag::Health) == 0 {
            state.set_tag(hero, Tag::Health, config.starting_health)?;
        }
        let power = EffectResolver::create(state, power_def, player, Zone::Play)?;
        EffectResolver::activate(state, registry, hero);

        for card in deck {
            let def = registry
                .definition(card)
                .ok_or_else(|| EngineError::InvariantViolation(format!("{card} is not registered")))?;
            EffectResolver::create(state, def, player, Zone::Deck)?;
        }

        let seat = state.player_mut(player);
        seat.name = setup.name;
        seat.hero = hero;
        seat.power = power;
        Ok(())
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(any(test, feature = "testing"))]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Serializable RNG position, for replay checks.
    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.rng.state()
    }

    /// Whether a fatal error ended this game.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.state.current_player()
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.state.result()
    }

    // === Commands ===

    /// Shuffle decks and deal starting hands; the game enters the mulligan.
    pub fn start_game(&mut self) -> EngineResult<()> {
        self.check_running()?;
        let phase = self.state.phase();
        if phase != Phase::Setup {
            return Err(IllegalAction::WrongPhase(phase).into());
        }
        self.transact(FIRST, None, |res| res.start())
    }

    /// Replace some starting cards of `player`. Once both players have
    /// chosen, the second player gets the coin and the first turn begins.
    pub fn mulligan(&mut self, player: PlayerId, replace: &[EntityId]) -> EngineResult<()> {
        self.check_running()?;
        match self.state.phase() {
            Phase::Mulligan => {}
            Phase::Over => return Err(IllegalAction::GameOver.into()),
            other => return Err(IllegalAction::WrongPhase(other).into()),
        }
        if player.index() > SECOND.index() {
            return Err(IllegalAction::NotYourTurn(player).into());
        }
        if self.state.player(player).mulligan_done {
            return Err(IllegalAction::MulliganDone(player).into());
        }
        let mut swap: SmallVec<[EntityId; 4]> = SmallVec::new();
        for &card in replace {
            if !self.state.hand(player).contains(&card) {
                return Err(IllegalAction::NotInHand(card).into());
            }
            if !swap.contains(&card) {
                swap.push(card);
            }
        }
        let command = Command::Mulligan {
            player,
            replace: swap.clone(),
        };
        self.transact(player, Some(command), move |res| res.mulligan(player, &swap))
    }

    /// Play a card from the current player's hand.
    pub fn play_card(&mut self, card: EntityId, target: Option<EntityId>, choice: Option<usize>) -> EngineResult<()> {
        self.check_running()?;
        let plan = self.plan_play(card, target, choice)?;
        let player = self.state.current_player();
        let command = Command::PlayCard { card, target, choice };
        self.transact(player, Some(command), move |res| res.play(player, plan))
    }

    /// Use the current player's hero power.
    pub fn use_power(&mut self, target: Option<EntityId>) -> EngineResult<()> {
        self.check_running()?;
        let plan = self.plan_power(target)?;
        let player = self.state.current_player();
        self.transact(player, Some(Command::UsePower { target }), move |res| {
            let seat = res.state.player_mut(player);
            seat.spend(plan.cost);
            seat.power_used = true;
            debug!(%player, target = ?plan.target, "hero power used");
            res.perform(plan.card, player, plan.target, plan.requirements, plan.action)
        })
    }

    /// Attack `defender` with `attacker`.
    pub fn attack(&mut self, attacker: EntityId, defender: EntityId) -> EngineResult<()> {
        self.check_running()?;
        let player = self.main_phase()?;
        if self.state.entity(attacker).is_none() {
            return Err(IllegalAction::UnknownEntity(attacker).into());
        }
        if !combat::can_attack(&self.state, attacker, player) {
            return Err(IllegalAction::CannotAttack(attacker).into());
        }
        if !combat::defenders(&self.state, player).contains(&defender) {
            return Err(IllegalAction::InvalidDefender(defender).into());
        }
        self.transact(player, Some(Command::Attack { attacker, defender }), move |res| {
            res.attack(player, attacker, defender)
        })
    }

    /// End the current player's turn.
    pub fn end_turn(&mut self) -> EngineResult<()> {
        self.check_running()?;
        let player = self.main_phase()?;
        self.transact(player, Some(Command::EndTurn), |res| res.end_turn())
    }

    /// Apply any command.
    pub fn execute(&mut self, command: &Command) -> EngineResult<()> {
        match command {
            Command::Mulligan { player, replace } => self.mulligan(*player, replace),
            Command::PlayCard { card, target, choice } => self.play_card(*card, *target, *choice),
            Command::UsePower { target } => self.use_power(*target),
            Command::Attack { attacker, defender } => self.attack(*attacker, *defender),
            Command::EndTurn => self.end_turn(),
        }
    }

    /// Resolve effects as if `source` had queued them, with the same
    /// transaction guarantees as a command. Used by scripted scenarios.
    pub fn apply_effects(&mut self, source: EntityId, effects: Vec<Effect>) -> EngineResult<()> {
        self.check_running()?;
        let player = self.state.current_player();
        self.transact(player, None, move |res| {
            res.stack.push_effects(source, effects);
            res.run()
        })
    }

    /// Every command the acting player could issue now, in a stable
    /// order. Mulligans are offered as "keep everything".
    #[must_use]
    pub fn legal_commands(&self) -> Vec<Command> {
        if self.aborted {
            return Vec::new();
        }
        match self.state.phase() {
            Phase::Mulligan => self
                .state
                .players()
                .filter(|(_, seat)| !seat.mulligan_done)
                .map(|(player, _)| Command::Mulligan {
                    player,
                    replace: SmallVec::new(),
                })
                .collect(),
            Phase::Main => self.main_commands(),
            Phase::Setup | Phase::Over => Vec::new(),
        }
    }

    fn main_commands(&self) -> Vec<Command> {
        let player = self.state.current_player();
        let mut out = Vec::new();

        for &card in self.state.hand(player) {
            let Some(def) = self.state.card_of(card).and_then(|c| self.registry.definition(c)) else {
                continue;
            };
            let choices: Vec<Option<usize>> = if def.choose_cards.is_empty() {
                vec![None]
            } else {
                (0..def.choose_cards.len()).map(Some).collect()
            };
            for choice in choices {
                let Ok(effective) = self.effective_definition(def, choice) else {
                    continue;
                };
                for target in self.target_options(card, player, &effective.requirements) {
                    if self.plan_play(card, target, choice).is_ok() {
                        out.push(Command::PlayCard { card, target, choice });
                    }
                }
            }
        }

        let power = self.state.player(player).power;
        if let Some(def) = self.state.card_of(power).and_then(|c| self.registry.definition(c)) {
            for target in self.target_options(power, player, &def.requirements) {
                if self.plan_power(target).is_ok() {
                    out.push(Command::UsePower { target });
                }
            }
        }

        let defenders = combat::defenders(&self.state, player);
        for attacker in combat::attackers(&self.state, player) {
            for &defender in &defenders {
                out.push(Command::Attack { attacker, defender });
            }
        }

        out.push(Command::EndTurn);
        out
    }

    fn target_options(&self, source: EntityId, player: PlayerId, requirements: &Requirements) -> Vec<Option<EntityId>> {
        let legal = TargetSelector::new(&self.state, source, player).legal_targets(requirements);
        if legal.is_empty() {
            vec![None]
        } else {
            legal.into_iter().map(Some).collect()
        }
    }

    // === Validation ===

    fn check_running(&self) -> EngineResult<()> {
        if self.aborted {
            return Err(EngineError::GameAborted);
        }
        Ok(())
    }

    /// The acting player, if turn commands are allowed.
    fn main_phase(&self) -> Result<PlayerId, IllegalAction> {
        match self.state.phase() {
            Phase::Main => Ok(self.state.current_player()),
            Phase::Over => Err(IllegalAction::GameOver),
            other => Err(IllegalAction::WrongPhase(other)),
        }
    }

    /// The definition whose requirements and action apply: the chosen
    /// card for Choose One, the card itself otherwise.
    fn effective_definition<'r>(
        &'r self,
        def: &'r CardDefinition,
        choice: Option<usize>,
    ) -> EngineResult<&'r CardDefinition> {
        if def.choose_cards.is_empty() {
            return match choice {
                Some(index) => Err(IllegalAction::InvalidChoice(index).into()),
                None => Ok(def),
            };
        }
        let index = choice.ok_or(IllegalAction::ChoiceRequired)?;
        let code = def
            .choose_cards
            .get(index)
            .ok_or(IllegalAction::InvalidChoice(index))?;
        Ok(self.registry.find(code).ok_or_else(|| ScriptError::UnknownCard(code.clone()))?)
    }

    fn plan_play(&self, card: EntityId, target: Option<EntityId>, choice: Option<usize>) -> EngineResult<PlayPlan> {
        let player = self.main_phase()?;
        let entity = self.state.entity(card).ok_or(IllegalAction::UnknownEntity(card))?;
        if entity.zone != Zone::Hand || entity.controller != player {
            return Err(IllegalAction::NotInHand(card).into());
        }
        let def = self
            .registry
            .definition(entity.card)
            .ok_or_else(|| EngineError::InvariantViolation(format!("{} is not registered", entity.card)))?;

        let cost = self.state.cost(card);
        let mana = self.state.player(player).mana();
        if cost > mana {
            return Err(IllegalAction::NotEnoughMana { have: mana, need: cost }.into());
        }
        if def.card_type == CardType::Minion && self.state.field(player).len() >= self.config.field_limit {
            return Err(IllegalAction::FieldFull.into());
        }

        let effective = self.effective_definition(def, choice)?;
        let requirements = effective.requirements.clone();
        let target = TargetSelector::new(&self.state, card, player).validate(&requirements, target)?;
        Ok(PlayPlan {
            card,
            card_type: def.card_type,
            secret: def.is_secret(),
            cost,
            target,
            action: self.registry.script(effective.id).and_then(|s| s.action.clone()),
            requirements,
        })
    }

    fn plan_power(&self, target: Option<EntityId>) -> EngineResult<PlayPlan> {
        let player = self.main_phase()?;
        let seat = self.state.player(player);
        if seat.power_used {
            return Err(IllegalAction::PowerAlreadyUsed.into());
        }
        let power = seat.power;
        let def = self
            .state
            .card_of(power)
            .and_then(|c| self.registry.definition(c))
            .ok_or(IllegalAction::UnknownEntity(power))?;
        let cost = self.state.cost(power);
        if cost > seat.mana() {
            return Err(IllegalAction::NotEnoughMana { have: seat.mana(), need: cost }.into());
        }
        let requirements = def.requirements.clone();
        let target = TargetSelector::new(&self.state, power, player).validate(&requirements, target)?;
        Ok(PlayPlan {
            card: power,
            card_type: CardType::HeroPower,
            secret: false,
            cost,
            target,
            action: self.registry.script(def.id).and_then(|s| s.action.clone()),
            requirements,
        })
    }

    // === Transactions ===

    fn transact<F>(&mut self, player: PlayerId, command: Option<Command>, body: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Resolution<'_>) -> EngineResult<()>,
    {
        let checkpoint = (self.state.clone(), self.rng.clone());
        let outcome = {
            let Self {
                state,
                rng,
                registry,
                config,
                ..
            } = self;
            let registry: &CardRegistry = registry;
            let config: &GameConfig = config;
            if let Some(command) = command {
                state.public.record(player, command);
            }
            let mut res = Resolution {
                stack: ResolutionStack::new(registry, config),
                state,
                rng,
                registry,
                config,
            };
            body(&mut res).and_then(|()| res.finish())
        };

        if let Err(err) = &outcome {
            let (state, rng) = checkpoint;
            self.state = state;
            self.rng = rng;
            if err.is_fatal() {
                error!(%err, turn = self.state.turn(), "game aborted");
                self.aborted = true;
            } else {
                debug!(%err, "command rolled back");
            }
        }
        outcome
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.state.phase())
            .field("turn", &self.state.turn())
            .field("current_player", &self.state.current_player())
            .field("result", &self.state.result())
            .field("aborted", &self.aborted)
            .finish()
    }
}

impl RulesEngine for Game {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn legal_commands(&self) -> Vec<Command> {
        Game::legal_commands(self)
    }

    fn apply_command(&mut self, command: &Command) -> EngineResult<()> {
        self.execute(command)
    }

    fn is_terminal(&self) -> Option<GameResult> {
        self.state.result()
    }
}

/// Mutable view of a game for the duration of one command.
struct Resolution<'g> {
    state: &'g mut GameState,
    rng: &'g mut GameRng,
    registry: &'g CardRegistry,
    config: &'g GameConfig,
    stack: ResolutionStack<'g>,
}

impl Resolution<'_> {
    fn run(&mut self) -> EngineResult<()> {
        self.stack.run(self.state, self.rng)?;
        self.settle();
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.state.phase() == Phase::Over
    }

    /// Final death check, aura refresh, consistency check.
    fn finish(&mut self) -> EngineResult<()> {
        self.stack.push_death_check();
        self.run()?;
        self.state.refresh_auras();
        self.state.check_consistency()
    }

    /// End the game once a hero has died.
    fn settle(&mut self) {
        if self.is_over() {
            return;
        }
        let lost: SmallVec<[PlayerId; 2]> = self
            .state
            .players()
            .filter(|(_, seat)| seat.lost)
            .map(|(player, _)| player)
            .collect();
        let result = match lost.as_slice() {
            [] => return,
            [loser] => GameResult::Winner(loser.opponent()),
            _ => GameResult::Draw,
        };
        debug!(?result, turn = self.state.turn(), "game over");
        self.state.public.result = Some(result);
        self.state.public.phase = Phase::Over;
    }

    /// Move cards from the top of the deck to the hand, without events.
    fn deal(&mut self, player: PlayerId, count: usize) -> EngineResult<()> {
        for _ in 0..count {
            let Some(card) = self.state.zones().top(player, Zone::Deck) else {
                break;
            };
            self.state.move_entity(card, player, Zone::Hand, ZonePosition::Top)?;
        }
        Ok(())
    }

    fn start(&mut self) -> EngineResult<()> {
        for player in [FIRST, SECOND] {
            self.state.shuffle_deck(player, self.rng);
        }
        let hands = self.config.starting_hand;
        self.deal(FIRST, hands[0])?;
        self.deal(SECOND, hands[1])?;
        self.state.public.phase = Phase::Mulligan;
        debug!(first = hands[0], second = hands[1], "starting hands dealt");
        Ok(())
    }

    fn mulligan(&mut self, player: PlayerId, replace: &[EntityId]) -> EngineResult<()> {
        let swaps = replace.len().min(self.state.deck(player).len());
        self.deal(player, swaps)?;
        for &card in &replace[..swaps] {
            self.state.move_entity(card, player, Zone::Deck, ZonePosition::Top)?;
        }
        self.state.shuffle_deck(player, self.rng);
        self.state.player_mut(player).mulligan_done = true;
        debug!(%player, replaced = swaps, "mulligan");

        if self.state.players().all(|(_, seat)| seat.mulligan_done) {
            self.state.public.phase = Phase::Main;
            if let Some(code) = &self.config.coin_card {
                let registry = self.registry;
                let coin = registry
                    .find(code)
                    .ok_or_else(|| ScriptError::UnknownCard(code.clone()))?;
                EffectResolver::create(self.state, coin, SECOND, Zone::Hand)?;
            }
            self.begin_turn(FIRST)?;
        }
        Ok(())
    }

    fn begin_turn(&mut self, player: PlayerId) -> EngineResult<()> {
        self.state.public.turn += 1;
        self.state.public.current_player = player;
        let cap = self.config.max_mana;
        let seat = self.state.player_mut(player);
        seat.max_mana = (seat.max_mana + 1).min(cap);
        seat.used_mana = 0;
        seat.temp_mana = 0;
        seat.power_used = false;

        for id in self.state.characters(player) {
            self.state.set_tag(id, Tag::Exhausted, 0)?;
            self.state.set_tag(id, Tag::NumAttacksThisTurn, 0)?;
        }
        debug!(%player, turn = self.state.turn(), "turn begins");

        let hero = self.state.player(player).hero;
        self.stack.push_effects(hero, vec![Effect::Draw { player }]);
        self.stack.push_event(GameEvent::turn(EventKind::TurnBegin, player));
        self.run()
    }

    fn end_turn(&mut self) -> EngineResult<()> {
        let player = self.state.current_player();
        debug!(%player, turn = self.state.turn(), "turn ends");
        self.stack.push_event(GameEvent::turn(EventKind::TurnEnd, player));
        self.run()?;
        if self.is_over() {
            return Ok(());
        }
        for id in self.state.characters(player) {
            if self.state.has_tag(id, Tag::Frozen) && self.state.tag(id, Tag::NumAttacksThisTurn) == 0 {
                self.state.set_tag(id, Tag::Frozen, 0)?;
            }
        }
        self.state.player_mut(player).temp_mana = 0;
        self.begin_turn(player.opponent())
    }

    fn play(&mut self, player: PlayerId, plan: PlayPlan) -> EngineResult<()> {
        let PlayPlan {
            card,
            card_type,
            secret,
            cost,
            target,
            requirements,
            action,
        } = plan;
        self.state.player_mut(player).spend(cost);
        debug!(%player, %card, ?card_type, ?target, cost, "card played");

        let mut played = GameEvent::new(EventKind::CardPlayed)
            .with_player(player)
            .with_source(card);
        if let Some(target) = target {
            played = played.with_target(target);
        }

        match card_type {
            CardType::Minion => {
                self.state.move_entity(card, player, Zone::Play, ZonePosition::Top)?;
                self.state.set_tag(card, Tag::Exhausted, 1)?;
                EffectResolver::activate(self.state, self.registry, card);
                self.stack.push_event(
                    GameEvent::new(EventKind::Summon)
                        .with_player(player)
                        .with_target(card),
                );
                self.stack.push_event(played);
                self.run()?;
                self.perform(card, player, target, requirements, action)
            }
            CardType::Weapon => {
                let old = self.state.player(player).weapon;
                self.state.move_entity(card, player, Zone::Play, ZonePosition::Top)?;
                self.state.player_mut(player).weapon = Some(card);
                EffectResolver::activate(self.state, self.registry, card);
                self.stack.push_event(played);
                self.run()?;
                self.perform(card, player, target, requirements, action)?;
                if let Some(old) = old {
                    self.stack.push_effects(card, vec![Effect::Destroy { target: old }]);
                    self.run()?;
                }
                Ok(())
            }
            _ if secret => {
                self.state.move_entity(card, player, Zone::Secret, ZonePosition::Top)?;
                EffectResolver::activate(self.state, self.registry, card);
                self.stack.push_event(played);
                self.run()
            }
            _ => {
                self.state.move_entity(card, player, Zone::SetAside, ZonePosition::Top)?;
                self.stack.push_event(played);
                self.run()?;
                self.perform(card, player, target, requirements, action)?;
                if self.state.zone_of(card) == Some(Zone::SetAside) {
                    self.state.move_entity(card, player, Zone::Graveyard, ZonePosition::Top)?;
                }
                Ok(())
            }
        }
    }

    /// Run a play action to completion.
    fn perform(
        &mut self,
        source: EntityId,
        player: PlayerId,
        target: Option<EntityId>,
        requirements: Requirements,
        action: Option<ActionFn>,
    ) -> EngineResult<()> {
        if let Some(handler) = action {
            self.stack.push_action(source, player, target, requirements, handler);
            self.run()?;
        }
        Ok(())
    }

    fn attack(&mut self, player: PlayerId, attacker: EntityId, defender: EntityId) -> EngineResult<()> {
        self.state.add_tag(attacker, Tag::NumAttacksThisTurn, 1)?;
        self.state.set_tag(attacker, Tag::Stealth, 0)?;
        debug!(%player, %attacker, %defender, "attack");
        self.stack.push_event(
            GameEvent::new(EventKind::Attack)
                .with_player(player)
                .with_source(attacker)
                .with_target(defender),
        );
        self.run()?;

        let state = &*self.state;
        let standing = |id| state.in_play(id) && !state.is_mortally_wounded(id);
        if !standing(attacker) || !standing(defender) {
            debug!(%attacker, %defender, "attack interrupted");
            return Ok(());
        }
        let dealt = state.attack(attacker);
        let taken = state.attack(defender);
        let weapon = state
            .entity(attacker)
            .filter(|e| e.card_type == CardType::Hero)
            .and_then(|_| state.player(player).weapon);

        self.stack.push_effects(
            attacker,
            vec![
                Effect::Hit {
                    source: attacker,
                    target: defender,
                    amount: dealt,
                },
                Effect::Hit {
                    source: defender,
                    target: attacker,
                    amount: taken,
                },
            ],
        );
        if let Some(weapon) = weapon {
            self.state.add_tag(weapon, Tag::Durability, -1)?;
        }
        self.run()
    }
}
