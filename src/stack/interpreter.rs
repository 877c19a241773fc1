//! The resolution stack interpreter.
//!
//! Card effects re-enter the engine: a hit raises a damage event, a
//! listener reacts with a summon, the summon raises another event. Rather
//! than recursing, every pending unit of work is a [`Frame`] on an
//! explicit stack and [`ResolutionStack::run`] executes one frame step at a
//! time until the stack is empty.
//!
//! ## Ordering
//!
//! - A batch applies its effects front to back. Events raised meanwhile
//!   are held until the batch is done, then delivered in order, each one
//!   fully (listeners and everything they cause) before the next.
//! - After the events, deaths are reaped: every marked entity that is
//!   still lethal, then anything else on the board that is. All of them
//!   are snapshotted before any of them leaves play.
//! - Each dead entity runs its deathrattle `multiplier` times, each
//!   repetition resolved completely, and then raises its death event.
//!
//! ## Budget
//!
//! Every step counts against `GameConfig::iteration_limit`. Exceeding it
//! returns [`EngineError::IterationLimit`]; the caller restores its
//! checkpoint.

use std::collections::VecDeque;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::frame::{ActionFrame, BatchFrame, DispatchFrame, Frame};
use crate::cards::registry::CardRegistry;
use crate::cards::script::{ActionFn, ScriptContext};
use crate::core::config::GameConfig;
use crate::core::{EntityId, GameRng, GameState, PlayerId};
use crate::effects::{
    DeathSnapshot, Effect, EffectResolver, PendingDeath, Requirements, ResolverContext, TargetSelector,
};
use crate::error::{EngineError, EngineResult};
use crate::triggers::{ConditionContext, ConditionEvaluator, EventKind, GameEvent, TriggerId};

/// Explicit work stack for one command.
///
/// The step counter spans every [`run`](Self::run) call on the same
/// instance, so a command that resolves in several phases shares one
/// budget.
pub struct ResolutionStack<'a> {
    ctx: ResolverContext<'a>,
    frames: Vec<Frame>,
    steps: u32,
}

impl<'a> ResolutionStack<'a> {
    #[must_use]
    pub fn new(registry: &'a CardRegistry, config: &'a GameConfig) -> Self {
        Self {
            ctx: ResolverContext::new(registry, config),
            frames: Vec::new(),
            steps: 0,
        }
    }

    /// Queue effects from `source` as one batch.
    pub fn push_effects(&mut self, source: EntityId, effects: Vec<Effect>) {
        if !effects.is_empty() {
            self.frames.push(Frame::Batch(BatchFrame::new(source, effects)));
        }
    }

    /// Queue an event for dispatch.
    pub fn push_event(&mut self, event: GameEvent) {
        self.frames.push(Frame::Dispatch(DispatchFrame::new(event)));
    }

    /// Queue a play action; its target is re-checked when the frame runs.
    pub fn push_action(
        &mut self,
        source: EntityId,
        controller: PlayerId,
        target: Option<EntityId>,
        requirements: Requirements,
        handler: ActionFn,
    ) {
        self.frames.push(Frame::Action(ActionFrame {
            source,
            controller,
            target,
            requirements,
            handler,
        }));
    }

    /// Queue a board scan for lethal entities.
    pub fn push_death_check(&mut self) {
        self.frames.push(Frame::Reap(SmallVec::new()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pending frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Steps executed so far.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Run until the stack is empty.
    pub fn run(&mut self, state: &mut GameState, rng: &mut GameRng) -> EngineResult<()> {
        let limit = self.ctx.config.iteration_limit;
        while let Some(frame) = self.frames.pop() {
            self.steps += 1;
            if self.steps > limit {
                self.frames.clear();
                return Err(EngineError::IterationLimit { limit });
            }
            state.refresh_auras();
            trace!(step = self.steps, depth = self.frames.len(), kind = frame.kind(), "step");
            self.step(frame, state, rng)?;
        }
        state.refresh_auras();
        Ok(())
    }

    fn step(&mut self, frame: Frame, state: &mut GameState, rng: &mut GameRng) -> EngineResult<()> {
        match frame {
            Frame::Batch(mut batch) => match batch.effects.pop_front() {
                Some(effect) => {
                    let resolved = EffectResolver::apply(state, self.ctx, &effect)?;
                    batch.events.extend(resolved.events);
                    batch.deaths.extend(resolved.deaths);
                    self.frames.push(Frame::Batch(batch));
                }
                None => {
                    trace!(
                        source = %batch.source,
                        events = batch.events.len(),
                        deaths = batch.deaths.len(),
                        "batch resolved"
                    );
                    // Deaths below, events on top in delivery order
                    self.frames.push(Frame::Reap(batch.deaths));
                    for event in batch.events.into_iter().rev() {
                        self.push_event(event);
                    }
                }
            },
            Frame::Dispatch(mut dispatch) => {
                let listeners = dispatch.listeners.get_or_insert_with(|| {
                    let listeners = state.triggers().listeners(dispatch.event.kind);
                    debug!(kind = ?dispatch.event.kind, listeners = listeners.len(), "dispatching event");
                    listeners
                });
                if let Some(id) = listeners.pop_front() {
                    let event = dispatch.event.clone();
                    self.frames.push(Frame::Dispatch(dispatch));
                    self.fire(state, rng, id, &event);
                }
            }
            Frame::Reap(pending) => self.reap(state, &pending)?,
            Frame::Deaths(mut queue) => {
                if let Some(snapshot) = queue.pop_front() {
                    if !queue.is_empty() {
                        self.frames.push(Frame::Deaths(queue));
                    }
                    self.push_event(
                        GameEvent::new(EventKind::Death)
                            .with_player(snapshot.controller)
                            .with_target(snapshot.entity),
                    );
                    if snapshot.deathrattle && snapshot.multiplier > 0 {
                        self.frames.push(Frame::Deathrattle {
                            snapshot,
                            remaining: snapshot.multiplier,
                        });
                    }
                }
            }
            Frame::Deathrattle { snapshot, remaining } => {
                if remaining > 1 {
                    self.frames.push(Frame::Deathrattle {
                        snapshot,
                        remaining: remaining - 1,
                    });
                }
                self.deathrattle(state, rng, &snapshot);
            }
            Frame::Action(action) => self.action(state, rng, action),
        }
        Ok(())
    }

    /// Deliver one event to one listener.
    fn fire(&mut self, state: &GameState, rng: &mut GameRng, id: TriggerId, event: &GameEvent) {
        let Some(trigger) = state.triggers().get(id) else {
            trace!(trigger = %id, "listener removed before delivery");
            return;
        };
        let owner = trigger.owner;
        let Some(entity) = state.entity(owner) else {
            return;
        };
        if !state.is_live(owner) || entity.is_silenced() {
            trace!(trigger = %id, %owner, "owner not live");
            return;
        }
        let controller = entity.controller;
        let condition = ConditionContext {
            state,
            event,
            owner,
            controller,
        };
        if !ConditionEvaluator::evaluate(&trigger.condition, &condition) {
            return;
        }

        let handler = Arc::clone(&trigger.handler);
        let mut ctx = ScriptContext::new(state, self.ctx.registry, rng, owner, controller);
        match handler(&mut ctx, event) {
            Ok(()) => {
                debug!(trigger = %id, name = %trigger.name, "trigger fired");
                let effects = ctx.into_effects();
                self.push_effects(owner, effects);
            }
            Err(error) => {
                warn!(trigger = %id, name = %trigger.name, %error, "trigger handler failed; effects discarded");
            }
        }
    }

    fn deathrattle(&mut self, state: &GameState, rng: &mut GameRng, snapshot: &DeathSnapshot) {
        let Some(handler) = self
            .ctx
            .registry
            .script(snapshot.card)
            .and_then(|s| s.deathrattle.clone())
        else {
            return;
        };
        let mut ctx = ScriptContext::new(state, self.ctx.registry, rng, snapshot.entity, snapshot.controller);
        match handler(&mut ctx) {
            Ok(()) => {
                debug!(entity = %snapshot.entity, "deathrattle");
                let effects = ctx.into_effects();
                self.push_effects(snapshot.entity, effects);
            }
            Err(error) => {
                warn!(entity = %snapshot.entity, %error, "deathrattle failed; effects discarded");
            }
        }
    }

    fn action(&mut self, state: &GameState, rng: &mut GameRng, action: ActionFrame) {
        if let Some(target) = action.target {
            let selector = TargetSelector::new(state, action.source, action.controller);
            if !selector.is_legal(&action.requirements, target) {
                debug!(source = %action.source, %target, "target no longer legal; action skipped");
                return;
            }
        }
        let mut ctx = ScriptContext::new(state, self.ctx.registry, rng, action.source, action.controller);
        match (action.handler)(&mut ctx, action.target) {
            Ok(()) => {
                let effects = ctx.into_effects();
                self.push_effects(action.source, effects);
            }
            Err(error) => {
                warn!(source = %action.source, %error, "play action failed; effects discarded");
            }
        }
    }

    /// Move everything that died out of play and queue its death processing.
    fn reap(&mut self, state: &mut GameState, pending: &[PendingDeath]) -> EngineResult<()> {
        let mut order: SmallVec<[EntityId; 8]> = SmallVec::new();
        let mut doomed = |id: EntityId| {
            if !order.contains(&id) && state.is_mortally_wounded(id) {
                order.push(id);
            }
        };

        for death in pending {
            doomed(death.entity());
        }
        for player in [PlayerId::new(0), PlayerId::new(1)] {
            for id in state.characters(player) {
                doomed(id);
            }
            if let Some(weapon) = state.player(player).weapon {
                doomed(weapon);
            }
        }
        if order.is_empty() {
            return Ok(());
        }

        // Snapshot everyone before anyone leaves play
        let snapshots: VecDeque<DeathSnapshot> = order
            .iter()
            .map(|&id| {
                EffectResolver::snapshot(state, id)
                    .ok_or_else(|| EngineError::InvariantViolation(format!("{id} vanished before its death")))
            })
            .collect::<EngineResult<_>>()?;

        for snapshot in &snapshots {
            EffectResolver::kill(state, snapshot)?;
        }
        debug!(deaths = snapshots.len(), "deaths reaped");
        self.frames.push(Frame::Deaths(snapshots));
        Ok(())
    }
}
