//! Work items of the resolution stack.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::cards::script::ActionFn;
use crate::core::{EntityId, PlayerId};
use crate::effects::{DeathSnapshot, Effect, PendingDeath, Requirements};
use crate::triggers::{GameEvent, TriggerId};

/// One unit of pending work. The top frame always runs next.
pub(crate) enum Frame {
    /// Effects queued by one handler, applied front to back.
    Batch(BatchFrame),
    /// One event being delivered to its listener snapshot.
    Dispatch(DispatchFrame),
    /// Collect everything that died during a batch and move it out of play.
    Reap(SmallVec<[PendingDeath; 4]>),
    /// Dead entities whose deathrattles and death events still have to run.
    Deaths(VecDeque<DeathSnapshot>),
    /// Remaining deathrattle repetitions of one dead entity.
    Deathrattle { snapshot: DeathSnapshot, remaining: u32 },
    /// A play action waiting for its target to be re-validated.
    Action(ActionFrame),
}

impl Frame {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Frame::Batch(_) => "batch",
            Frame::Dispatch(_) => "dispatch",
            Frame::Reap(_) => "reap",
            Frame::Deaths(_) => "deaths",
            Frame::Deathrattle { .. } => "deathrattle",
            Frame::Action(_) => "action",
        }
    }
}

pub(crate) struct BatchFrame {
    pub source: EntityId,
    pub effects: VecDeque<Effect>,
    /// Raised while applying, delivered once the batch is done.
    pub events: Vec<GameEvent>,
    pub deaths: SmallVec<[PendingDeath; 4]>,
}

impl BatchFrame {
    pub(crate) fn new(source: EntityId, effects: Vec<Effect>) -> Self {
        Self {
            source,
            effects: effects.into(),
            events: Vec::new(),
            deaths: SmallVec::new(),
        }
    }
}

pub(crate) struct DispatchFrame {
    pub event: GameEvent,
    /// Taken on the first step, so later subscriptions miss this event.
    pub listeners: Option<VecDeque<TriggerId>>,
}

impl DispatchFrame {
    pub(crate) fn new(event: GameEvent) -> Self {
        Self { event, listeners: None }
    }
}

pub(crate) struct ActionFrame {
    pub source: EntityId,
    pub controller: PlayerId,
    pub target: Option<EntityId>,
    pub requirements: Requirements,
    pub handler: ActionFn,
}
