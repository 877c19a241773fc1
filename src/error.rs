//! Error types for engine operations.
//!
//! Three layers, matching how far a failure is allowed to travel:
//!
//! - [`IllegalAction`]: a command was rejected before any mutation. The
//!   game is unchanged and the caller may try something else.
//! - [`ScriptError`]: a card script or aura predicate misbehaved. The engine
//!   logs it, drops that handler's queued effects and keeps going.
//! - [`EngineError`]: wraps the above plus fatal conditions (invariant
//!   violation, iteration cap). A fatal error aborts only the game it
//!   happened in.

use thiserror::Error;

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::Phase;
use crate::sampler::SamplerError;

/// Command rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalAction {
    #[error("the game is over")]
    GameOver,
    #[error("command not allowed during the {0:?} phase")]
    WrongPhase(Phase),
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("{0} does not exist")]
    UnknownEntity(EntityId),
    #[error("{0} is not in the current player's hand")]
    NotInHand(EntityId),
    #[error("not enough mana: have {have}, need {need}")]
    NotEnoughMana { have: i32, need: i32 },
    #[error("the field is full")]
    FieldFull,
    #[error("no legal target")]
    NoLegalTarget,
    #[error("a target is required")]
    TargetRequired,
    #[error("{0} is not a legal target")]
    InvalidTarget(EntityId),
    #[error("choice {0} is not available")]
    InvalidChoice(usize),
    #[error("this card requires a choice")]
    ChoiceRequired,
    #[error("the hero power was already used this turn")]
    PowerAlreadyUsed,
    #[error("{0} cannot attack")]
    CannotAttack(EntityId),
    #[error("{0} cannot be attacked")]
    InvalidDefender(EntityId),
    #[error("{0} has already made a mulligan choice")]
    MulliganDone(PlayerId),
}

/// Failure inside a card-defined script, predicate or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown card `{0}`")]
    UnknownCard(String),
    #[error("duplicate card `{0}`")]
    DuplicateCard(String),
    #[error("`{0}` needs a target")]
    MissingTarget(String),
    #[error("malformed card definition: {0}")]
    Malformed(String),
}

/// Any engine failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("illegal action: {0}")]
    Illegal(#[from] IllegalAction),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    #[error("invalid deck: {0}")]
    InvalidDeck(String),
    #[error("engine invariant violated: {0}")]
    InvariantViolation(String),
    #[error("resolution exceeded {limit} steps")]
    IterationLimit { limit: u32 },
    #[error("the game was aborted by an earlier engine error")]
    GameAborted,
}

impl EngineError {
    /// Errors that end the game instance they occurred in.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::InvariantViolation(_) | EngineError::IterationLimit { .. }
        )
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
