//! Trigger system for event-driven card behavior.
//!
//! ## Key Components
//!
//! - [`EventKind`] / [`GameEvent`]: What happened, with payload
//! - [`TriggerCondition`] / [`Hook`]: Owner-relative filters
//! - [`Trigger`]: One entity's subscription to one event kind
//! - [`TriggerRegistry`]: Ordered storage and listener snapshots
//!
//! Dispatch itself (liveness checks, depth-first resolution of handler
//! effects) lives in the resolution stack.

mod condition;
mod event;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, Hook, TriggerCondition};
pub use event::{EventKind, GameEvent};
pub use registry::{Trigger, TriggerId, TriggerRegistry};
