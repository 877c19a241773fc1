//! Effects and targeting.
//!
//! - `Effect`: one primitive rule mutation queued by a script or a command
//! - `EffectResolver`: applies a single effect and reports its events
//! - `Requirements` / `TargetSelector`: play-time target legality
//!
//! Effects never run handlers themselves. The resolver returns the events
//! and pending deaths an effect produced; the resolution stack decides
//! when they are dispatched.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Effect, SummonSource};
pub use resolver::{DeathSnapshot, EffectResolver, PendingDeath, Resolved, ResolverContext};
pub use targeting::{Requirements, TargetFilter, TargetNeed, TargetSelector};
