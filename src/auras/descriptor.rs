//! Aura descriptors: what an aura modifies and whom it applies to.
//!
//! An aura is one tagged value: a [`AuraScope`] naming the candidate set
//! relative to the aura's controller, an optional predicate narrowing it,
//! and an [`AuraModifier`].
//!
//! ```
//! use tavern::auras::{AuraDescriptor, AuraModifier, AuraScope};
//! use tavern::cards::CardType;
//! use tavern::core::Tag;
//!
//! // Enemy spells cost five more
//! let necrotic = AuraDescriptor::new(
//!     "Necrotic Aura",
//!     AuraScope::EnemyHand,
//!     AuraModifier::set(Tag::Cost, |cost| cost + 5),
//! )
//! .with_predicate(|ctx| Ok(ctx.target_type() == Some(CardType::Spell)));
//!
//! assert_eq!(necrotic.scope, AuraScope::EnemyHand);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::cards::definition::CardType;
use crate::core::entity::{Entity, EntityId};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tags::Tag;
use crate::error::ScriptError;

/// Replacement function for a functional override.
pub type ValueFn = Arc<dyn Fn(i32) -> i32 + Send + Sync>;

/// Predicate deciding whether an aura applies to one candidate.
pub type AuraPredicate = Arc<dyn Fn(&AuraContext<'_>) -> Result<bool, ScriptError> + Send + Sync>;

/// How an aura changes a tag.
#[derive(Clone)]
pub enum AuraModifier {
    /// Additive; applied in aura registration order.
    Add(Tag, i32),
    /// Functional override `value = f(value)`; applied after every `Add`.
    Set(Tag, ValueFn),
    /// Meta flag read directly by the engine (e.g. extra deathrattles).
    Flag(Tag),
}

impl AuraModifier {
    /// Convenience constructor for a functional override.
    pub fn set(tag: Tag, f: impl Fn(i32) -> i32 + Send + Sync + 'static) -> Self {
        AuraModifier::Set(tag, Arc::new(f))
    }

    /// The tag this modifier touches.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            AuraModifier::Add(tag, _) | AuraModifier::Set(tag, _) | AuraModifier::Flag(tag) => *tag,
        }
    }
}

impl fmt::Debug for AuraModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuraModifier::Add(tag, n) => write!(f, "Add({tag:?}, {n})"),
            AuraModifier::Set(tag, _) => write!(f, "Set({tag:?}, <fn>)"),
            AuraModifier::Flag(tag) => write!(f, "Flag({tag:?})"),
        }
    }
}

/// Candidate set of an aura, relative to its controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuraScope {
    FriendlyMinions,
    EnemyMinions,
    AllMinions,
    FriendlyHand,
    EnemyHand,
    AllHands,
    FriendlyHero,
    EnemyHero,
    /// The entity an enchantment is attached to.
    Attached,
}

/// A continuous effect declared by a card.
#[derive(Clone)]
pub struct AuraDescriptor {
    pub name: String,
    pub scope: AuraScope,
    pub modifier: AuraModifier,
    predicate: Option<AuraPredicate>,
}

impl AuraDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, scope: AuraScope, modifier: AuraModifier) -> Self {
        Self {
            name: name.into(),
            scope,
            modifier,
            predicate: None,
        }
    }

    /// Builder: narrow the scope with a predicate.
    #[must_use]
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&AuraContext<'_>) -> Result<bool, ScriptError> + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Evaluate the predicate; no predicate means every candidate matches.
    pub fn matches(&self, ctx: &AuraContext<'_>) -> Result<bool, ScriptError> {
        match &self.predicate {
            Some(predicate) => predicate(ctx),
            None => Ok(true),
        }
    }
}

impl fmt::Debug for AuraDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuraDescriptor")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("modifier", &self.modifier)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Read-only view handed to an aura predicate.
///
/// Tag reads through this context see values without aura modifiers, so
/// predicates never depend on the pass that is computing them.
pub struct AuraContext<'a> {
    pub state: &'a GameState,
    pub source: EntityId,
    pub controller: PlayerId,
    pub target: EntityId,
}

impl<'a> AuraContext<'a> {
    #[must_use]
    pub fn target_entity(&self) -> Option<&'a Entity> {
        self.state.entity(self.target)
    }

    #[must_use]
    pub fn target_type(&self) -> Option<CardType> {
        self.target_entity().map(|e| e.card_type)
    }

    #[must_use]
    pub fn target_has(&self, tag: Tag) -> bool {
        self.state.has_tag(self.target, tag)
    }

    #[must_use]
    pub fn is_source(&self) -> bool {
        self.target == self.source
    }
}
