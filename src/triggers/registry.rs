//! Trigger registry: subscriptions of live entities to game events.
//!
//! ## Ordering
//!
//! Trigger ids grow monotonically and each event kind keeps its listeners
//! in registration order, so "oldest subscription first" is simply list
//! order. [`TriggerRegistry::listeners`] returns a snapshot: triggers
//! registered while that snapshot is being dispatched are not in it.
//!
//! ## Liveness
//!
//! Removing an owner's triggers ([`TriggerRegistry::remove_for_owner`])
//! is permanent. A dispatch that still holds the removed id in its
//! snapshot finds nothing on lookup and skips it.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::cards::script::EventHandler;
use crate::core::EntityId;

use super::condition::TriggerCondition;
use super::event::EventKind;

/// Unique identifier for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// A subscription of one entity to one event kind.
#[derive(Clone)]
pub struct Trigger {
    /// Assigned on registration.
    pub id: TriggerId,

    /// Human-readable name for logs.
    pub name: String,

    /// Entity that owns the subscription.
    pub owner: EntityId,

    /// Event kind listened to.
    pub kind: EventKind,

    /// Owner-relative condition checked at fire time.
    pub condition: TriggerCondition,

    /// Card-script handler.
    pub handler: EventHandler,
}

impl Trigger {
    /// Create a trigger. The id is assigned by the registry.
    pub fn new(name: impl Into<String>, owner: EntityId, kind: EventKind, handler: EventHandler) -> Self {
        Self {
            id: TriggerId::new(0),
            name: name.into(),
            owner,
            kind,
            condition: TriggerCondition::Always,
            handler,
        }
    }

    /// Builder: set condition.
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("condition", &self.condition)
            .finish()
    }
}

/// Registry of all active triggers.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    triggers: FxHashMap<TriggerId, Trigger>,
    by_event: FxHashMap<EventKind, Vec<TriggerId>>,
    by_owner: FxHashMap<EntityId, SmallVec<[TriggerId; 2]>>,
    next_id: u32,
}

impl TriggerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger, assigning the next id.
    pub fn register(&mut self, mut trigger: Trigger) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        trigger.id = id;

        trace!(%id, name = %trigger.name, owner = %trigger.owner, kind = ?trigger.kind, "trigger registered");
        self.by_event.entry(trigger.kind).or_default().push(id);
        self.by_owner.entry(trigger.owner).or_default().push(id);
        self.triggers.insert(id, trigger);
        id
    }

    /// Remove every trigger owned by an entity, returning how many.
    pub fn remove_for_owner(&mut self, owner: EntityId) -> usize {
        let ids = self.by_owner.remove(&owner).unwrap_or_default();
        for &id in &ids {
            if let Some(trigger) = self.triggers.remove(&id) {
                if let Some(list) = self.by_event.get_mut(&trigger.kind) {
                    list.retain(|&t| t != id);
                }
            }
        }
        ids.len()
    }

    /// Get a trigger by ID.
    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(&id)
    }

    /// Snapshot of the listeners for an event kind, oldest first.
    #[must_use]
    pub fn listeners(&self, kind: EventKind) -> VecDeque<TriggerId> {
        self.by_event
            .get(&kind)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Get total number of triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Iterate all triggers in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::script::event_handler;

    fn noop() -> EventHandler {
        event_handler(|_, _| Ok(()))
    }

    #[test]
    fn test_trigger_id() {
        let id = TriggerId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Trigger(5)");
    }

    #[test]
    fn test_register_assigns_increasing_ids() {
        let mut registry = TriggerRegistry::new();
        let a = registry.register(Trigger::new("A", EntityId(10), EventKind::TurnBegin, noop()));
        let b = registry.register(Trigger::new("B", EntityId(11), EventKind::TurnBegin, noop()));

        assert!(a < b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).map(|t| t.name.as_str()), Some("A"));
    }

    #[test]
    fn test_listeners_in_registration_order() {
        let mut registry = TriggerRegistry::new();
        let first = registry.register(Trigger::new("First", EntityId(30), EventKind::Summon, noop()));
        registry.register(Trigger::new("Other", EntityId(30), EventKind::Death, noop()));
        let second = registry.register(Trigger::new("Second", EntityId(20), EventKind::Summon, noop()));

        let listeners: Vec<_> = registry.listeners(EventKind::Summon).into_iter().collect();
        assert_eq!(listeners, vec![first, second]);
        assert!(registry.listeners(EventKind::Heal).is_empty());
    }

    #[test]
    fn test_snapshot_excludes_later_registrations() {
        let mut registry = TriggerRegistry::new();
        registry.register(Trigger::new("Early", EntityId(1), EventKind::Summon, noop()));

        let snapshot = registry.listeners(EventKind::Summon);
        registry.register(Trigger::new("Late", EntityId(2), EventKind::Summon, noop()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.listeners(EventKind::Summon).len(), 2);
    }

    #[test]
    fn test_remove_for_owner() {
        let mut registry = TriggerRegistry::new();
        let t1 = registry.register(Trigger::new("Card1", EntityId(10), EventKind::TurnBegin, noop()));
        registry.register(Trigger::new("Card1Also", EntityId(10), EventKind::TurnEnd, noop()));
        let t3 = registry.register(Trigger::new("Card2", EntityId(20), EventKind::TurnBegin, noop()));

        assert_eq!(registry.remove_for_owner(EntityId(10)), 2);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(t1).is_none());
        assert!(registry.get(t3).is_some());
        assert!(registry.listeners(EventKind::TurnEnd).is_empty());
        assert_eq!(registry.remove_for_owner(EntityId(10)), 0);
    }
}
