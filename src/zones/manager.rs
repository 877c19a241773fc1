//! Zone manager for entity locations and movement.
//!
//! Every entity lives in exactly one `(PlayerId, Zone)` list. Lists are
//! ordered: for the deck the last element is the top card, for play the
//! first element is the leftmost minion.
//!
//! Movement is remove-then-insert inside a single call, so no caller can
//! observe an entity in two lists or in none. A request that would break
//! that (adding a tracked entity, moving an untracked one) is reported as
//! an engine invariant violation instead of being applied.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::error::{EngineError, EngineResult};

/// Kinds of zone each player owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    /// Heroes, hero powers, weapons, minions and attached enchantments.
    Play,
    Graveyard,
    Secret,
    /// Spells while they resolve, cards waiting to be placed.
    SetAside,
    RemovedFromGame,
}

impl Zone {
    /// Zones whose entities keep their triggers subscribed.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Zone::Play | Zone::Secret)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Position for inserting an entity into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Append (top of deck, right end of the field).
    Top,
    /// Prepend (bottom of deck, left end of the field).
    Bottom,
    /// Insert at a specific index, clamped to the zone length.
    Index(usize),
}

/// Tracks which zone list each entity is in.
///
/// ```
/// use tavern::zones::{Zone, ZoneManager, ZonePosition};
/// use tavern::core::{EntityId, PlayerId};
///
/// let mut zones = ZoneManager::new();
/// let p0 = PlayerId::new(0);
///
/// zones.add(EntityId(10), p0, Zone::Deck, ZonePosition::Top).unwrap();
/// zones.add(EntityId(11), p0, Zone::Deck, ZonePosition::Top).unwrap();
/// assert_eq!(zones.top(p0, Zone::Deck), Some(EntityId(11)));
///
/// zones.move_to(EntityId(11), p0, Zone::Hand, ZonePosition::Top).unwrap();
/// assert_eq!(zones.entities(p0, Zone::Hand), &[EntityId(11)]);
///
/// // Double insertion is rejected.
/// assert!(zones.add(EntityId(10), p0, Zone::Hand, ZonePosition::Top).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// entity -> (player, zone)
    locations: FxHashMap<EntityId, (PlayerId, Zone)>,
    /// (player, zone) -> ordered entities
    zone_order: FxHashMap<(PlayerId, Zone), Vec<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an untracked entity to a zone.
    pub fn add(
        &mut self,
        entity: EntityId,
        player: PlayerId,
        zone: Zone,
        position: ZonePosition,
    ) -> EngineResult<()> {
        if let Some(&(owner, current)) = self.locations.get(&entity) {
            return Err(EngineError::InvariantViolation(format!(
                "{entity} is already in {current} of {owner}"
            )));
        }
        self.locations.insert(entity, (player, zone));
        Self::insert_at(self.zone_order.entry((player, zone)).or_default(), entity, position);
        Ok(())
    }

    /// Move a tracked entity to another zone, returning where it was.
    pub fn move_to(
        &mut self,
        entity: EntityId,
        player: PlayerId,
        zone: Zone,
        position: ZonePosition,
    ) -> EngineResult<(PlayerId, Zone)> {
        let old = self.detach(entity)?;
        self.locations.insert(entity, (player, zone));
        Self::insert_at(self.zone_order.entry((player, zone)).or_default(), entity, position);
        Ok(old)
    }

    /// Stop tracking an entity entirely.
    pub fn remove(&mut self, entity: EntityId) -> EngineResult<(PlayerId, Zone)> {
        self.detach(entity)
    }

    fn detach(&mut self, entity: EntityId) -> EngineResult<(PlayerId, Zone)> {
        let old = self.locations.remove(&entity).ok_or_else(|| {
            EngineError::InvariantViolation(format!("{entity} is not in any zone"))
        })?;
        let list = self.zone_order.get_mut(&old).ok_or_else(|| {
            EngineError::InvariantViolation(format!("{entity} has no zone list"))
        })?;
        let before = list.len();
        list.retain(|&e| e != entity);
        if before - list.len() != 1 {
            return Err(EngineError::InvariantViolation(format!(
                "{entity} appeared {} times in {} of {}",
                before - list.len(),
                old.1,
                old.0
            )));
        }
        Ok(old)
    }

    fn insert_at(list: &mut Vec<EntityId>, entity: EntityId, position: ZonePosition) {
        match position {
            ZonePosition::Top => list.push(entity),
            ZonePosition::Bottom => list.insert(0, entity),
            ZonePosition::Index(i) => {
                let idx = i.min(list.len());
                list.insert(idx, entity);
            }
        }
    }

    /// Get the location of an entity.
    #[must_use]
    pub fn location(&self, entity: EntityId) -> Option<(PlayerId, Zone)> {
        self.locations.get(&entity).copied()
    }

    /// Ordered entities of one zone.
    #[must_use]
    pub fn entities(&self, player: PlayerId, zone: Zone) -> &[EntityId] {
        self.zone_order.get(&(player, zone)).map_or(&[], |v| v.as_slice())
    }

    #[must_use]
    pub fn len(&self, player: PlayerId, zone: Zone) -> usize {
        self.entities(player, zone).len()
    }

    /// Index of an entity within its zone list.
    #[must_use]
    pub fn position_of(&self, entity: EntityId) -> Option<usize> {
        let key = self.locations.get(&entity)?;
        self.zone_order.get(key)?.iter().position(|&e| e == entity)
    }

    /// The last entity of a zone (top of deck).
    #[must_use]
    pub fn top(&self, player: PlayerId, zone: Zone) -> Option<EntityId> {
        self.entities(player, zone).last().copied()
    }

    /// Shuffle one zone.
    pub fn shuffle(&mut self, player: PlayerId, zone: Zone, rng: &mut GameRng) {
        if let Some(list) = self.zone_order.get_mut(&(player, zone)) {
            rng.shuffle(list);
        }
    }

    /// Total number of tracked entities.
    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Verify that every tracked entity appears exactly once, in the list
    /// its location points at.
    pub fn check_consistency(&self) -> EngineResult<()> {
        let mut seen: FxHashMap<EntityId, (PlayerId, Zone)> = FxHashMap::default();
        for (&key, list) in &self.zone_order {
            for &entity in list {
                if let Some(other) = seen.insert(entity, key) {
                    return Err(EngineError::InvariantViolation(format!(
                        "{entity} is in both {} of {} and {} of {}",
                        other.1, other.0, key.1, key.0
                    )));
                }
                if self.locations.get(&entity) != Some(&key) {
                    return Err(EngineError::InvariantViolation(format!(
                        "{entity} is listed in {} of {} but located elsewhere",
                        key.1, key.0
                    )));
                }
            }
        }
        if seen.len() != self.locations.len() {
            return Err(EngineError::InvariantViolation(
                "zone lists and locations disagree".to_string(),
            ));
        }
        Ok(())
    }
}
