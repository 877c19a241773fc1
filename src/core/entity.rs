//! Entity identification and the entity record.
//!
//! Every card instance in the game (hero, hero power, minion, spell,
//! weapon, enchantment) is an [`Entity`] addressed by an [`EntityId`].
//! Players are addressed by `PlayerId`, the game by the `Game` value
//! itself; neither carries a back-pointer from the entity graph.
//!
//! ## ID Layout
//!
//! IDs are allocated sequentially by the game state starting from
//! [`EntityId::FIRST`]. Allocation order is deterministic, so two games
//! with the same seed and commands produce the same ids.
//!
//! ```
//! use tavern::core::EntityId;
//!
//! let first = EntityId::FIRST;
//! assert_eq!(first.raw(), 1);
//! assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::definition::{CardId, CardType};
use crate::core::player::PlayerId;
use crate::core::tags::{Tag, TagStore};
use crate::zones::Zone;

/// Unique identifier for any game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// First id handed out by a fresh game state.
    pub const FIRST: EntityId = EntityId(1);

    /// Create a new entity ID.
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

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A card instance in some zone.
///
/// `tags` hold the entity's own mutable values. Derived values (base plus
/// attached enchantments plus auras) are read through `GameState::tag`,
/// never directly from here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub card: CardId,
    pub card_type: CardType,
    /// Player whose deck the card started in (or who created it).
    pub owner: PlayerId,
    /// Player currently controlling the entity.
    pub controller: PlayerId,
    pub zone: Zone,
    /// For enchantments: the entity this buff modifies.
    pub attached_to: Option<EntityId>,
    /// Enchantments attached to this entity, oldest first.
    pub enchantments: SmallVec<[EntityId; 4]>,
    pub tags: TagStore,
}

impl Entity {
    /// Create an entity with its base tags.
    #[must_use]
    pub fn new(
        id: EntityId,
        card: CardId,
        card_type: CardType,
        owner: PlayerId,
        zone: Zone,
        tags: TagStore,
    ) -> Self {
        Self {
            id,
            card,
            card_type,
            owner,
            controller: owner,
            zone,
            attached_to: None,
            enchantments: SmallVec::new(),
            tags,
        }
    }

    /// Builder: attach to a target (enchantments only).
    #[must_use]
    pub fn with_attached_to(mut self, target: EntityId) -> Self {
        self.attached_to = Some(target);
        self
    }

    /// Builder: set the controller.
    #[must_use]
    pub fn with_controller(mut self, controller: PlayerId) -> Self {
        self.controller = controller;
        self
    }

    /// Characters are the entities that can attack and be attacked.
    #[must_use]
    pub fn is_character(&self) -> bool {
        matches!(self.card_type, CardType::Hero | CardType::Minion)
    }

    #[must_use]
    pub fn is_minion(&self) -> bool {
        self.card_type == CardType::Minion
    }

    #[must_use]
    pub fn is_silenced(&self) -> bool {
        self.tags.has(Tag::Silenced)
    }
}
