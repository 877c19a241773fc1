//! Per-entity tag storage.
//!
//! A tag is a small integer attribute: cost, attack, health, damage taken,
//! keyword flags. Flags are stored as `1` and read with [`TagStore::has`].
//!
//! Writes return a [`TagChange`] when the value actually changed. The game
//! state uses that notification to mark aura recomputation as pending.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Known tag keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    Cost,
    Atk,
    Health,
    Damage,
    Armor,
    Durability,
    Taunt,
    Charge,
    DivineShield,
    Windfury,
    Stealth,
    Frozen,
    Silenced,
    /// Summoning sickness; cleared at the start of the controller's turn.
    Exhausted,
    NumAttacksThisTurn,
    /// Percentage applied to incoming damage; absent means 100.
    IncomingDamageMultiplier,
    /// Deathrattles of this entity fire one extra time.
    ExtraDeathrattles,
    Battlecry,
    Deathrattle,
    Secret,
    /// Destroyed during the current batch; leaves play when deaths are reaped.
    ToBeDestroyed,
}

impl Tag {
    /// Whether this tag is a boolean keyword rather than a number.
    #[must_use]
    pub const fn is_flag(self) -> bool {
        matches!(
            self,
            Tag::Taunt
                | Tag::Charge
                | Tag::DivineShield
                | Tag::Windfury
                | Tag::Stealth
                | Tag::Frozen
                | Tag::Silenced
                | Tag::Exhausted
                | Tag::ExtraDeathrattles
                | Tag::Battlecry
                | Tag::Deathrattle
                | Tag::Secret
                | Tag::ToBeDestroyed
        )
    }

    /// Keywords removed by a silence.
    pub const SILENCEABLE: [Tag; 8] = [
        Tag::Taunt,
        Tag::Charge,
        Tag::DivineShield,
        Tag::Windfury,
        Tag::Stealth,
        Tag::Frozen,
        Tag::Deathrattle,
        Tag::IncomingDamageMultiplier,
    ];
}

/// A tag write that changed the stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagChange {
    pub tag: Tag,
    pub old: i32,
    pub new: i32,
}

/// Mutable key→value tag map for one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStore {
    values: FxHashMap<Tag, i32>,
}

impl TagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, tag: Tag, value: i32) -> Self {
        self.set(tag, value);
        self
    }

    /// Stored value, 0 when absent.
    #[must_use]
    pub fn get(&self, tag: Tag) -> i32 {
        self.values.get(&tag).copied().unwrap_or(0)
    }

    /// True when the tag is present with a non-zero value.
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.get(tag) != 0
    }

    /// Store a value. Zero removes the key.
    pub fn set(&mut self, tag: Tag, value: i32) -> Option<TagChange> {
        let old = self.get(tag);
        if old == value {
            return None;
        }
        if value == 0 {
            self.values.remove(&tag);
        } else {
            self.values.insert(tag, value);
        }
        Some(TagChange { tag, old, new: value })
    }

    /// Add `delta` to the stored value.
    pub fn add(&mut self, tag: Tag, delta: i32) -> Option<TagChange> {
        let value = self.get(tag).saturating_add(delta);
        self.set(tag, value)
    }

    /// Remove a tag entirely.
    pub fn clear(&mut self, tag: Tag) -> Option<TagChange> {
        self.set(tag, 0)
    }

    /// All stored tags, sorted by key.
    #[must_use]
    pub fn sorted(&self) -> Vec<(Tag, i32)> {
        let mut entries: Vec<_> = self.values.iter().map(|(&t, &v)| (t, v)).collect();
        entries.sort_unstable_by_key(|&(t, _)| t);
        entries
    }

    /// Iterate stored tags in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, i32)> + '_ {
        self.values.iter().map(|(&t, &v)| (t, v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Tag, i32)> for TagStore {
    fn from_iter<I: IntoIterator<Item = (Tag, i32)>>(iter: I) -> Self {
        let mut store = TagStore::new();
        for (tag, value) in iter {
            store.set(tag, value);
        }
        store
    }
}
