//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card: type, class,
//! base tags (cost, attack, health, keywords), collectibility, deck
//! limits and play requirements. Behavior lives in `CardScript`, next to
//! the definition in the registry.
//!
//! Instance-specific data (damage taken, buffs, zone) is stored on the
//! `Entity`.

use serde::{Deserialize, Serialize};

use crate::core::tags::{Tag, TagStore};
use crate::effects::Requirements;

/// Unique identifier for a card definition.
///
/// Assigned by the registry in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
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

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Hero,
    HeroPower,
    Minion,
    Spell,
    Weapon,
    Enchantment,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardClass {
    #[default]
    Neutral,
    Druid,
    Hunter,
    Mage,
    Paladin,
    Priest,
    Rogue,
    Shaman,
    Warlock,
    Warrior,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Beast,
    Demon,
    Murloc,
    Mech,
}

/// Immutable card template.
///
/// ```
/// use tavern::cards::{CardDefinition, CardType};
/// use tavern::core::Tag;
///
/// let grunt = CardDefinition::minion("CS2_121", "Frostwolf Grunt", 2, 2, 2)
///     .with_tag(Tag::Taunt, 1)
///     .collectible();
///
/// assert_eq!(grunt.card_type, CardType::Minion);
/// assert_eq!(grunt.base_tag(Tag::Cost), 2);
/// assert!(grunt.base_tag(Tag::Taunt) == 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Set by the registry on registration.
    pub id: CardId,
    /// Stable external key, e.g. `"FP1_001"`.
    pub code: String,
    pub name: String,
    pub card_type: CardType,
    pub card_class: CardClass,
    pub race: Option<Race>,
    pub collectible: bool,
    pub max_copies: u8,
    pub tags: TagStore,
    /// Hero power granted by a hero card.
    pub hero_power: Option<String>,
    /// Cards a script may pick from at random.
    pub entourage: Vec<String>,
    /// Choose One options; the chosen card's script runs instead.
    pub choose_cards: Vec<String>,
    pub requirements: Requirements,
}

impl CardDefinition {
    /// A card of the given type with no tags.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: CardId::default(),
            code: code.into(),
            name: name.into(),
            card_type,
            card_class: CardClass::Neutral,
            race: None,
            collectible: false,
            max_copies: 2,
            tags: TagStore::new(),
            hero_power: None,
            entourage: Vec::new(),
            choose_cards: Vec::new(),
            requirements: Requirements::none(),
        }
    }

    #[must_use]
    pub fn minion(code: impl Into<String>, name: impl Into<String>, cost: i32, atk: i32, health: i32) -> Self {
        Self::new(code, name, CardType::Minion)
            .with_tag(Tag::Cost, cost)
            .with_tag(Tag::Atk, atk)
            .with_tag(Tag::Health, health)
    }

    #[must_use]
    pub fn spell(code: impl Into<String>, name: impl Into<String>, cost: i32) -> Self {
        Self::new(code, name, CardType::Spell).with_tag(Tag::Cost, cost)
    }

    #[must_use]
    pub fn weapon(code: impl Into<String>, name: impl Into<String>, cost: i32, atk: i32, durability: i32) -> Self {
        Self::new(code, name, CardType::Weapon)
            .with_tag(Tag::Cost, cost)
            .with_tag(Tag::Atk, atk)
            .with_tag(Tag::Durability, durability)
    }

    #[must_use]
    pub fn hero(code: impl Into<String>, name: impl Into<String>, class: CardClass, power: impl Into<String>) -> Self {
        let mut def = Self::new(code, name, CardType::Hero).with_class(class);
        def.hero_power = Some(power.into());
        def
    }

    #[must_use]
    pub fn hero_power(code: impl Into<String>, name: impl Into<String>, cost: i32) -> Self {
        Self::new(code, name, CardType::HeroPower).with_tag(Tag::Cost, cost)
    }

    /// A buff. Its numeric tags are added to the entity it is attached to.
    #[must_use]
    pub fn enchantment(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(code, name, CardType::Enchantment)
    }

    #[must_use]
    pub fn with_class(mut self, class: CardClass) -> Self {
        self.card_class = class;
        self
    }

    #[must_use]
    pub fn with_race(mut self, race: Race) -> Self {
        self.race = Some(race);
        self
    }

    #[must_use]
    pub fn collectible(mut self) -> Self {
        self.collectible = true;
        self
    }

    /// Legendary cards: one copy per deck.
    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.max_copies = 1;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag, value: i32) -> Self {
        self.tags.set(tag, value);
        self
    }

    #[must_use]
    pub fn with_entourage<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.entourage = codes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_choices<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.choose_cards = codes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Base value of a tag, 0 when absent.
    #[must_use]
    pub fn base_tag(&self, tag: Tag) -> i32 {
        self.tags.get(tag)
    }

    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.tags.has(Tag::Secret)
    }

    /// Cards that go into decks (heroes and tokens do not).
    #[must_use]
    pub fn is_draftable(&self) -> bool {
        self.collectible
            && matches!(self.card_type, CardType::Minion | CardType::Spell | CardType::Weapon)
    }
}

impl Default for CardId {
    fn default() -> Self {
        CardId(u32::MAX)
    }
}
