//! Card registry: definitions and scripts by id and by code.
//!
//! The registry is built once, then shared immutably between games
//! (`Arc<CardRegistry>`). Ids are assigned in registration order.
//!
//! ## Derived keywords
//!
//! Registration sets the `Battlecry` tag on minions with a play action
//! and the `Deathrattle` tag on cards with a deathrattle, so auras and
//! scripts can ask for them without consulting the script.

use rustc_hash::FxHashMap;

use super::definition::{CardClass, CardDefinition, CardId, CardType};
use super::script::CardScript;
use super::sets;
use crate::core::rng::GameRng;
use crate::core::tags::Tag;
use crate::error::{EngineError, EngineResult, ScriptError};
use crate::sampler::{self, SamplerError, WeightedPool};

#[derive(Clone, Debug)]
struct CardEntry {
    definition: CardDefinition,
    script: CardScript,
}

/// Registry of card definitions and their scripts.
///
/// ## Example
///
/// ```
/// use tavern::cards::{CardDefinition, CardRegistry, CardScript};
///
/// let mut registry = CardRegistry::new();
/// let yeti = registry
///     .register(CardDefinition::minion("CS2_182", "Chillwind Yeti", 4, 4, 5), CardScript::new())
///     .unwrap();
///
/// assert_eq!(registry.lookup("CS2_182"), Ok(yeti));
/// assert!(registry.register(CardDefinition::minion("CS2_182", "Again", 1, 1, 1), CardScript::new()).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: Vec<CardEntry>,
    by_code: FxHashMap<String, CardId>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every card set shipped with the engine.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        sets::register_all(&mut registry);
        registry
    }

    /// Register a card with its script, returning the assigned id.
    pub fn register(&mut self, mut definition: CardDefinition, script: CardScript) -> Result<CardId, ScriptError> {
        if self.by_code.contains_key(&definition.code) {
            return Err(ScriptError::DuplicateCard(definition.code));
        }
        let id = CardId::new(self.cards.len() as u32);
        definition.id = id;
        if script.action.is_some() && definition.card_type == CardType::Minion {
            definition.tags.set(Tag::Battlecry, 1);
        }
        if script.deathrattle.is_some() {
            definition.tags.set(Tag::Deathrattle, 1);
        }
        self.by_code.insert(definition.code.clone(), id);
        self.cards.push(CardEntry { definition, script });
        Ok(id)
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn definition(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(id.raw() as usize).map(|e| &e.definition)
    }

    /// Get a card's script by ID.
    #[must_use]
    pub fn script(&self, id: CardId) -> Option<&CardScript> {
        self.cards.get(id.raw() as usize).map(|e| &e.script)
    }

    /// Find a definition by code.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&CardDefinition> {
        self.by_code.get(code).and_then(|&id| self.definition(id))
    }

    /// Resolve a code to its id.
    pub fn lookup(&self, code: &str) -> Result<CardId, ScriptError> {
        self.by_code
            .get(code)
            .copied()
            .ok_or_else(|| ScriptError::UnknownCard(code.to_string()))
    }

    /// Number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter().map(|e| &e.definition)
    }

    /// Check every code a definition refers to (hero powers, choices,
    /// entourage) is registered.
    pub fn validate(&self) -> Result<(), ScriptError> {
        for def in self.iter() {
            let refs = def
                .hero_power
                .iter()
                .chain(&def.entourage)
                .chain(&def.choose_cards);
            for code in refs {
                self.lookup(code)?;
            }
            if def.card_type == CardType::Hero && def.hero_power.is_none() {
                return Err(ScriptError::Malformed(format!("hero {} has no hero power", def.code)));
            }
        }
        Ok(())
    }

    /// Resolve a deck list, enforcing card types and copy limits.
    pub fn resolve_deck<S: AsRef<str>>(&self, codes: &[S]) -> EngineResult<Vec<CardId>> {
        let mut counts: FxHashMap<CardId, u8> = FxHashMap::default();
        let mut deck = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.as_ref();
            let id = self.lookup(code)?;
            let def = self
                .definition(id)
                .ok_or_else(|| ScriptError::UnknownCard(code.to_string()))?;
            if !matches!(def.card_type, CardType::Minion | CardType::Spell | CardType::Weapon) {
                return Err(EngineError::InvalidDeck(format!("{code} cannot be put in a deck")));
            }
            let count = counts.entry(id).or_default();
            *count += 1;
            if *count > def.max_copies {
                return Err(EngineError::InvalidDeck(format!(
                    "{} copies of {code}, at most {} allowed",
                    count, def.max_copies
                )));
            }
            deck.push(id);
        }
        Ok(deck)
    }

    /// Draft a random deck for `class` from collectible class and neutral
    /// cards, every card offered up to its copy limit.
    pub fn random_draft(&self, class: CardClass, rng: &mut GameRng, size: usize) -> Result<Vec<String>, SamplerError> {
        let copies = |wanted: CardClass| -> Vec<&str> {
            self.iter()
                .filter(|d| d.is_draftable() && d.card_class == wanted)
                .flat_map(|d| std::iter::repeat(d.code.as_str()).take(usize::from(d.max_copies)))
                .collect()
        };
        let class_cards = if class == CardClass::Neutral { Vec::new() } else { copies(class) };
        let neutral_cards = copies(CardClass::Neutral);

        let pools = [WeightedPool::new(&class_cards, 1), WeightedPool::new(&neutral_cards, 1)];
        let picked = sampler::sample(rng, &pools, size)?;
        Ok(picked.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_ids_in_order() {
        let mut registry = CardRegistry::new();
        let a = registry.register(CardDefinition::minion("A", "A", 1, 1, 1), CardScript::new()).unwrap();
        let b = registry.register(CardDefinition::spell("B", "B", 1), CardScript::new()).unwrap();

        assert_eq!(a, CardId(0));
        assert_eq!(b, CardId(1));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("B").map(|d| d.id), Some(b));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::spell("X", "X", 1), CardScript::new()).unwrap();
        let err = registry.register(CardDefinition::spell("X", "Y", 2), CardScript::new()).unwrap_err();
        assert_eq!(err, ScriptError::DuplicateCard("X".into()));
    }

    #[test]
    fn test_keywords_derived_from_script() {
        let mut registry = CardRegistry::new();
        let id = registry
            .register(
                CardDefinition::minion("M", "M", 1, 1, 1),
                CardScript::new().on_play(|_, _| Ok(())).deathrattle(|_| Ok(())),
            )
            .unwrap();
        let def = registry.definition(id).unwrap();
        assert!(def.tags.has(Tag::Battlecry));
        assert!(def.tags.has(Tag::Deathrattle));
    }

    #[test]
    fn test_unknown_lookup() {
        let registry = CardRegistry::new();
        assert_eq!(registry.lookup("NOPE"), Err(ScriptError::UnknownCard("NOPE".into())));
    }

    #[test]
    fn test_standard_is_consistent() {
        let registry = CardRegistry::standard();
        registry.validate().unwrap();
        assert!(registry.find("FP1_031").is_some());
        assert!(registry.find("GAME_005").is_some());
    }

    #[test]
    fn test_resolve_deck_copy_limit() {
        let registry = CardRegistry::standard();
        assert!(registry.resolve_deck(&["FP1_001", "FP1_001"]).is_ok());

        let err = registry.resolve_deck(&["FP1_001", "FP1_001", "FP1_001"]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDeck(_)));

        // Legendary
        let err = registry.resolve_deck(&["FP1_030", "FP1_030"]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDeck(_)));

        let err = registry.resolve_deck(&["HERO_08"]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDeck(_)));
    }

    #[test]
    fn test_random_draft() {
        let registry = CardRegistry::standard();
        let mut rng = GameRng::new(7);

        let deck = registry.random_draft(CardClass::Mage, &mut rng, 30).unwrap();

        assert_eq!(deck.len(), 30);
        registry.resolve_deck(&deck).unwrap();
        for code in &deck {
            let class = registry.find(code).unwrap().card_class;
            assert!(class == CardClass::Mage || class == CardClass::Neutral);
        }
    }

    #[test]
    fn test_random_draft_exhausted() {
        let registry = CardRegistry::standard();
        let mut rng = GameRng::new(7);
        let err = registry.random_draft(CardClass::Mage, &mut rng, 10_000).unwrap_err();
        assert!(matches!(err, SamplerError::Exhausted { requested: 10_000, .. }));
    }
}
