//! Attack eligibility.
//!
//! Pure reads: the command layer validates with these before mutating
//! and the legal-command enumeration uses the same functions, so the two
//! can never disagree.

use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tags::Tag;

/// Whether `attacker` may attack for `player` right now.
pub(crate) fn can_attack(state: &GameState, attacker: EntityId, player: PlayerId) -> bool {
    let Some(entity) = state.entity(attacker) else {
        return false;
    };
    if !state.in_play(attacker) || !entity.is_character() || entity.controller != player {
        return false;
    }
    if state.attack(attacker) <= 0 || state.has_tag(attacker, Tag::Frozen) {
        return false;
    }
    if state.has_tag(attacker, Tag::Exhausted) && !state.has_tag(attacker, Tag::Charge) {
        return false;
    }
    let allowed = if state.has_tag(attacker, Tag::Windfury) { 2 } else { 1 };
    state.tag(attacker, Tag::NumAttacksThisTurn) < allowed
}

/// Characters `player` may attack, hero first.
///
/// Stealthed characters are never attackable; if any remaining enemy
/// minion has taunt, only taunts are.
pub(crate) fn defenders(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    let visible: Vec<EntityId> = state
        .characters(player.opponent())
        .into_iter()
        .filter(|&e| state.in_play(e) && !state.has_tag(e, Tag::Stealth))
        .collect();
    let taunts: Vec<EntityId> = visible
        .iter()
        .copied()
        .filter(|&e| state.has_tag(e, Tag::Taunt))
        .collect();
    if taunts.is_empty() {
        visible
    } else {
        taunts
    }
}

/// Characters of `player` that can attack, hero first.
pub(crate) fn attackers(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    state
        .characters(player)
        .into_iter()
        .filter(|&e| can_attack(state, e, player))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRegistry;
    use crate::testing::Fixture;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    #[test]
    fn test_summoning_sickness_and_charge() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let yeti = fx.summon(P0, "CS2_182");
        let wolfrider = fx.summon(P0, "CS2_124");

        let state = fx.game.state();
        assert!(!can_attack(state, yeti, P0));
        assert!(can_attack(state, wolfrider, P0));
        assert_eq!(attackers(state, P0), vec![wolfrider]);
    }

    #[test]
    fn test_taunt_restricts_defenders() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let yeti = fx.summon(P1, "CS2_182");
        assert_eq!(defenders(fx.game.state(), P0), vec![fx.hero(P1), yeti]);

        let grunt = fx.summon(P1, "CS2_121");
        assert_eq!(defenders(fx.game.state(), P0), vec![grunt]);
    }

    #[test]
    fn test_stealth_hides_defender() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let shade = fx.summon(P1, "FP1_005");
        assert!(!defenders(fx.game.state(), P0).contains(&shade));
    }

    #[test]
    fn test_wrong_controller_cannot_attack() {
        let mut fx = Fixture::new(CardRegistry::standard());
        let wolfrider = fx.summon(P1, "CS2_124");
        assert!(!can_attack(fx.game.state(), wolfrider, P0));
    }
}
