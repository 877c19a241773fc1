//! Balance-testing cards.

use super::add;
use crate::cards::definition::{CardClass, CardDefinition};
use crate::cards::registry::CardRegistry;
use crate::cards::script::CardScript;
use crate::effects::Requirements;
use crate::error::ScriptError;

pub(super) fn register(registry: &mut CardRegistry) {
    // Flame Lance
    add(
        registry,
        CardDefinition::spell("BS_001", "Flame Lance", 5)
            .with_class(CardClass::Mage)
            .with_requirements(Requirements::minion_target())
            .collectible(),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("BS_001".into()))?;
            ctx.hit(target, 8);
            Ok(())
        }),
    );

    // Armor Vendor: 4 armor for both heroes
    add(
        registry,
        CardDefinition::minion("BS_002", "Armor Vendor", 1, 1, 3).collectible(),
        CardScript::new().on_play(|ctx, _| {
            for player in [ctx.controller(), ctx.opponent()] {
                let hero = ctx.hero(player);
                ctx.gain_armor(hero, 4);
            }
            Ok(())
        }),
    );
}
