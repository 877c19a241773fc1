//! Basic set: heroes, hero powers, core minions and spells, tokens.

use super::{add, vanilla};
use crate::auras::{AuraDescriptor, AuraModifier, AuraScope};
use crate::cards::definition::{CardClass, CardDefinition, Race};
use crate::cards::registry::CardRegistry;
use crate::cards::script::CardScript;
use crate::core::tags::Tag;
use crate::effects::{Requirements, TargetFilter};
use crate::error::ScriptError;
use crate::triggers::Hook;

pub(super) fn register(registry: &mut CardRegistry) {
    heroes(registry);
    spells(registry);
    minions(registry);
    tokens(registry);
}

fn heroes(registry: &mut CardRegistry) {
    vanilla(
        registry,
        CardDefinition::hero("HERO_08", "Jaina Proudmoore", CardClass::Mage, "CS2_034").with_tag(Tag::Health, 30),
    );
    vanilla(
        registry,
        CardDefinition::hero("HERO_01", "Garrosh Hellscream", CardClass::Warrior, "CS2_102").with_tag(Tag::Health, 30),
    );

    // Fireblast
    add(
        registry,
        CardDefinition::hero_power("CS2_034", "Fireblast", 2)
            .with_class(CardClass::Mage)
            .with_requirements(Requirements::any_target()),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("CS2_034".into()))?;
            ctx.hit(target, 1);
            Ok(())
        }),
    );

    // Armor Up!
    add(
        registry,
        CardDefinition::hero_power("CS2_102", "Armor Up!", 2).with_class(CardClass::Warrior),
        CardScript::new().on_play(|ctx, _| {
            let hero = ctx.hero(ctx.controller());
            ctx.gain_armor(hero, 2);
            Ok(())
        }),
    );
}

fn spells(registry: &mut CardRegistry) {
    // The Coin
    add(
        registry,
        CardDefinition::spell("GAME_005", "The Coin", 0),
        CardScript::new().on_play(|ctx, _| {
            ctx.gain_mana(ctx.controller(), 1);
            Ok(())
        }),
    );

    // Fireball
    add(
        registry,
        CardDefinition::spell("CS2_029", "Fireball", 4)
            .with_class(CardClass::Mage)
            .with_requirements(Requirements::any_target())
            .collectible(),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("CS2_029".into()))?;
            ctx.hit(target, 6);
            Ok(())
        }),
    );

    // Arcane Explosion
    add(
        registry,
        CardDefinition::spell("CS2_025", "Arcane Explosion", 2)
            .with_class(CardClass::Mage)
            .collectible(),
        CardScript::new().on_play(|ctx, _| {
            for minion in ctx.field(ctx.opponent()) {
                ctx.hit(minion, 1);
            }
            Ok(())
        }),
    );

    // Execute
    add(
        registry,
        CardDefinition::spell("CS2_108", "Execute", 1)
            .with_class(CardClass::Warrior)
            .with_requirements(
                Requirements::minion_target()
                    .with_filter(TargetFilter::Enemy)
                    .with_filter(TargetFilter::Damaged),
            )
            .collectible(),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("CS2_108".into()))?;
            ctx.destroy(target);
            Ok(())
        }),
    );

    // Wrath: choose one
    vanilla(
        registry,
        CardDefinition::spell("EX1_154", "Wrath", 2)
            .with_class(CardClass::Druid)
            .with_choices(["EX1_154a", "EX1_154b"])
            .collectible(),
    );
    add(
        registry,
        CardDefinition::spell("EX1_154a", "Wrath (3 damage)", 2)
            .with_class(CardClass::Druid)
            .with_requirements(Requirements::minion_target()),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("EX1_154a".into()))?;
            ctx.hit(target, 3);
            Ok(())
        }),
    );
    add(
        registry,
        CardDefinition::spell("EX1_154b", "Wrath (1 damage, draw)", 2)
            .with_class(CardClass::Druid)
            .with_requirements(Requirements::minion_target()),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("EX1_154b".into()))?;
            ctx.hit(target, 1);
            ctx.draw(ctx.controller());
            Ok(())
        }),
    );

    // Snipe: secret, fires on the opponent's turn
    add(
        registry,
        CardDefinition::spell("EX1_609", "Snipe", 2)
            .with_class(CardClass::Hunter)
            .with_tag(Tag::Secret, 1)
            .collectible(),
        CardScript::new().on(Hook::EnemyMinionSummon, |ctx, event| {
            if ctx.state().current_player() == ctx.controller() {
                return Ok(());
            }
            if let Some(minion) = event.target {
                ctx.hit(minion, 4);
                ctx.destroy(ctx.source());
            }
            Ok(())
        }),
    );

    // Fiery War Axe
    vanilla(
        registry,
        CardDefinition::weapon("CS2_106", "Fiery War Axe", 2, 3, 2)
            .with_class(CardClass::Warrior)
            .collectible(),
    );
}

fn minions(registry: &mut CardRegistry) {
    vanilla(
        registry,
        CardDefinition::minion("CS2_168", "Murloc Raider", 1, 2, 1)
            .with_race(Race::Murloc)
            .collectible(),
    );
    vanilla(
        registry,
        CardDefinition::minion("CS2_120", "River Crocolisk", 2, 2, 3)
            .with_race(Race::Beast)
            .collectible(),
    );
    vanilla(registry, CardDefinition::minion("CS2_182", "Chillwind Yeti", 4, 4, 5).collectible());
    vanilla(
        registry,
        CardDefinition::minion("CS2_172", "Bloodfen Raptor", 2, 3, 2)
            .with_race(Race::Beast)
            .collectible(),
    );
    vanilla(
        registry,
        CardDefinition::minion("CS2_121", "Frostwolf Grunt", 2, 2, 2)
            .with_tag(Tag::Taunt, 1)
            .collectible(),
    );
    vanilla(
        registry,
        CardDefinition::minion("CS2_124", "Wolfrider", 3, 3, 1)
            .with_tag(Tag::Charge, 1)
            .collectible(),
    );
    vanilla(
        registry,
        CardDefinition::minion("CS2_065", "Voidwalker", 1, 1, 3)
            .with_class(CardClass::Warlock)
            .with_race(Race::Demon)
            .with_tag(Tag::Taunt, 1)
            .collectible(),
    );

    // Elven Archer
    add(
        registry,
        CardDefinition::minion("CS2_189", "Elven Archer", 1, 1, 1)
            .with_requirements(Requirements::any_target().with_filter(TargetFilter::NotSelf).if_available())
            .collectible(),
        CardScript::new().on_play(|ctx, target| {
            if let Some(target) = target {
                ctx.hit(target, 1);
            }
            Ok(())
        }),
    );

    // Raid Leader
    add(
        registry,
        CardDefinition::minion("CS2_122", "Raid Leader", 3, 2, 2).collectible(),
        CardScript::new().aura(
            AuraDescriptor::new("Raid Leader Aura", AuraScope::FriendlyMinions, AuraModifier::Add(Tag::Atk, 1))
                .with_predicate(|ctx| Ok(!ctx.is_source())),
        ),
    );
}

fn tokens(registry: &mut CardRegistry) {
    vanilla(registry, CardDefinition::minion("FP1_002t", "Spectral Spider", 1, 1, 1));
    vanilla(registry, CardDefinition::minion("FP1_007t", "Nerubian", 3, 4, 4));
    vanilla(
        registry,
        CardDefinition::minion("FP1_012t", "Slime", 1, 1, 2).with_tag(Tag::Taunt, 1),
    );

    vanilla(
        registry,
        CardDefinition::enchantment("FP1_005e", "Consume")
            .with_tag(Tag::Atk, 1)
            .with_tag(Tag::Health, 1),
    );
    vanilla(registry, CardDefinition::enchantment("FP1_023e", "Power of the Ziggurat").with_tag(Tag::Health, 3));
    vanilla(registry, CardDefinition::enchantment("FP1_028e", "Darkness Calls").with_tag(Tag::Atk, 1));
}
