//! Curse of Naxxramas: deathrattle-heavy minions, Loatheb, Rivendare.

use super::add;
use crate::auras::{AuraDescriptor, AuraModifier, AuraScope};
use crate::cards::definition::{CardClass, CardDefinition, CardType, Race};
use crate::cards::registry::CardRegistry;
use crate::cards::script::CardScript;
use crate::core::tags::Tag;
use crate::effects::Requirements;
use crate::error::ScriptError;
use crate::triggers::{EventKind, Hook, TriggerCondition};

pub(super) fn register(registry: &mut CardRegistry) {
    deathrattles(registry);
    triggered(registry);
    auras(registry);
    spells_and_weapons(registry);
}

fn deathrattles(registry: &mut CardRegistry) {
    // Zombie Chow
    add(
        registry,
        CardDefinition::minion("FP1_001", "Zombie Chow", 1, 2, 3).collectible(),
        CardScript::new().deathrattle(|ctx| {
            let hero = ctx.hero(ctx.opponent());
            ctx.heal(hero, 5);
            Ok(())
        }),
    );

    // Haunted Creeper
    add(
        registry,
        CardDefinition::minion("FP1_002", "Haunted Creeper", 2, 1, 2).collectible(),
        CardScript::new().deathrattle(|ctx| {
            ctx.summon(ctx.controller(), "FP1_002t")?;
            ctx.summon(ctx.controller(), "FP1_002t")
        }),
    );

    // Mad Scientist
    add(
        registry,
        CardDefinition::minion("FP1_004", "Mad Scientist", 2, 2, 2).collectible(),
        CardScript::new().deathrattle(|ctx| {
            let secrets: Vec<_> = ctx
                .deck(ctx.controller())
                .iter()
                .copied()
                .filter(|&card| ctx.definition(card).is_some_and(CardDefinition::is_secret))
                .collect();
            if let Some(secret) = ctx.choose(&secrets) {
                ctx.summon_existing(ctx.controller(), secret);
            }
            Ok(())
        }),
    );

    // Nerubian Egg
    add(
        registry,
        CardDefinition::minion("FP1_007", "Nerubian Egg", 2, 0, 2).collectible(),
        CardScript::new().deathrattle(|ctx| ctx.summon(ctx.controller(), "FP1_007t")),
    );

    // Deathlord
    add(
        registry,
        CardDefinition::minion("FP1_009", "Deathlord", 3, 2, 8)
            .with_tag(Tag::Taunt, 1)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            let opponent = ctx.opponent();
            let minions: Vec<_> = ctx
                .deck(opponent)
                .iter()
                .copied()
                .filter(|&card| ctx.definition(card).is_some_and(|d| d.card_type == CardType::Minion))
                .collect();
            if let Some(minion) = ctx.choose(&minions) {
                ctx.summon_existing(opponent, minion);
            }
            Ok(())
        }),
    );

    // Webspinner
    add(
        registry,
        CardDefinition::minion("FP1_011", "Webspinner", 1, 1, 1)
            .with_class(CardClass::Hunter)
            .with_race(Race::Beast)
            .with_entourage(["CS2_120", "CS2_172", "FP1_011"])
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            let entourage = &ctx.own_definition()?.entourage;
            let indices: Vec<usize> = (0..entourage.len()).collect();
            if let Some(index) = ctx.choose(&indices) {
                ctx.give(ctx.controller(), &entourage[index])?;
            }
            Ok(())
        }),
    );

    // Sludge Belcher
    add(
        registry,
        CardDefinition::minion("FP1_012", "Sludge Belcher", 5, 3, 5)
            .with_tag(Tag::Taunt, 1)
            .collectible(),
        CardScript::new().deathrattle(|ctx| ctx.summon(ctx.controller(), "FP1_012t")),
    );

    // Voidcaller
    add(
        registry,
        CardDefinition::minion("FP1_022", "Voidcaller", 4, 3, 4)
            .with_class(CardClass::Warlock)
            .with_race(Race::Demon)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            let demons: Vec<_> = ctx
                .hand(ctx.controller())
                .iter()
                .copied()
                .filter(|&card| {
                    ctx.definition(card)
                        .is_some_and(|d| d.card_type == CardType::Minion && d.race == Some(Race::Demon))
                })
                .collect();
            if let Some(demon) = ctx.choose(&demons) {
                ctx.summon_existing(ctx.controller(), demon);
            }
            Ok(())
        }),
    );

    // Dark Cultist
    add(
        registry,
        CardDefinition::minion("FP1_023", "Dark Cultist", 3, 3, 4)
            .with_class(CardClass::Priest)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            let field = ctx.field(ctx.controller());
            if let Some(target) = ctx.choose(&field) {
                ctx.buff(target, "FP1_023e")?;
            }
            Ok(())
        }),
    );

    // Unstable Ghoul
    add(
        registry,
        CardDefinition::minion("FP1_024", "Unstable Ghoul", 2, 1, 3)
            .with_tag(Tag::Taunt, 1)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            for minion in ctx.all_minions() {
                ctx.hit(minion, 1);
            }
            Ok(())
        }),
    );

    // Anub'ar Ambusher
    add(
        registry,
        CardDefinition::minion("FP1_026", "Anub'ar Ambusher", 4, 5, 5)
            .with_class(CardClass::Rogue)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            let field = ctx.field(ctx.controller());
            if let Some(target) = ctx.choose(&field) {
                ctx.bounce(target);
            }
            Ok(())
        }),
    );

    // Dancing Swords
    add(
        registry,
        CardDefinition::minion("FP1_029", "Dancing Swords", 3, 4, 4).collectible(),
        CardScript::new().deathrattle(|ctx| {
            ctx.draw(ctx.opponent());
            Ok(())
        }),
    );
}

fn triggered(registry: &mut CardRegistry) {
    // Shade of Naxxramas
    add(
        registry,
        CardDefinition::minion("FP1_005", "Shade of Naxxramas", 3, 2, 2)
            .with_tag(Tag::Stealth, 1)
            .collectible(),
        CardScript::new().on(Hook::OwnTurnBegin, |ctx, _| ctx.buff(ctx.source(), "FP1_005e")),
    );

    // Stoneskin Gargoyle
    add(
        registry,
        CardDefinition::minion("FP1_027", "Stoneskin Gargoyle", 3, 1, 4).collectible(),
        CardScript::new().on(Hook::OwnTurnBegin, |ctx, _| {
            let me = ctx.source();
            let damage = ctx.tag(me, Tag::Damage);
            if damage > 0 {
                ctx.heal(me, damage);
            }
            Ok(())
        }),
    );

    // Undertaker
    add(
        registry,
        CardDefinition::minion("FP1_028", "Undertaker", 1, 1, 2).collectible(),
        CardScript::new().on(Hook::OwnMinionSummon, |ctx, event| {
            if event.target.is_some_and(|minion| ctx.has_deathrattle(minion)) {
                ctx.buff(ctx.source(), "FP1_028e")?;
            }
            Ok(())
        }),
    );

    // Wailing Soul
    add(
        registry,
        CardDefinition::minion("FP1_016", "Wailing Soul", 4, 3, 5).collectible(),
        CardScript::new().on_play(|ctx, _| {
            let me = ctx.source();
            for minion in ctx.field(ctx.controller()) {
                if minion != me {
                    ctx.silence(minion);
                }
            }
            Ok(())
        }),
    );

    // Loatheb
    add(
        registry,
        CardDefinition::minion("FP1_030", "Loatheb", 5, 5, 5)
            .legendary()
            .collectible(),
        CardScript::new().on_play(|ctx, _| {
            let hero = ctx.hero(ctx.opponent());
            ctx.buff(hero, "FP1_030e")
        }),
    );

    // Necrotic Aura: enemy spells cost (5) more until the end of their turn
    add(
        registry,
        CardDefinition::enchantment("FP1_030e", "Necrotic Aura"),
        CardScript::new()
            .aura(
                AuraDescriptor::new("Necrotic Aura", AuraScope::EnemyHand, AuraModifier::set(Tag::Cost, |cost| cost + 5))
                    .with_predicate(|ctx| Ok(ctx.target_type() == Some(CardType::Spell))),
            )
            .on_event(EventKind::TurnEnd, TriggerCondition::Always, |ctx, event| {
                let state = ctx.state();
                let bearer = state
                    .entity(ctx.source())
                    .and_then(|e| e.attached_to)
                    .and_then(|hero| state.controller(hero));
                if bearer.is_some() && event.player == bearer {
                    ctx.destroy(ctx.source());
                }
                Ok(())
            }),
    );
}

fn auras(registry: &mut CardRegistry) {
    // Nerub'ar Weblord
    add(
        registry,
        CardDefinition::minion("FP1_017", "Nerub'ar Weblord", 2, 1, 4).collectible(),
        CardScript::new().aura(
            AuraDescriptor::new("Nerub'ar Weblord Aura", AuraScope::AllHands, AuraModifier::Add(Tag::Cost, 2))
                .with_predicate(|ctx| {
                    Ok(ctx.target_type() == Some(CardType::Minion) && ctx.target_has(Tag::Battlecry))
                }),
        ),
    );

    // Baron Rivendare
    add(
        registry,
        CardDefinition::minion("FP1_031", "Baron Rivendare", 5, 1, 7)
            .legendary()
            .collectible(),
        CardScript::new().aura(
            AuraDescriptor::new("Rivendare Aura", AuraScope::FriendlyMinions, AuraModifier::Flag(Tag::ExtraDeathrattles))
                .with_predicate(|ctx| Ok(!ctx.is_source())),
        ),
    );
}

fn spells_and_weapons(registry: &mut CardRegistry) {
    // Reincarnate
    add(
        registry,
        CardDefinition::spell("FP1_025", "Reincarnate", 2)
            .with_class(CardClass::Shaman)
            .with_requirements(Requirements::minion_target())
            .collectible(),
        CardScript::new().on_play(|ctx, target| {
            let target = target.ok_or_else(|| ScriptError::MissingTarget("FP1_025".into()))?;
            let card = ctx
                .state()
                .card_of(target)
                .ok_or_else(|| ScriptError::MissingTarget("FP1_025".into()))?;
            ctx.destroy(target);
            ctx.summon_card(ctx.controller(), card);
            Ok(())
        }),
    );

    // Death's Bite
    add(
        registry,
        CardDefinition::weapon("FP1_021", "Death's Bite", 4, 4, 2)
            .with_class(CardClass::Warrior)
            .collectible(),
        CardScript::new().deathrattle(|ctx| {
            for minion in ctx.all_minions() {
                ctx.hit(minion, 1);
            }
            Ok(())
        }),
    );
}
