use std::collections::BTreeMap;

use dpscalc::calc::{aggregate, totals, BonusTotals};
use dpscalc::data::{
    keys, CombatStats, CombatStyle, Item, Loadout, MagicDamage, OtherBonuses, Slot,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn magic_item(id: u32, magic_damage: MagicDamage) -> Item {
    Item::new(id).with_stats(CombatStats {
        other_bonuses: OtherBonuses {
            magic_damage: Some(magic_damage),
            ..OtherBonuses::default()
        },
        ..CombatStats::default()
    })
}

#[test]
fn empty_loadout_aggregates_to_zero() {
    assert_eq!(totals(&Loadout::empty(), "slash"), BonusTotals::default());
    for style in [CombatStyle::Melee, CombatStyle::Ranged, CombatStyle::Magic] {
        let patch = aggregate(&Loadout::empty(), "slash", style);
        assert!(patch.iter().all(|(_, value)| value.as_f64() == Some(0.0)));
    }
}

#[test]
fn percent_string_magic_damage_becomes_fraction() {
    let loadout = Loadout::empty().with(Slot::Neck, magic_item(12002, MagicDamage::parse("+15%")));
    let patch = aggregate(&loadout, "slash", CombatStyle::Magic);
    assert!(close(patch.number(keys::MAGIC_DAMAGE_BONUS).unwrap(), 0.15));
}

#[test]
fn numeric_magic_damage_is_used_directly() {
    let loadout = Loadout::empty().with(Slot::Cape, magic_item(21795, MagicDamage::Fraction(0.2)));
    let patch = aggregate(&loadout, "slash", CombatStyle::Magic);
    assert!(close(patch.number(keys::MAGIC_DAMAGE_BONUS).unwrap(), 0.2));
}

#[test]
fn mixed_magic_damage_shapes_sum() {
    let raw = r#"[
        {"id": 1, "combat_stats": {"other_bonuses": {"magic damage": "+10%"}}},
        {"id": 2, "combat_stats": {"other_bonuses": {"magic damage": 0.05}}}
    ]"#;
    let items: Vec<Item> = serde_json::from_str(raw).unwrap();
    let mut items = items.into_iter();
    let loadout = Loadout::empty()
        .with(Slot::Neck, items.next().unwrap())
        .with(Slot::Cape, items.next().unwrap());

    let patch = aggregate(&loadout, "slash", CombatStyle::Magic);
    assert!(close(patch.number(keys::MAGIC_DAMAGE_BONUS).unwrap(), 0.15));
}

#[test]
fn spec_slot_never_counts() {
    let mut attack = BTreeMap::new();
    attack.insert("slash".to_string(), 132.0);
    let godsword = Item::new(11802).with_stats(CombatStats {
        attack_bonuses: attack,
        ..CombatStats::default()
    });
    let loadout = Loadout::empty().with(Slot::Spec, godsword);
    assert_eq!(totals(&loadout, "slash"), BonusTotals::default());
}

#[test]
fn patch_only_carries_the_active_style() {
    let loadout = Loadout::empty();
    let patch = aggregate(&loadout, "stab", CombatStyle::Ranged);
    assert!(patch.contains(keys::RANGED_ATTACK_BONUS));
    assert!(patch.contains(keys::RANGED_STRENGTH_BONUS));
    assert!(!patch.contains(keys::MELEE_ATTACK_BONUS));
    assert!(!patch.contains(keys::MAGIC_DAMAGE_BONUS));
}
