//! Equipment bonus aggregation: fold a loadout into the per-style totals the calculator
//! consumes. Pure; missing bonus fields count as zero.

use serde::{Deserialize, Serialize};

use crate::data::item::Item;
use crate::data::loadout::Loadout;
use crate::data::params::{keys, CalculationParameters, CombatStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusTotals {
    pub melee_attack: f64,
    pub melee_strength: f64,
    pub ranged_attack: f64,
    pub ranged_strength: f64,
    pub magic_attack: f64,
    /// Fraction, 0.10 for +10%.
    pub magic_damage: f64,
}

impl BonusTotals {
    /// Add one item's contribution. `attack_type` selects the melee attack bonus key.
    pub fn add_item(&mut self, item: &Item, attack_type: &str) {
        self.melee_attack += item.attack_bonus(attack_type);
        self.ranged_attack += item.attack_bonus("ranged");
        self.magic_attack += item.attack_bonus("magic");

        if let Some(other) = item.other_bonuses() {
            self.melee_strength += other.strength.unwrap_or(0.0);
            self.ranged_strength += other.ranged_strength.unwrap_or(0.0);
            self.magic_damage += other
                .magic_damage
                .as_ref()
                .map_or(0.0, |damage| damage.fraction());
        }
    }

    /// Parameter fields for `style` only.
    pub fn patch_for(&self, style: CombatStyle) -> CalculationParameters {
        let mut patch = CalculationParameters::new();
        match style {
            CombatStyle::Melee => {
                patch.set(keys::MELEE_ATTACK_BONUS, self.melee_attack);
                patch.set(keys::MELEE_STRENGTH_BONUS, self.melee_strength);
            }
            CombatStyle::Ranged => {
                patch.set(keys::RANGED_ATTACK_BONUS, self.ranged_attack);
                patch.set(keys::RANGED_STRENGTH_BONUS, self.ranged_strength);
            }
            CombatStyle::Magic => {
                patch.set(keys::MAGIC_ATTACK_BONUS, self.magic_attack);
                patch.set(keys::MAGIC_DAMAGE_BONUS, self.magic_damage);
            }
        }
        patch
    }
}

/// All six totals for `loadout`. The `spec` slot and empty slots are skipped.
pub fn totals(loadout: &Loadout, attack_type: &str) -> BonusTotals {
    let mut totals = BonusTotals::default();
    for (slot, item) in loadout.items() {
        if slot.counts_toward_bonuses() {
            totals.add_item(item, attack_type);
        }
    }
    totals
}

/// Parameter patch with the bonus fields of `style`, for merging over existing parameters.
pub fn aggregate(loadout: &Loadout, attack_type: &str, style: CombatStyle) -> CalculationParameters {
    totals(loadout, attack_type).patch_for(style)
}
