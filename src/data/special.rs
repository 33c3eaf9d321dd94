//! Special-attack effect records keyed by weapon.

use serde::{Deserialize, Serialize};

use crate::data::item::ItemId;
use crate::data::params::{keys, CalculationParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAttack {
    pub weapon_id: ItemId,
    pub name: String,
    /// Energy spent per use, 0..=100.
    pub energy_cost: f64,
    #[serde(default = "default_multiplier")]
    pub damage_multiplier: f64,
    #[serde(default = "default_multiplier")]
    pub accuracy_modifier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl SpecialAttack {
    /// Default spec override fields; explicit user overrides already present win.
    pub fn default_overrides(&self, current: &CalculationParameters) -> CalculationParameters {
        let mut patch = CalculationParameters::new();
        let defaults = [
            (keys::SPEC_DAMAGE_MULTIPLIER, self.damage_multiplier),
            (keys::SPEC_ACCURACY_MODIFIER, self.accuracy_modifier),
            (keys::SPEC_ENERGY_COST, self.energy_cost),
        ];
        for (key, value) in defaults {
            if !current.contains(key) {
                patch.set(key, value);
            }
        }
        patch
    }
}
