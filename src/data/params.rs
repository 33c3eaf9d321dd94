//! Calculation parameters: the flat field map handed to the calculator service.
//! Values are kept verbatim (JSON scalars) so a seed round trip reproduces them exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names produced or read by this crate. Everything else passes through untouched.
pub mod keys {
    pub const COMBAT_STYLE: &str = "combat_style";
    pub const ATTACK_TYPE: &str = "attack_type";

    pub const MELEE_ATTACK_BONUS: &str = "melee_attack_bonus";
    pub const MELEE_STRENGTH_BONUS: &str = "melee_strength_bonus";
    pub const RANGED_ATTACK_BONUS: &str = "ranged_attack_bonus";
    pub const RANGED_STRENGTH_BONUS: &str = "ranged_strength_bonus";
    pub const MAGIC_ATTACK_BONUS: &str = "magic_attack_bonus";
    pub const MAGIC_DAMAGE_BONUS: &str = "magic_damage_bonus";

    pub const ATTACK_LEVEL: &str = "attack_level";
    pub const STRENGTH_LEVEL: &str = "strength_level";
    pub const DEFENCE_LEVEL: &str = "defence_level";
    pub const RANGED_LEVEL: &str = "ranged_level";
    pub const MAGIC_LEVEL: &str = "magic_level";

    pub const PRAYER_ATTACK_MULTIPLIER: &str = "prayer_attack_multiplier";
    pub const PRAYER_STRENGTH_MULTIPLIER: &str = "prayer_strength_multiplier";

    pub const SPEC_DAMAGE_MULTIPLIER: &str = "spec_damage_multiplier";
    pub const SPEC_ACCURACY_MODIFIER: &str = "spec_accuracy_modifier";
    pub const SPEC_ENERGY_COST: &str = "spec_energy_cost";
    pub const SPEC_REGEN_RATE: &str = "spec_regen_rate";
    pub const SPEC_INITIAL_ENERGY: &str = "spec_initial_energy";

    pub const TARGET_ID: &str = "target_id";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatStyle {
    #[default]
    Melee,
    Ranged,
    Magic,
}

impl CombatStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Ranged => "ranged",
            Self::Magic => "magic",
        }
    }
}

impl fmt::Display for CombatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CombatStyle {
    type Err = UnknownCombatStyle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "melee" => Ok(Self::Melee),
            "ranged" => Ok(Self::Ranged),
            "magic" => Ok(Self::Magic),
            _ => Err(UnknownCombatStyle(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown combat style '{0}' (expected melee, ranged or magic)")]
pub struct UnknownCombatStyle(pub String);

/// Melee attack type used to pick the `attack_bonuses` key for the melee attack total.
pub const DEFAULT_ATTACK_TYPE: &str = "slash";

/// Flat parameter map. No field is required; consumers fall back to their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationParameters {
    fields: Map<String, Value>,
}

impl CalculationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Combat style from `combat_style`; melee when absent or unrecognised.
    pub fn combat_style(&self) -> CombatStyle {
        self.text(keys::COMBAT_STYLE)
            .and_then(|s| s.parse().ok())
            .unwrap_or(CombatStyle::Melee)
    }

    /// Melee attack type from `attack_type`, lowercased; `slash` when absent.
    pub fn attack_type(&self) -> String {
        self.text(keys::ATTACK_TYPE)
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ATTACK_TYPE.to_string())
    }

    /// Overlay `patch` on top of self. Fields not in the patch are left untouched.
    pub fn merge(&mut self, patch: CalculationParameters) {
        for (key, value) in patch.fields {
            self.fields.insert(key, value);
        }
    }

    pub fn merged(mut self, patch: CalculationParameters) -> Self {
        self.merge(patch);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl FromIterator<(String, Value)> for CalculationParameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_overrides_only_patched_fields() {
        let mut params = CalculationParameters::new();
        params.set(keys::ATTACK_LEVEL, 99);
        params.set(keys::MELEE_ATTACK_BONUS, 10);

        let mut patch = CalculationParameters::new();
        patch.set(keys::MELEE_ATTACK_BONUS, 120.0);
        params.merge(patch);

        assert_eq!(params.get(keys::ATTACK_LEVEL), Some(&json!(99)));
        assert_eq!(params.number(keys::MELEE_ATTACK_BONUS), Some(120.0));
    }

    #[test]
    fn combat_style_defaults_to_melee() {
        let mut params = CalculationParameters::new();
        assert_eq!(params.combat_style(), CombatStyle::Melee);
        params.set(keys::COMBAT_STYLE, "Magic");
        assert_eq!(params.combat_style(), CombatStyle::Magic);
        params.set(keys::COMBAT_STYLE, "throwing");
        assert_eq!(params.combat_style(), CombatStyle::Melee);
    }

    #[test]
    fn attack_type_is_normalized() {
        let mut params = CalculationParameters::new();
        assert_eq!(params.attack_type(), "slash");
        params.set(keys::ATTACK_TYPE, " Crush ");
        assert_eq!(params.attack_type(), "crush");
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut params = CalculationParameters::new();
        params.set("boost", true);
        params.set("target_id", 415);
        let raw = serde_json::to_value(&params).unwrap();
        assert_eq!(raw, json!({"boost": true, "target_id": 415}));
        assert_eq!(params.get("boost").and_then(Value::as_bool), Some(true));
    }
}
