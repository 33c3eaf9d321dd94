//! Item records as supplied by the reference-data source.
//! Bonus fields are optional; missing ones count as zero during aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type ItemId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_stats: Option<CombatStats>,
}

impl Item {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            name: None,
            slot: None,
            combat_stats: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.combat_stats = Some(stats);
        self
    }

    /// Attack bonus for `attack_type` (`slash`, `stab`, `crush`, `ranged`, `magic`, ...).
    pub fn attack_bonus(&self, attack_type: &str) -> f64 {
        self.combat_stats
            .as_ref()
            .and_then(|stats| stats.attack_bonuses.get(attack_type))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn other_bonuses(&self) -> Option<&OtherBonuses> {
        self.combat_stats.as_ref().map(|stats| &stats.other_bonuses)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    #[serde(default)]
    pub attack_bonuses: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defence_bonuses: BTreeMap<String, f64>,
    #[serde(default)]
    pub other_bonuses: OtherBonuses,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherBonuses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(
        default,
        rename = "ranged strength",
        skip_serializing_if = "Option::is_none"
    )]
    pub ranged_strength: Option<f64>,
    #[serde(default, rename = "magic damage", skip_serializing_if = "Option::is_none")]
    pub magic_damage: Option<MagicDamage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer: Option<f64>,
}

/// Magic damage bonus as found in scraped data: either a number already expressed as a
/// fraction, or a percent string such as `"+10%"`. Resolved once on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMagicDamage", into = "RawMagicDamage")]
pub enum MagicDamage {
    Fraction(f64),
    /// Whole percent parsed from `+<integer>%`.
    Percent(i64),
    /// Any other string. Contributes nothing but is kept for re-serialization.
    Unrecognized(String),
}

impl MagicDamage {
    /// Parse the textual form. Only `+<integer>%` is accepted; everything else is
    /// kept as [`MagicDamage::Unrecognized`].
    pub fn parse(raw: &str) -> Self {
        raw.strip_prefix('+')
            .and_then(|rest| rest.strip_suffix('%'))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<i64>().ok())
            .map(MagicDamage::Percent)
            .unwrap_or_else(|| MagicDamage::Unrecognized(raw.to_string()))
    }

    pub fn fraction(&self) -> f64 {
        match self {
            Self::Fraction(value) => *value,
            Self::Percent(percent) => *percent as f64 / 100.0,
            Self::Unrecognized(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawMagicDamage {
    Number(f64),
    Text(String),
}

impl From<RawMagicDamage> for MagicDamage {
    fn from(raw: RawMagicDamage) -> Self {
        match raw {
            RawMagicDamage::Number(value) => Self::Fraction(value),
            RawMagicDamage::Text(text) => Self::parse(&text),
        }
    }
}

impl From<MagicDamage> for RawMagicDamage {
    fn from(value: MagicDamage) -> Self {
        match value {
            MagicDamage::Fraction(value) => Self::Number(value),
            MagicDamage::Percent(percent) => Self::Text(format!("+{percent}%")),
            MagicDamage::Unrecognized(text) => Self::Text(text),
        }
    }
}
