//! Boss (target) records. Their stats feed the target fields of the calculation parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::params::{keys, CalculationParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub name: String,
    /// Defence level, hitpoints and per-style defence bonuses keyed by stat name.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

impl Boss {
    /// Target fields (`target_id`, `target_<stat>`) for merging into calculation parameters.
    pub fn target_patch(&self) -> CalculationParameters {
        let mut patch = CalculationParameters::new();
        patch.set(keys::TARGET_ID, self.id);
        for (stat, value) in &self.stats {
            patch.set(format!("target_{}", stat.replace(' ', "_")), *value);
        }
        patch
    }
}
