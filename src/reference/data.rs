//! Loaded reference data, assembled data set by data set during a bootstrap.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::data::boss::Boss;
use crate::data::item::{Item, ItemId};
use crate::data::special::SpecialAttack;
use crate::data::validate::{
    validate_bosses, validate_items, validate_special_attacks, ValidationReport,
};
use crate::reference::source::{DataSet, DataSetPayload};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to fetch {dataset}: {message}")]
    Fetch { dataset: DataSet, message: String },

    #[error("{dataset} failed validation: {message}")]
    Invalid { dataset: DataSet, message: String },

    #[error("bootstrap ended without loading {0}")]
    Missing(DataSet),

    #[error("bootstrap was interrupted before it settled")]
    Interrupted,
}

/// Read-only registry of static game data, shared behind an `Arc` once loaded.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    items: HashMap<ItemId, Item>,
    bosses: Vec<Boss>,
    special_attacks: Vec<SpecialAttack>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceCounts {
    pub items: usize,
    pub bosses: usize,
    pub special_attacks: usize,
    pub loaded_at: String,
}

impl ReferenceData {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn bosses(&self) -> &[Boss] {
        &self.bosses
    }

    pub fn boss(&self, id: u32) -> Option<&Boss> {
        self.bosses.iter().find(|boss| boss.id == id)
    }

    pub fn special_attacks(&self) -> &[SpecialAttack] {
        &self.special_attacks
    }

    pub fn special_attack_for(&self, weapon_id: ItemId) -> Option<&SpecialAttack> {
        self.special_attacks
            .iter()
            .find(|spec| spec.weapon_id == weapon_id)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn counts(&self) -> ReferenceCounts {
        ReferenceCounts {
            items: self.items.len(),
            bosses: self.bosses.len(),
            special_attacks: self.special_attacks.len(),
            loaded_at: self.loaded_at.to_rfc3339(),
        }
    }
}

/// Collects validated data sets as they arrive, in any order.
#[derive(Debug, Default)]
pub struct ReferenceDataBuilder {
    items: Option<Vec<Item>>,
    bosses: Option<Vec<Boss>>,
    special_attacks: Option<Vec<SpecialAttack>>,
}

impl ReferenceDataBuilder {
    /// Validate and store the payload fetched for `requested`.
    pub fn accept(
        &mut self,
        requested: DataSet,
        payload: DataSetPayload,
    ) -> Result<(), BootstrapError> {
        if payload.dataset() != requested {
            return Err(BootstrapError::Invalid {
                dataset: requested,
                message: format!("source returned {} data", payload.dataset()),
            });
        }
        match payload {
            DataSetPayload::Items(items) => {
                check(requested, validate_items(&items))?;
                self.items = Some(items);
            }
            DataSetPayload::Bosses(bosses) => {
                check(requested, validate_bosses(&bosses))?;
                self.bosses = Some(bosses);
            }
            DataSetPayload::SpecialAttacks(specs) => {
                check(requested, validate_special_attacks(&specs))?;
                self.special_attacks = Some(specs);
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<ReferenceData, BootstrapError> {
        let items = self.items.ok_or(BootstrapError::Missing(DataSet::Items))?;
        let bosses = self.bosses.ok_or(BootstrapError::Missing(DataSet::Bosses))?;
        let special_attacks = self
            .special_attacks
            .ok_or(BootstrapError::Missing(DataSet::SpecialAttacks))?;
        Ok(ReferenceData {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            bosses,
            special_attacks,
            loaded_at: Utc::now(),
        })
    }
}

fn check(dataset: DataSet, report: ValidationReport) -> Result<(), BootstrapError> {
    for diagnostic in report.warnings() {
        warn!(%dataset, %diagnostic, "reference data warning");
    }
    match report.summary() {
        Some(message) => Err(BootstrapError::Invalid { dataset, message }),
        None => Ok(()),
    }
}
