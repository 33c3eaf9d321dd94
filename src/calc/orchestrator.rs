//! Composition root for a calculation: keeps the current parameters and loadout, recomputes
//! bonuses on every change and forwards the merged parameters to the calculator service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::calc::bonuses::{self, BonusTotals};
use crate::calc::service::{CalculationResult, CalculationServiceError, Calculator};
use crate::data::boss::Boss;
use crate::data::item::Item;
use crate::data::loadout::{Loadout, Slot};
use crate::data::lookup::{resolve_loadout, ItemLookup};
use crate::data::params::CalculationParameters;
use crate::data::special::SpecialAttack;

/// Outcome of one recompute cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub parameters: CalculationParameters,
    pub loadout: Loadout,
    pub totals: BonusTotals,
    pub result: CalculationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub current: Evaluation,
    pub best_in_slot: Evaluation,
}

pub struct CalculationOrchestrator {
    calculator: Arc<dyn Calculator>,
    lookup: Arc<dyn ItemLookup>,
    parameters: CalculationParameters,
    loadout: Loadout,
    special_attacks: Vec<SpecialAttack>,
    last: Option<Evaluation>,
}

impl CalculationOrchestrator {
    pub fn new(calculator: Arc<dyn Calculator>, lookup: Arc<dyn ItemLookup>) -> Self {
        Self {
            calculator,
            lookup,
            parameters: CalculationParameters::new(),
            loadout: Loadout::empty(),
            special_attacks: Vec::new(),
            last: None,
        }
    }

    /// Special-attack catalog used to fill spec defaults for the weapon in the `spec` slot.
    pub fn with_special_attacks(mut self, special_attacks: Vec<SpecialAttack>) -> Self {
        self.special_attacks = special_attacks;
        self
    }

    /// Seed the state without triggering a calculation.
    pub fn with_state(mut self, parameters: CalculationParameters, loadout: Loadout) -> Self {
        self.parameters = parameters;
        self.loadout = loadout;
        self
    }

    pub fn parameters(&self) -> &CalculationParameters {
        &self.parameters
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last.as_ref()
    }

    pub async fn set_parameters(
        &mut self,
        parameters: CalculationParameters,
    ) -> Result<&Evaluation, CalculationServiceError> {
        self.parameters = parameters;
        self.recompute().await
    }

    pub async fn set_parameter(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<&Evaluation, CalculationServiceError> {
        self.parameters.set(key, value);
        self.recompute().await
    }

    pub async fn set_loadout(&mut self, loadout: Loadout) -> Result<&Evaluation, CalculationServiceError> {
        self.loadout = loadout;
        self.recompute().await
    }

    pub async fn equip(
        &mut self,
        slot: Slot,
        item: Option<Item>,
    ) -> Result<&Evaluation, CalculationServiceError> {
        self.loadout.set(slot, item);
        self.recompute().await
    }

    pub async fn set_target(&mut self, boss: &Boss) -> Result<&Evaluation, CalculationServiceError> {
        self.parameters.merge(boss.target_patch());
        self.recompute().await
    }

    /// Recompute bonuses for the current state and call the calculator. The stored
    /// parameters stay as the user set them; the merged set lives in the evaluation.
    pub async fn recompute(&mut self) -> Result<&Evaluation, CalculationServiceError> {
        let evaluation = self.evaluate(&self.loadout).await?;
        let stored = self.last.insert(evaluation);
        Ok(&*stored)
    }

    /// Evaluate the current loadout and the service's best-in-slot loadout for the same
    /// parameters.
    pub async fn compare_with_best_in_slot(&mut self) -> Result<Comparison, CalculationServiceError> {
        let current = self.recompute().await?.clone();
        let projection = self.calculator.best_in_slot(&current.parameters).await?;
        let bis_loadout = resolve_loadout(self.lookup.as_ref(), &projection).await;
        info!(
            equipped = bis_loadout.items().count(),
            "evaluating best-in-slot loadout"
        );
        let best_in_slot = self.evaluate(&bis_loadout).await?;
        Ok(Comparison {
            current,
            best_in_slot,
        })
    }

    async fn evaluate(&self, loadout: &Loadout) -> Result<Evaluation, CalculationServiceError> {
        let parameters = self.merged_parameters(loadout);
        let totals = bonuses::totals(loadout, &parameters.attack_type());
        debug!(style = %parameters.combat_style(), "requesting calculation");
        let result = self.calculator.calculate(&parameters).await?;
        Ok(Evaluation {
            parameters,
            loadout: loadout.clone(),
            totals,
            result,
        })
    }

    fn merged_parameters(&self, loadout: &Loadout) -> CalculationParameters {
        let patch = bonuses::aggregate(
            loadout,
            &self.parameters.attack_type(),
            self.parameters.combat_style(),
        );
        let mut parameters = self.parameters.clone().merged(patch);

        if let Some(spec_weapon) = loadout.get(Slot::Spec) {
            if let Some(spec) = self
                .special_attacks
                .iter()
                .find(|spec| spec.weapon_id == spec_weapon.id)
            {
                let defaults = spec.default_overrides(&parameters);
                parameters.merge(defaults);
            }
        }
        parameters
    }
}
