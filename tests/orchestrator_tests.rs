use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dpscalc::calc::{
    CalculationOrchestrator, CalculationResult, CalculationServiceError, Calculator,
};
use dpscalc::data::{
    keys, Boss, CalculationParameters, CombatStats, EquipmentProjection, Item, OtherBonuses,
    Slot, SpecialAttack, StaticItemLookup,
};

/// Echoes the melee strength bonus back as dps and records every request.
#[derive(Default)]
struct EchoCalculator {
    requests: Mutex<Vec<CalculationParameters>>,
    best_in_slot: EquipmentProjection,
    fail: bool,
}

impl EchoCalculator {
    fn requests(&self) -> Vec<CalculationParameters> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Calculator for EchoCalculator {
    async fn calculate(
        &self,
        params: &CalculationParameters,
    ) -> Result<CalculationResult, CalculationServiceError> {
        if self.fail {
            return Err(CalculationServiceError::Status {
                status: 500,
                message: "formula error".to_string(),
            });
        }
        self.requests.lock().unwrap().push(params.clone());
        Ok(CalculationResult {
            dps: params.number(keys::MELEE_STRENGTH_BONUS).unwrap_or(0.0),
            max_hit: None,
            accuracy: None,
            extra: Default::default(),
        })
    }

    async fn best_in_slot(
        &self,
        _params: &CalculationParameters,
    ) -> Result<EquipmentProjection, CalculationServiceError> {
        Ok(self.best_in_slot.clone())
    }
}

fn strength_item(id: u32, strength: f64) -> Item {
    let mut attack = BTreeMap::new();
    attack.insert("slash".to_string(), strength);
    Item::new(id).with_stats(CombatStats {
        attack_bonuses: attack,
        other_bonuses: OtherBonuses {
            strength: Some(strength),
            ..OtherBonuses::default()
        },
        ..CombatStats::default()
    })
}

fn lookup() -> Arc<StaticItemLookup> {
    Arc::new(StaticItemLookup::new([
        strength_item(4151, 82.0),
        strength_item(11802, 132.0),
        strength_item(6737, 4.0),
    ]))
}

#[tokio::test]
async fn every_change_recomputes_with_merged_bonuses() {
    let calculator = Arc::new(EchoCalculator::default());
    let mut orchestrator = CalculationOrchestrator::new(calculator.clone(), lookup());

    let evaluation = orchestrator
        .equip(Slot::Weapon, Some(strength_item(4151, 82.0)))
        .await
        .unwrap();
    assert_eq!(evaluation.result.dps, 82.0);
    assert_eq!(evaluation.totals.melee_attack, 82.0);

    orchestrator
        .equip(Slot::Ring, Some(strength_item(6737, 4.0)))
        .await
        .unwrap();
    orchestrator
        .set_parameter(keys::ATTACK_LEVEL, serde_json::json!(99))
        .await
        .unwrap();

    let requests = calculator.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].number(keys::MELEE_STRENGTH_BONUS), Some(86.0));
    assert_eq!(requests[2].number(keys::ATTACK_LEVEL), Some(99.0));
    // stored parameters are the user's, not the merged ones
    assert!(!orchestrator.parameters().contains(keys::MELEE_STRENGTH_BONUS));
}

#[tokio::test]
async fn spec_weapon_fills_missing_spec_overrides() {
    let calculator = Arc::new(EchoCalculator::default());
    let mut orchestrator = CalculationOrchestrator::new(calculator.clone(), lookup())
        .with_special_attacks(vec![SpecialAttack {
            weapon_id: 11802,
            name: "The Judgement".to_string(),
            energy_cost: 50.0,
            damage_multiplier: 1.375,
            accuracy_modifier: 2.0,
        }]);

    let mut params = CalculationParameters::new();
    params.set(keys::SPEC_ACCURACY_MODIFIER, 1.5);
    orchestrator.set_parameters(params).await.unwrap();
    let evaluation = orchestrator
        .equip(Slot::Spec, Some(strength_item(11802, 132.0)))
        .await
        .unwrap();

    let merged = &evaluation.parameters;
    assert_eq!(merged.number(keys::SPEC_DAMAGE_MULTIPLIER), Some(1.375));
    assert_eq!(merged.number(keys::SPEC_ACCURACY_MODIFIER), Some(1.5));
    assert_eq!(merged.number(keys::SPEC_ENERGY_COST), Some(50.0));
    // the spec weapon adds nothing to the totals
    assert_eq!(evaluation.result.dps, 0.0);
}

#[tokio::test]
async fn target_stats_merge_into_parameters() {
    let calculator = Arc::new(EchoCalculator::default());
    let mut orchestrator = CalculationOrchestrator::new(calculator, lookup());
    let mut stats = BTreeMap::new();
    stats.insert("defence level".to_string(), 250.0);
    let boss = Boss {
        id: 2215,
        name: "General Graardor".to_string(),
        stats,
    };

    let evaluation = orchestrator.set_target(&boss).await.unwrap();
    assert_eq!(evaluation.parameters.number(keys::TARGET_ID), Some(2215.0));
    assert_eq!(evaluation.parameters.number("target_defence_level"), Some(250.0));
}

#[tokio::test]
async fn best_in_slot_comparison_resolves_ids() {
    let calculator = Arc::new(EchoCalculator {
        best_in_slot: EquipmentProjection::new()
            .with(Slot::Weapon, Some(11802))
            .with(Slot::Ring, Some(6737))
            .with(Slot::Head, Some(424242)),
        ..EchoCalculator::default()
    });
    let mut orchestrator = CalculationOrchestrator::new(calculator, lookup());
    orchestrator
        .equip(Slot::Weapon, Some(strength_item(4151, 82.0)))
        .await
        .unwrap();

    let comparison = orchestrator.compare_with_best_in_slot().await.unwrap();
    assert_eq!(comparison.current.result.dps, 82.0);
    assert_eq!(comparison.best_in_slot.result.dps, 136.0);
    assert!(comparison.best_in_slot.loadout.get(Slot::Head).is_none());
}

#[tokio::test]
async fn service_errors_surface_to_the_caller() {
    let calculator = Arc::new(EchoCalculator {
        fail: true,
        ..EchoCalculator::default()
    });
    let mut orchestrator = CalculationOrchestrator::new(calculator, lookup());
    let err = orchestrator.recompute().await.unwrap_err();
    assert!(err.to_string().contains("formula error"));
    assert!(orchestrator.last_evaluation().is_none());
}
