use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calc::bonuses::{self, BonusTotals};
use crate::calc::orchestrator::CalculationOrchestrator;
use crate::calc::service::{CalculationServiceError, Calculator};
use crate::config::{AppConfig, ConfigError};
use crate::data::loadout::{EquipmentProjection, Loadout};
use crate::data::lookup::{resolve_loadout, ItemLookup};
use crate::data::params::{CalculationParameters, CombatStyle, DEFAULT_ATTACK_TYPE};
use crate::reference::data::ReferenceCounts;
use crate::reference::lifecycle::{ReferenceDataLifecycle, ReferenceDataState};
use crate::reference::lookup::RegistryItemLookup;
use crate::seed::{DecodeError, SeedCodec, TextCodec};

/// Shared handles behind every endpoint.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<ReferenceDataLifecycle>,
    pub lookup: Arc<dyn ItemLookup>,
    pub seeds: Arc<SeedCodec>,
    pub calculator: Option<Arc<dyn Calculator>>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        lifecycle: Arc<ReferenceDataLifecycle>,
        text: Arc<dyn TextCodec>,
        calculator: Option<Arc<dyn Calculator>>,
    ) -> Self {
        let lookup: Arc<dyn ItemLookup> = Arc::new(RegistryItemLookup::new(Arc::clone(&lifecycle)));
        let seeds = Arc::new(SeedCodec::new(text, Arc::clone(&lookup)));
        Self {
            lifecycle,
            lookup,
            seeds,
            calculator,
            static_dir: AppConfig::default().static_dir,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let lifecycle = ReferenceDataLifecycle::new(config.reference_source()?);
        let mut state = Self::new(lifecycle, config.text_codec(), config.calculator()?);
        state.static_dir = config.static_dir.clone();
        Ok(state)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(serde_json::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("no calculator service is configured")]
    CalculatorUnavailable,

    #[error(transparent)]
    Calculator(#[from] CalculationServiceError),

    #[error("failed to serialize response: {0}")]
    Serialize(serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::Decode(_) => 400,
            Self::Serialize(_) => 500,
            Self::Calculator(_) => 502,
            Self::CalculatorUnavailable => 503,
        }
    }
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    // An empty body reads as an empty object so every field falls back to its default.
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(ApiError::Parse)
}

fn to_body<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Serialize)
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "dpscalc-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceStatusResponse {
    pub state: ReferenceDataState,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReferenceCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn reference_status_payload(state: &AppState) -> Result<String, ApiError> {
    let lifecycle = &state.lifecycle;
    to_body(&ReferenceStatusResponse {
        state: lifecycle.state(),
        source: lifecycle.source().describe(),
        data: lifecycle.data().map(|data| data.counts()),
        error: lifecycle.last_error().map(|err| err.to_string()),
    })
}

/// Start or join a bootstrap and report where it settled. A failed bootstrap is still a
/// successful request; the failure shows up in the returned state.
pub async fn reference_initialize_payload(state: &AppState) -> Result<String, ApiError> {
    if let Err(err) = state.lifecycle.initialize().await {
        info!(error = %err, "bootstrap requested over http failed");
    }
    reference_status_payload(state)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedEncodeRequest {
    pub parameters: CalculationParameters,
    pub equipment: EquipmentProjection,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedEncodeResponse {
    pub seed: String,
}

pub fn seed_encode_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let req: SeedEncodeRequest = parse_body(body)?;
    let seed = state.seeds.encode_projection(&req.parameters, &req.equipment);
    to_body(&SeedEncodeResponse { seed })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDecodeRequest {
    pub seed: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedDecodeResponse {
    pub parameters: CalculationParameters,
    pub equipment: Loadout,
}

pub async fn seed_decode_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let req: SeedDecodeRequest = parse_body(body)?;
    let decoded = state.seeds.decode(&req.seed).await?;
    to_body(&SeedDecodeResponse {
        parameters: decoded.parameters,
        equipment: decoded.loadout,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BonusesRequest {
    pub equipment: EquipmentProjection,
    pub attack_type: Option<String>,
    pub combat_style: CombatStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct BonusesResponse {
    pub totals: BonusTotals,
    pub patch: CalculationParameters,
}

pub async fn bonuses_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let req: BonusesRequest = parse_body(body)?;
    let attack_type = req
        .attack_type
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ATTACK_TYPE.to_string());
    let loadout = resolve_loadout(state.lookup.as_ref(), &req.equipment).await;
    let totals = bonuses::totals(&loadout, &attack_type);
    debug!(%attack_type, style = %req.combat_style, "aggregated bonuses");
    to_body(&BonusesResponse {
        totals,
        patch: totals.patch_for(req.combat_style),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalculateRequest {
    pub parameters: CalculationParameters,
    pub equipment: EquipmentProjection,
    pub compare_best_in_slot: bool,
}

pub async fn calculate_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let req: CalculateRequest = parse_body(body)?;
    let calculator = state
        .calculator
        .clone()
        .ok_or(ApiError::CalculatorUnavailable)?;

    let loadout = resolve_loadout(state.lookup.as_ref(), &req.equipment).await;
    let special_attacks = state
        .lifecycle
        .data()
        .map(|data| data.special_attacks().to_vec())
        .unwrap_or_default();
    let mut orchestrator = CalculationOrchestrator::new(calculator, Arc::clone(&state.lookup))
        .with_special_attacks(special_attacks)
        .with_state(req.parameters, loadout);

    if req.compare_best_in_slot {
        let comparison = orchestrator.compare_with_best_in_slot().await?;
        to_body(&comparison)
    } else {
        let evaluation = orchestrator.recompute().await?;
        to_body(evaluation)
    }
}
