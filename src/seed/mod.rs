//! Seeds: a calculation setup (parameters + equipment ids) packed into one printable string.
//!
//! Layout: base64 of canonical JSON `{ ...parameters, "equipment": { slot: id | null } }`.
//! Older seeds stored equipment under `equipped_armor` and `equipped_weapon`; those are
//! still read when `equipment` is absent.

pub mod codec;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::data::item::ItemId;
use crate::data::loadout::{EquipmentProjection, Loadout, Slot};
use crate::data::lookup::{resolve_loadout, ItemLookup};
use crate::data::params::CalculationParameters;

pub use codec::{Alphabet, Base64Codec, TextCodec};

pub const EQUIPMENT_KEY: &str = "equipment";
pub const LEGACY_ARMOR_KEY: &str = "equipped_armor";
pub const LEGACY_WEAPON_KEY: &str = "equipped_weapon";

const RESERVED_KEYS: [&str; 3] = [EQUIPMENT_KEY, LEGACY_ARMOR_KEY, LEGACY_WEAPON_KEY];

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("seed is empty")]
    Empty,

    #[error("seed is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("seed does not contain UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("seed does not contain valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seed must hold a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid equipment in '{key}': {reason}")]
    Equipment { key: String, reason: String },
}

/// Structural content of a seed before item resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPayload {
    pub parameters: CalculationParameters,
    pub equipment: EquipmentProjection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSeed {
    pub parameters: CalculationParameters,
    pub loadout: Loadout,
}

pub struct SeedCodec {
    text: Arc<dyn TextCodec>,
    lookup: Arc<dyn ItemLookup>,
}

impl SeedCodec {
    pub fn new(text: Arc<dyn TextCodec>, lookup: Arc<dyn ItemLookup>) -> Self {
        Self { text, lookup }
    }

    pub fn encode(&self, parameters: &CalculationParameters, loadout: &Loadout) -> String {
        self.encode_projection(parameters, &loadout.projection())
    }

    /// Encode from item ids directly (no item records needed).
    pub fn encode_projection(
        &self,
        parameters: &CalculationParameters,
        equipment: &EquipmentProjection,
    ) -> String {
        let json = canonical_json(parameters, equipment);
        self.text.encode(json.as_bytes())
    }

    /// Decode the structure of a seed without resolving items.
    pub fn parse(&self, seed: &str) -> Result<SeedPayload, DecodeError> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(DecodeError::Empty);
        }
        let bytes = self.text.decode(seed)?;
        let text = String::from_utf8(bytes)?;
        let value: Value = serde_json::from_str(&text)?;
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(DecodeError::NotAnObject(json_kind(&other))),
        };

        let equipment = object.remove(EQUIPMENT_KEY).filter(|v| !v.is_null());
        let legacy_armor = object.remove(LEGACY_ARMOR_KEY).filter(|v| !v.is_null());
        let legacy_weapon = object.remove(LEGACY_WEAPON_KEY).filter(|v| !v.is_null());

        let equipment = match equipment {
            Some(equipment) => projection_from_value(EQUIPMENT_KEY, &equipment)?,
            None => {
                let mut merged = EquipmentProjection::new();
                for (key, section) in [
                    (LEGACY_ARMOR_KEY, legacy_armor),
                    (LEGACY_WEAPON_KEY, legacy_weapon),
                ] {
                    let Some(section) = section else { continue };
                    for (slot, id) in projection_from_value(key, &section)?.iter() {
                        merged.set(slot, id);
                    }
                }
                merged
            }
        };

        Ok(SeedPayload {
            parameters: CalculationParameters::from_map(object),
            equipment,
        })
    }

    /// Decode a seed and resolve its items. Individual item failures leave that slot
    /// empty; only a malformed seed is an error.
    pub async fn decode(&self, seed: &str) -> Result<DecodedSeed, DecodeError> {
        let payload = self.parse(seed)?;
        debug!(
            parameters = payload.parameters.len(),
            items = payload.equipment.occupied().count(),
            "decoded seed"
        );
        let loadout = resolve_loadout(self.lookup.as_ref(), &payload.equipment).await;
        Ok(DecodedSeed {
            parameters: payload.parameters,
            loadout,
        })
    }
}

/// Sorted-key JSON for `{ ...parameters, equipment }`.
fn canonical_json(parameters: &CalculationParameters, equipment: &EquipmentProjection) -> String {
    let mut flat: BTreeMap<&str, Value> = BTreeMap::new();
    for (key, value) in parameters.iter() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            warn!(key = %key, "dropping parameter that collides with a reserved seed key");
            continue;
        }
        flat.insert(key.as_str(), value.clone());
    }

    let slots: Map<String, Value> = equipment
        .iter()
        .map(|(slot, id)| (slot.as_str().to_string(), id.map_or(Value::Null, Value::from)))
        .collect();
    flat.insert(EQUIPMENT_KEY, Value::Object(slots));

    // Serializing a map of `Value`s with string keys cannot fail.
    serde_json::to_string(&flat).unwrap_or_default()
}

fn projection_from_value(key: &str, value: &Value) -> Result<EquipmentProjection, DecodeError> {
    let Some(entries) = value.as_object() else {
        return Err(DecodeError::Equipment {
            key: key.to_string(),
            reason: format!("expected an object, found {}", json_kind(value)),
        });
    };

    let mut projection = EquipmentProjection::new();
    for (slot_name, entry) in entries {
        let slot: Slot = match slot_name.parse() {
            Ok(slot) => slot,
            Err(err) => {
                warn!(section = key, error = %err, "ignoring unknown slot in seed");
                continue;
            }
        };
        let id = entry_id(entry).map_err(|reason| DecodeError::Equipment {
            key: format!("{key}.{slot_name}"),
            reason,
        })?;
        projection.set(slot, id);
    }
    Ok(projection)
}

/// `null`, a non-negative integer id, or (older seeds) an item object with an `id`.
fn entry_id(entry: &Value) -> Result<Option<ItemId>, String> {
    let raw = match entry {
        Value::Null => return Ok(None),
        Value::Object(object) => object
            .get("id")
            .ok_or_else(|| "item object without an 'id'".to_string())?,
        other => other,
    };
    raw.as_u64()
        .and_then(|id| ItemId::try_from(id).ok())
        .map(Some)
        .ok_or_else(|| format!("expected an item id, found {raw}"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
