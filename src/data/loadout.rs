//! Equipment slots, loadouts, and the id-only projection stored in seeds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::item::{Item, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Head,
    Cape,
    Neck,
    Ammo,
    Weapon,
    Body,
    Shield,
    Legs,
    Hands,
    Feet,
    Ring,
    /// Special-attack weapon. Never contributes to bonus totals.
    Spec,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Slot::Head,
        Slot::Cape,
        Slot::Neck,
        Slot::Ammo,
        Slot::Weapon,
        Slot::Body,
        Slot::Shield,
        Slot::Legs,
        Slot::Hands,
        Slot::Feet,
        Slot::Ring,
        Slot::Spec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Cape => "cape",
            Self::Neck => "neck",
            Self::Ammo => "ammo",
            Self::Weapon => "weapon",
            Self::Body => "body",
            Self::Shield => "shield",
            Self::Legs => "legs",
            Self::Hands => "hands",
            Self::Feet => "feet",
            Self::Ring => "ring",
            Self::Spec => "spec",
        }
    }

    pub fn counts_toward_bonuses(&self) -> bool {
        !matches!(self, Self::Spec)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown equipment slot '{0}'")]
pub struct UnknownSlot(pub String);

impl FromStr for Slot {
    type Err = UnknownSlot;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == lower)
            .ok_or_else(|| UnknownSlot(value.to_string()))
    }
}

/// One item or none per slot. Every slot is always present in the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Slot, Option<Item>>",
    into = "BTreeMap<Slot, Option<Item>>"
)]
pub struct Loadout {
    slots: BTreeMap<Slot, Option<Item>>,
}

impl From<BTreeMap<Slot, Option<Item>>> for Loadout {
    fn from(slots: BTreeMap<Slot, Option<Item>>) -> Self {
        let mut loadout = Loadout::empty();
        for (slot, item) in slots {
            loadout.set(slot, item);
        }
        loadout
    }
}

impl From<Loadout> for BTreeMap<Slot, Option<Item>> {
    fn from(loadout: Loadout) -> Self {
        loadout.slots
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::empty()
    }
}

impl Loadout {
    pub fn empty() -> Self {
        Self {
            slots: Slot::ALL.into_iter().map(|slot| (slot, None)).collect(),
        }
    }

    pub fn with(mut self, slot: Slot, item: Item) -> Self {
        self.equip(slot, item);
        self
    }

    pub fn equip(&mut self, slot: Slot, item: Item) -> Option<Item> {
        self.slots.insert(slot, Some(item)).flatten()
    }

    pub fn unequip(&mut self, slot: Slot) -> Option<Item> {
        self.slots.insert(slot, None).flatten()
    }

    pub fn set(&mut self, slot: Slot, item: Option<Item>) {
        self.slots.insert(slot, item);
    }

    pub fn get(&self, slot: Slot) -> Option<&Item> {
        self.slots.get(&slot).and_then(Option::as_ref)
    }

    pub fn slots(&self) -> impl Iterator<Item = (Slot, Option<&Item>)> {
        self.slots.iter().map(|(slot, item)| (*slot, item.as_ref()))
    }

    /// Equipped items, skipping empty slots.
    pub fn items(&self) -> impl Iterator<Item = (Slot, &Item)> {
        self.slots
            .iter()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (*slot, item)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Option::is_none)
    }

    pub fn projection(&self) -> EquipmentProjection {
        EquipmentProjection {
            slots: self
                .slots
                .iter()
                .map(|(slot, item)| (*slot, item.as_ref().map(|item| item.id)))
                .collect(),
        }
    }
}

/// `slot -> item id | null`, the compact form written into seeds and exchanged with the
/// calculator service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentProjection {
    slots: BTreeMap<Slot, Option<ItemId>>,
}

impl EquipmentProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: Slot, id: Option<ItemId>) -> Self {
        self.slots.insert(slot, id);
        self
    }

    pub fn set(&mut self, slot: Slot, id: Option<ItemId>) {
        self.slots.insert(slot, id);
    }

    pub fn get(&self, slot: Slot) -> Option<ItemId> {
        self.slots.get(&slot).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, Option<ItemId>)> + '_ {
        self.slots.iter().map(|(slot, id)| (*slot, *id))
    }

    /// Slots holding an id.
    pub fn occupied(&self) -> impl Iterator<Item = (Slot, ItemId)> + '_ {
        self.slots
            .iter()
            .filter_map(|(slot, id)| id.map(|id| (*slot, id)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
