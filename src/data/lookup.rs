//! Item lookup collaborator used when decoding seeds and best-in-slot responses.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::warn;

use crate::data::item::{Item, ItemId};
use crate::data::loadout::{EquipmentProjection, Loadout, Slot};

#[derive(Debug, thiserror::Error)]
pub enum ItemResolutionError {
    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("lookup for item {requested} returned item {returned}")]
    IdMismatch { requested: ItemId, returned: ItemId },

    #[error("item source failed for item {id}: {message}")]
    Source { id: ItemId, message: String },
}

#[async_trait]
pub trait ItemLookup: Send + Sync {
    async fn item_by_id(&self, id: ItemId) -> Result<Item, ItemResolutionError>;

    /// Results line up with `ids`. The default runs one `item_by_id` per id concurrently;
    /// lookups backed by a bulk source override it to fetch once.
    async fn items_by_ids(&self, ids: &[ItemId]) -> Vec<Result<Item, ItemResolutionError>> {
        join_all(ids.iter().map(|&id| self.item_by_id(id))).await
    }
}

/// Settle one slot, turning any failure (including an id mismatch) into `None`.
fn settle_slot(
    slot: Slot,
    id: ItemId,
    resolved: Option<Result<Item, ItemResolutionError>>,
) -> Option<Item> {
    let resolved = match resolved {
        Some(Ok(item)) if item.id == id => Ok(item),
        Some(Ok(item)) => Err(ItemResolutionError::IdMismatch {
            requested: id,
            returned: item.id,
        }),
        Some(Err(err)) => Err(err),
        None => Err(ItemResolutionError::NotFound(id)),
    };
    match resolved {
        Ok(item) => Some(item),
        Err(err) => {
            warn!(%slot, id, error = %err, "item resolution failed, leaving slot empty");
            None
        }
    }
}

/// Resolve every occupied slot of `projection` in one batch. Slots whose lookup fails
/// come back empty; the other slots are unaffected.
pub async fn resolve_loadout<L>(lookup: &L, projection: &EquipmentProjection) -> Loadout
where
    L: ItemLookup + ?Sized,
{
    let occupied: Vec<(Slot, ItemId)> = projection.occupied().collect();
    let mut loadout = Loadout::empty();
    if occupied.is_empty() {
        return loadout;
    }
    let ids: Vec<ItemId> = occupied.iter().map(|&(_, id)| id).collect();
    let mut results = lookup.items_by_ids(&ids).await.into_iter();
    for (slot, id) in occupied {
        loadout.set(slot, settle_slot(slot, id, results.next()));
    }
    loadout
}

/// Fixed in-memory item table.
#[derive(Debug, Clone, Default)]
pub struct StaticItemLookup {
    items: HashMap<ItemId, Item>,
}

impl StaticItemLookup {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }
}

#[async_trait]
impl ItemLookup for StaticItemLookup {
    async fn item_by_id(&self, id: ItemId) -> Result<Item, ItemResolutionError> {
        self.items
            .get(&id)
            .cloned()
            .ok_or(ItemResolutionError::NotFound(id))
    }
}
