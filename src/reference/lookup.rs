//! Item lookup backed by the reference lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::data::item::{Item, ItemId};
use crate::data::lookup::{ItemLookup, ItemResolutionError};
use crate::reference::lifecycle::ReferenceDataLifecycle;

/// Serves items from the most recently loaded reference data, and fetches on demand from
/// the underlying source while nothing has loaded yet.
#[derive(Clone)]
pub struct RegistryItemLookup {
    lifecycle: Arc<ReferenceDataLifecycle>,
}

impl RegistryItemLookup {
    pub fn new(lifecycle: Arc<ReferenceDataLifecycle>) -> Self {
        Self { lifecycle }
    }
}

#[async_trait]
impl ItemLookup for RegistryItemLookup {
    async fn item_by_id(&self, id: ItemId) -> Result<Item, ItemResolutionError> {
        self.items_by_ids(&[id])
            .await
            .pop()
            .unwrap_or(Err(ItemResolutionError::NotFound(id)))
    }

    async fn items_by_ids(&self, ids: &[ItemId]) -> Vec<Result<Item, ItemResolutionError>> {
        if let Some(data) = self.lifecycle.data() {
            return ids
                .iter()
                .map(|&id| data.item(id).cloned().ok_or(ItemResolutionError::NotFound(id)))
                .collect();
        }
        debug!(count = ids.len(), "reference data not loaded, fetching items from source");
        self.lifecycle.source().fetch_items(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::source::MemorySource;

    #[tokio::test]
    async fn resolves_before_and_after_bootstrap() {
        let source = MemorySource {
            items: vec![Item::new(4151).with_name("Abyssal whip")],
            ..MemorySource::default()
        };
        let lifecycle = ReferenceDataLifecycle::new(Arc::new(source));
        let lookup = RegistryItemLookup::new(Arc::clone(&lifecycle));

        assert_eq!(lookup.item_by_id(4151).await.unwrap().id, 4151);

        lifecycle.initialize().await.unwrap();
        assert_eq!(lookup.item_by_id(4151).await.unwrap().id, 4151);
        assert!(matches!(
            lookup.item_by_id(1).await,
            Err(ItemResolutionError::NotFound(1))
        ));
    }
}
