use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use optibrain_core::{NodeId, SkuId};

/// Per-node on-hand stock, supplied by whoever owns inventory snapshots.
pub trait NodeStockLookup: Send + Sync {
    /// Units of `sku` available at `node`. Unknown pairs report 0.
    fn available(&self, node: NodeId, sku: &SkuId) -> u64;
}

impl<S> NodeStockLookup for Arc<S>
where
    S: NodeStockLookup + ?Sized,
{
    fn available(&self, node: NodeId, sku: &SkuId) -> u64 {
        (**self).available(node, sku)
    }
}

/// In-memory stock table for tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryStock {
    levels: RwLock<HashMap<(NodeId, SkuId), u64>>,
}

impl InMemoryStock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, node: NodeId, sku: SkuId, units: u64) {
        let mut levels = self.levels.write().unwrap_or_else(PoisonError::into_inner);
        levels.insert((node, sku), units);
    }
}

impl NodeStockLookup for InMemoryStock {
    fn available(&self, node: NodeId, sku: &SkuId) -> u64 {
        let levels = self.levels.read().unwrap_or_else(PoisonError::into_inner);
        levels.get(&(node, sku.clone())).copied().unwrap_or(0)
    }
}
