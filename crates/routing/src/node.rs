use serde::{Deserialize, Serialize};

use optibrain_core::NodeId;

/// Warehouse or store that can ship an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentNode {
    pub id: NodeId,
    pub is_active: bool,
    /// Lower value = preferred.
    pub priority: i32,
}

impl FulfillmentNode {
    pub fn new(id: NodeId, is_active: bool, priority: i32) -> Self {
        Self { id, is_active, priority }
    }

    /// Selection key: priority first, then id.
    pub(crate) fn rank_key(&self) -> (i32, NodeId) {
        (self.priority, self.id)
    }
}
