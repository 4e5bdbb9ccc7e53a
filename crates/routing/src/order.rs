use serde::{Deserialize, Serialize};

use optibrain_core::{EngineError, EngineResult, NodeId, OrderId, SkuId};

/// Routing lifecycle. `Routed` is terminal here; later fulfillment states
/// belong to downstream systems.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Routed { node_id: NodeId },
}

/// Order awaiting a fulfillment node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    sku: SkuId,
    quantity: u64,
    status: OrderStatus,
}

impl Order {
    /// New pending order. Quantity must be at least 1.
    pub fn new(id: OrderId, sku: SkuId, quantity: u64) -> EngineResult<Self> {
        if quantity == 0 {
            return Err(EngineError::invalid_input(format!("order {id} quantity must be >= 1")));
        }
        Ok(Self {
            id,
            sku,
            quantity,
            status: OrderStatus::Pending,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn sku(&self) -> &SkuId {
        &self.sku
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn assigned_node(&self) -> Option<NodeId> {
        match self.status {
            OrderStatus::Routed { node_id } => Some(node_id),
            OrderStatus::Pending => None,
        }
    }

    /// `pending -> routed`. Any other transition is rejected.
    pub(crate) fn mark_routed(&mut self, node_id: NodeId) -> EngineResult<()> {
        if !self.is_pending() {
            return Err(self.not_pending());
        }
        self.status = OrderStatus::Routed { node_id };
        Ok(())
    }

    pub(crate) fn not_pending(&self) -> EngineError {
        EngineError::invalid_state(format!(
            "order {} is already routed to node {}",
            self.id,
            self.assigned_node().map_or_else(|| "?".to_string(), |n| n.to_string())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(OrderId::new(1), SkuId::new("SKU-1"), 2).unwrap()
    }

    #[test]
    fn new_orders_are_pending() {
        let o = order();
        assert!(o.is_pending());
        assert_eq!(o.assigned_node(), None);
    }

    #[test]
    fn pending_transitions_to_routed_once() {
        let mut o = order();
        o.mark_routed(NodeId::new(4)).unwrap();
        assert_eq!(o.status(), OrderStatus::Routed { node_id: NodeId::new(4) });

        match o.mark_routed(NodeId::new(5)) {
            Err(EngineError::InvalidState(msg)) => assert!(msg.contains("node 4")),
            other => panic!("expected invalid state, got {other:?}"),
        }
        assert_eq!(o.assigned_node(), Some(NodeId::new(4)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(
            Order::new(OrderId::new(1), SkuId::new("A"), 0),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(OrderStatus::Routed { node_id: NodeId::new(2) }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "routed", "node_id": 2}));
        let json = serde_json::to_value(OrderStatus::Pending).unwrap();
        assert_eq!(json, serde_json::json!({"status": "pending"}));
    }
}
