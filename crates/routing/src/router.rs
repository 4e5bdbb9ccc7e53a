use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use optibrain_core::{EngineError, EngineResult, NodeId, OrderId};

use crate::node::FulfillmentNode;
use crate::order::Order;
use crate::stock::NodeStockLookup;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub order_id: OrderId,
    pub assigned_node_id: NodeId,
}

/// Chooses a fulfillment node for an order.
///
/// The default router looks at activity and priority only. Build it with
/// [`OrderRouter::inventory_aware`] to also require enough stock of the
/// order's SKU at the chosen node.
#[derive(Clone, Default)]
pub struct OrderRouter {
    stock: Option<Arc<dyn NodeStockLookup>>,
}

impl core::fmt::Debug for OrderRouter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrderRouter")
            .field("inventory_aware", &self.is_inventory_aware())
            .finish()
    }
}

impl OrderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inventory_aware(stock: Arc<dyn NodeStockLookup>) -> Self {
        Self { stock: Some(stock) }
    }

    pub fn is_inventory_aware(&self) -> bool {
        self.stock.is_some()
    }

    /// Select a node without touching the order.
    pub fn select(&self, order: &Order, candidates: &[FulfillmentNode]) -> EngineResult<NodeId> {
        if candidates.is_empty() {
            return Err(EngineError::EmptyInput("nodes"));
        }

        let chosen = candidates
            .iter()
            .filter(|n| n.is_active)
            .filter(|n| match &self.stock {
                Some(stock) => stock.available(n.id, order.sku()) >= order.quantity(),
                None => true,
            })
            .min_by_key(|n| n.rank_key());

        match chosen {
            Some(node) => Ok(node.id),
            None => {
                warn!(
                    order_id = %order.id(),
                    sku = %order.sku(),
                    candidates = candidates.len(),
                    inventory_aware = self.is_inventory_aware(),
                    "no eligible fulfillment node"
                );
                Err(EngineError::NoAvailableNode {
                    candidates: candidates.len(),
                })
            }
        }
    }

    /// Route a pending order and move it to `routed`. On error the order is
    /// left untouched.
    pub fn route(&self, order: &mut Order, candidates: &[FulfillmentNode]) -> EngineResult<RoutingDecision> {
        if !order.is_pending() {
            return Err(order.not_pending());
        }
        let node_id = self.select(order, candidates)?;
        order.mark_routed(node_id)?;

        debug!(order_id = %order.id(), node_id = %node_id, "order routed");
        Ok(RoutingDecision {
            order_id: order.id(),
            assigned_node_id: node_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;
    use crate::stock::InMemoryStock;
    use optibrain_core::SkuId;
    use proptest::prelude::*;

    fn node(id: u64, is_active: bool, priority: i32) -> FulfillmentNode {
        FulfillmentNode::new(NodeId::new(id), is_active, priority)
    }

    fn order(qty: u64) -> Order {
        Order::new(OrderId::new(10), SkuId::new("SKU-1"), qty).unwrap()
    }

    #[test]
    fn lowest_priority_active_node_wins() {
        let nodes = [node(1, true, 2), node(2, true, 1), node(3, false, 0)];
        let mut o = order(1);
        let decision = OrderRouter::new().route(&mut o, &nodes).unwrap();

        assert_eq!(decision.assigned_node_id, NodeId::new(2));
        assert_eq!(decision.order_id, OrderId::new(10));
        assert_eq!(o.status(), OrderStatus::Routed { node_id: NodeId::new(2) });
    }

    #[test]
    fn priority_ties_go_to_lowest_id() {
        let nodes = [node(9, true, 1), node(4, true, 1), node(7, true, 1)];
        assert_eq!(OrderRouter::new().select(&order(1), &nodes).unwrap(), NodeId::new(4));
    }

    #[test]
    fn negative_priorities_are_preferred() {
        let nodes = [node(1, true, 0), node(2, true, -5)];
        assert_eq!(OrderRouter::new().select(&order(1), &nodes).unwrap(), NodeId::new(2));
    }

    #[test]
    fn empty_and_all_inactive_are_distinct_errors() {
        let router = OrderRouter::new();
        assert_eq!(router.select(&order(1), &[]), Err(EngineError::EmptyInput("nodes")));
        assert_eq!(
            router.select(&order(1), &[node(1, false, 0), node(2, false, 1)]),
            Err(EngineError::NoAvailableNode { candidates: 2 })
        );
    }

    #[test]
    fn failed_routing_leaves_order_pending() {
        let mut o = order(1);
        assert!(OrderRouter::new().route(&mut o, &[node(1, false, 0)]).is_err());
        assert!(o.is_pending());
    }

    #[test]
    fn routed_order_cannot_be_routed_again() {
        let router = OrderRouter::new();
        let mut o = order(1);
        router.route(&mut o, &[node(1, true, 0)]).unwrap();
        assert!(matches!(
            router.route(&mut o, &[node(2, true, 0)]),
            Err(EngineError::InvalidState(_))
        ));
        assert_eq!(o.assigned_node(), Some(NodeId::new(1)));
    }

    #[test]
    fn priority_only_router_ignores_stock() {
        // Node 1 has nothing on hand, yet wins on priority.
        let nodes = [node(1, true, 0), node(2, true, 1)];
        assert_eq!(OrderRouter::new().select(&order(5), &nodes).unwrap(), NodeId::new(1));
    }

    #[test]
    fn inventory_aware_router_skips_nodes_without_stock() {
        let stock = Arc::new(InMemoryStock::new());
        stock.set(NodeId::new(1), SkuId::new("SKU-1"), 3);
        stock.set(NodeId::new(2), SkuId::new("SKU-1"), 8);
        let router = OrderRouter::inventory_aware(stock);

        let nodes = [node(1, true, 0), node(2, true, 1)];
        assert_eq!(router.select(&order(3), &nodes).unwrap(), NodeId::new(1));
        assert_eq!(router.select(&order(5), &nodes).unwrap(), NodeId::new(2));
        assert_eq!(
            router.select(&order(9), &nodes),
            Err(EngineError::NoAvailableNode { candidates: 2 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 500,
            ..ProptestConfig::default()
        })]

        /// Property: the router never picks an inactive node and always picks
        /// the minimum (priority, id) among active ones.
        #[test]
        fn selects_minimum_active_node(
            specs in prop::collection::vec((any::<bool>(), -5i32..5), 1..20),
        ) {
            let nodes: Vec<_> = specs
                .iter()
                .enumerate()
                .map(|(i, &(active, prio))| node(i as u64 + 1, active, prio))
                .collect();
            let expected = nodes
                .iter()
                .filter(|n| n.is_active)
                .map(|n| (n.priority, n.id))
                .min();

            match (OrderRouter::new().select(&order(1), &nodes), expected) {
                (Ok(id), Some((_, want))) => {
                    prop_assert_eq!(id, want);
                    prop_assert!(nodes.iter().any(|n| n.id == id && n.is_active));
                }
                (Err(EngineError::NoAvailableNode { candidates }), None) => {
                    prop_assert_eq!(candidates, nodes.len());
                }
                (got, want) => prop_assert!(false, "got {:?}, expected {:?}", got, want),
            }
        }
    }
}
