//! Order routing.
//!
//! Picks the fulfillment node for an incoming order: active nodes only, lowest
//! priority value first, lowest node id on ties. Stock-aware selection is an
//! explicit opt-in through [`NodeStockLookup`].

pub mod node;
pub mod order;
pub mod router;
pub mod stock;

pub use node::FulfillmentNode;
pub use order::{Order, OrderStatus};
pub use router::{OrderRouter, RoutingDecision};
pub use stock::{InMemoryStock, NodeStockLookup};
