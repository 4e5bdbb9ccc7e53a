//! `optibrain-core`: shared building blocks for the decision engine.
//!
//! This crate contains **pure** primitives (no IO, no storage, no transport):
//! identifiers, the error taxonomy every component reports through, and the
//! statistics helpers the components share.

pub mod error;
pub mod id;
pub mod stats;

pub use error::{EngineError, EngineResult, ensure_finite, ensure_non_negative};
pub use id::{CustomerId, ModelId, NodeId, OrderId, SkuId};
