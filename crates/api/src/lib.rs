//! Outer surface of the decision engine: request/response contracts,
//! configuration loading and the [`DecisionService`] facade used by the
//! `optibrain` binary and by embedding services.

pub mod config;
pub mod dto;
pub mod errors;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use errors::{ApiError, ErrorKind};
pub use service::{DecisionService, Operation};
