//! Engine error model.

use thiserror::Error;

/// Result type used across the decision engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
///
/// Every variant is a deterministic input-validation failure local to a single
/// call. Retrying with the same input reproduces the same error, so nothing in
/// the engine retries internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Forecast history is too short for trend/seasonal decomposition.
    #[error("insufficient data: need at least {required} daily points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Forecast horizon was not a positive number of days.
    #[error("invalid horizon: days must be >= 1, got {0}")]
    InvalidHorizon(i64),

    /// Price band is inverted (or not a finite range).
    #[error("invalid price band: min_price {min} > max_price {max}")]
    InvalidPriceBand { min: f64, max: f64 },

    /// Nothing to process (no customers, no candidate nodes, ...).
    #[error("empty input: no {0} supplied")]
    EmptyInput(&'static str),

    /// Candidates were supplied but none is eligible for routing.
    #[error("no available fulfillment node among {candidates} candidate(s)")]
    NoAvailableNode { candidates: usize },

    /// Service level has no standard-normal quantile mapping.
    #[error("unsupported service level {0}: must lie strictly between 0 and 1")]
    UnsupportedServiceLevel(f64),

    /// A value failed validation (NaN, negative quantity, ordering, duplicates).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A state transition is not allowed from the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl EngineError {
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Stable machine-readable code, suitable for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InsufficientData { .. } => "insufficient_data",
            EngineError::InvalidHorizon(_) => "invalid_horizon",
            EngineError::InvalidPriceBand { .. } => "invalid_price_band",
            EngineError::EmptyInput(_) => "empty_input",
            EngineError::NoAvailableNode { .. } => "no_available_node",
            EngineError::UnsupportedServiceLevel(_) => "unsupported_service_level",
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::InvalidState(_) => "invalid_state",
        }
    }
}

/// Reject NaN/infinite values and (optionally) negatives with a named error.
pub fn ensure_finite(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid_input(format!("{name} must be a finite number, got {value}")))
    }
}

pub fn ensure_non_negative(name: &str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid_input(format!("{name} must be >= 0, got {value}")));
    }
    Ok(value)
}
