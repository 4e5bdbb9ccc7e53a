//! Service level -> standard-normal quantile.

use optibrain_core::{EngineError, EngineResult, stats};

/// Published z-values for the service levels planners actually quote.
///
/// Exact table hits return these rounded values (e.g. 0.95 -> 1.645) so plans
/// match hand calculations; anything else falls back to the quantile function.
/// The rounding means z is not monotone right around a table entry:
/// 0.95 maps to 1.645 while 0.9500001 maps to about 1.64485.
const STANDARD_TABLE: [(f64, f64); 9] = [
    (0.80, 0.842),
    (0.85, 1.036),
    (0.90, 1.282),
    (0.95, 1.645),
    (0.975, 1.96),
    (0.98, 2.054),
    (0.99, 2.326),
    (0.995, 2.576),
    (0.999, 3.09),
];

/// Map a target in-stock probability to its z-score.
pub fn z_score(service_level: f64) -> EngineResult<f64> {
    if let Some(&(_, z)) = STANDARD_TABLE
        .iter()
        .find(|(level, _)| (level - service_level).abs() < 1e-9)
    {
        return Ok(z);
    }
    stats::inverse_normal_cdf(service_level).ok_or(EngineError::UnsupportedServiceLevel(service_level))
}
