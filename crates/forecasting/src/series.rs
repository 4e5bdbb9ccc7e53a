//! Sales history input and its regularisation onto a daily grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use optibrain_core::{EngineError, EngineResult, ensure_finite};

/// One observation of units sold on a given day.
///
/// Duplicate days must be summed by the caller before ingestion.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDate,
    pub quantity: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: NaiveDate, quantity: f64) -> Self {
        Self { timestamp, quantity }
    }
}

/// History laid out on a contiguous daily grid starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl DailySeries {
    /// Date of the last observation (or interpolated day).
    pub fn last_date(&self) -> NaiveDate {
        self.start + chrono::Days::new(self.values.len().saturating_sub(1) as u64)
    }
}

/// Validate ordering and fill calendar gaps by linear interpolation.
///
/// - timestamps must be strictly increasing
/// - quantities must be finite
/// - consecutive observations may be at most `max_gap_days` apart
pub fn regularize_daily(history: &[TimeSeriesPoint], max_gap_days: i64) -> EngineResult<DailySeries> {
    let Some(first) = history.first() else {
        return Err(EngineError::insufficient_data(1, 0));
    };

    let mut values = Vec::with_capacity(history.len());
    values.push(ensure_finite("quantity", first.quantity)?);

    for pair in history.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        ensure_finite("quantity", cur.quantity)?;

        let gap = (cur.timestamp - prev.timestamp).num_days();
        if gap <= 0 {
            return Err(EngineError::invalid_input(format!(
                "history timestamps must be strictly increasing ({} followed by {})",
                prev.timestamp, cur.timestamp
            )));
        }
        if gap > max_gap_days {
            return Err(EngineError::invalid_input(format!(
                "history gap of {gap} days between {} and {} exceeds {max_gap_days}",
                prev.timestamp, cur.timestamp
            )));
        }

        for step in 1..gap {
            let frac = step as f64 / gap as f64;
            values.push(prev.quantity + (cur.quantity - prev.quantity) * frac);
        }
        values.push(cur.quantity);
    }

    Ok(DailySeries {
        start: first.timestamp,
        values,
    })
}
