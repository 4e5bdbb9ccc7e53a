use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use optibrain_core::{CustomerId, EngineError, EngineResult, ensure_non_negative};

use crate::config::SegmentationConfig;
use crate::kmeans::{self, KMeansParams};
use crate::scaler::StandardScaler;

/// RFM features for one customer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatureVector {
    pub customer_id: CustomerId,
    /// Days since last purchase.
    pub recency: f64,
    /// Number of purchases.
    pub frequency: f64,
    /// Total spend.
    pub monetary: f64,
}

impl CustomerFeatureVector {
    fn validated(&self) -> EngineResult<[f64; 3]> {
        let field = |name: &str, v: f64| {
            ensure_non_negative(&format!("customer {} {name}", self.customer_id), v)
        };
        Ok([
            field("recency", self.recency)?,
            field("frequency", self.frequency)?,
            field("monetary", self.monetary)?,
        ])
    }
}

/// Aggregate view of one ranked segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProfile {
    pub rank: usize,
    pub size: usize,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: f64,
}

/// Segmentation output.
///
/// Ranks are dense (`0..profiles.len()`) and ordered by ascending mean
/// monetary value: rank 0 is the lowest-value segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAssignment {
    pub assignments: BTreeMap<CustomerId, usize>,
    pub profiles: Vec<SegmentProfile>,
}

impl SegmentAssignment {
    pub fn segment_of(&self, customer: CustomerId) -> Option<usize> {
        self.assignments.get(&customer).copied()
    }

    pub fn segment_count(&self) -> usize {
        self.profiles.len()
    }
}

/// Seeded RFM k-means segmenter.
#[derive(Debug, Clone, Default)]
pub struct CustomerSegmenter {
    config: SegmentationConfig,
}

impl CustomerSegmenter {
    pub fn new(config: SegmentationConfig) -> EngineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(EngineError::invalid_input(issues.join("; ")));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn segment_default(&self, customers: &[CustomerFeatureVector]) -> EngineResult<SegmentAssignment> {
        self.segment(customers, self.config.default_segments)
    }

    /// Standardise features, cluster into `n_segments`, then renumber clusters
    /// by ascending mean monetary value (raw, not standardised).
    ///
    /// With fewer customers than `n_segments`, every customer lands in
    /// segment 0.
    pub fn segment(
        &self,
        customers: &[CustomerFeatureVector],
        n_segments: usize,
    ) -> EngineResult<SegmentAssignment> {
        if customers.is_empty() {
            return Err(EngineError::EmptyInput("customers"));
        }
        if n_segments == 0 {
            return Err(EngineError::invalid_input("n_segments must be >= 1"));
        }

        let mut seen = HashSet::with_capacity(customers.len());
        let mut rows = Vec::with_capacity(customers.len());
        for c in customers {
            if !seen.insert(c.customer_id) {
                return Err(EngineError::invalid_input(format!(
                    "duplicate customer_id {}",
                    c.customer_id
                )));
            }
            rows.push(c.validated()?);
        }

        let raw_labels = if customers.len() < n_segments {
            vec![0; customers.len()]
        } else {
            let scaled = StandardScaler::fit(&rows).transform(&rows);
            let params = KMeansParams {
                k: n_segments,
                n_init: self.config.n_init,
                max_iter: self.config.max_iter,
                tolerance: self.config.tolerance,
                seed: self.config.seed,
            };
            let fit = kmeans::fit(&scaled, &params);
            debug!(
                customers = customers.len(),
                n_segments,
                inertia = fit.inertia,
                iterations = fit.iterations,
                "k-means fitted"
            );
            fit.labels
        };

        Ok(rank_by_monetary(customers, &rows, &raw_labels))
    }
}

fn rank_by_monetary(
    customers: &[CustomerFeatureVector],
    rows: &[[f64; 3]],
    raw_labels: &[usize],
) -> SegmentAssignment {
    let clusters = raw_labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut sums = vec![[0.0; 3]; clusters];
    let mut sizes = vec![0usize; clusters];
    for (row, &label) in rows.iter().zip(raw_labels) {
        sizes[label] += 1;
        for f in 0..3 {
            sums[label][f] += row[f];
        }
    }

    // Only non-empty clusters get a rank; stable sort keeps raw order on ties.
    let mut order: Vec<usize> = (0..clusters).filter(|&c| sizes[c] > 0).collect();
    order.sort_by(|&a, &b| {
        let ma = sums[a][2] / sizes[a] as f64;
        let mb = sums[b][2] / sizes[b] as f64;
        ma.total_cmp(&mb)
    });

    let mut rank_of = vec![0usize; clusters];
    let mut profiles = Vec::with_capacity(order.len());
    for (rank, &cluster) in order.iter().enumerate() {
        rank_of[cluster] = rank;
        let n = sizes[cluster] as f64;
        profiles.push(SegmentProfile {
            rank,
            size: sizes[cluster],
            mean_recency: sums[cluster][0] / n,
            mean_frequency: sums[cluster][1] / n,
            mean_monetary: sums[cluster][2] / n,
        });
    }

    let assignments = customers
        .iter()
        .zip(raw_labels)
        .map(|(c, &label)| (c.customer_id, rank_of[label]))
        .collect();

    SegmentAssignment { assignments, profiles }
}
