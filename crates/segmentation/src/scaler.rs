//! Per-feature standardisation to zero mean / unit variance.

use optibrain_core::stats;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler<const D: usize> {
    means: [f64; D],
    scales: [f64; D],
}

impl<const D: usize> StandardScaler<D> {
    /// Fit on `rows`. A constant feature keeps scale 1, so it is only centred.
    pub fn fit(rows: &[[f64; D]]) -> Self {
        let mut means = [0.0; D];
        let mut scales = [1.0; D];
        for f in 0..D {
            let column: Vec<f64> = rows.iter().map(|r| r[f]).collect();
            let mean = stats::mean(&column);
            let std = stats::stddev_population(&column, mean);
            means[f] = mean;
            if std > f64::EPSILON {
                scales[f] = std;
            }
        }
        Self { means, scales }
    }

    pub fn transform(&self, rows: &[[f64; D]]) -> Vec<[f64; D]> {
        rows.iter()
            .map(|r| {
                let mut out = [0.0; D];
                for f in 0..D {
                    out[f] = (r[f] - self.means[f]) / self.scales[f];
                }
                out
            })
            .collect()
    }
}
