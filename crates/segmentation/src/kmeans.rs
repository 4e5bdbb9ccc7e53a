//! Seeded k-means (k-means++ initialisation, Lloyd iterations).
//!
//! All randomness comes from one `ChaCha8Rng` seeded from the configured seed,
//! so identical input and seed give bit-identical labels on every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KMeansParams {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence threshold on the summed squared centroid shift.
    pub tolerance: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit<const D: usize> {
    /// Cluster index per input point (raw, arbitrary numbering).
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; D]>,
    pub inertia: f64,
    pub iterations: usize,
}

/// Cluster `points` into `params.k` groups, keeping the lowest-inertia run
/// out of `params.n_init` restarts (earlier run wins ties).
///
/// Callers guarantee `points.len() >= k >= 1`.
pub fn fit<const D: usize>(points: &[[f64; D]], params: &KMeansParams) -> KMeansFit<D> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut best: Option<KMeansFit<D>> = None;

    for _ in 0..params.n_init.max(1) {
        let centroids = init_plus_plus(points, params.k, &mut rng);
        let run = lloyd(points, centroids, params.max_iter, params.tolerance);
        let better = best.as_ref().is_none_or(|b| run.inertia < b.inertia);
        if better {
            best = Some(run);
        }
    }

    // n_init.max(1) guarantees at least one run.
    best.unwrap_or_else(|| lloyd(points, points[..params.k].to_vec(), 0, 0.0))
}

fn sq_dist<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Nearest centroid; ties go to the lowest index.
fn nearest<const D: usize>(p: &[f64; D], centroids: &[[f64; D]]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (j, c) in centroids.iter().enumerate() {
        let d = sq_dist(p, c);
        if d < best.1 {
            best = (j, d);
        }
    }
    best
}

fn init_plus_plus<const D: usize>(points: &[[f64; D]], k: usize, rng: &mut ChaCha8Rng) -> Vec<[f64; D]> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..n)]);

    let mut dist: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let idx = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = n - 1;
            for (i, d) in dist.iter().enumerate() {
                acc += d;
                if acc > target {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // Every point coincides with a chosen centre.
            rng.random_range(0..n)
        };

        let c = points[idx];
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, &c));
        }
        centroids.push(c);
    }

    centroids
}

fn lloyd<const D: usize>(
    points: &[[f64; D]],
    mut centroids: Vec<[f64; D]>,
    max_iter: usize,
    tolerance: f64,
) -> KMeansFit<D> {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    while iterations < max_iter {
        iterations += 1;

        let mut dists = Vec::with_capacity(points.len());
        for (label, p) in labels.iter_mut().zip(points) {
            let (j, d) = nearest(p, &centroids);
            *label = j;
            dists.push(d);
        }

        let mut sums = vec![[0.0; D]; k];
        let mut counts = vec![0usize; k];
        for (p, &j) in points.iter().zip(&labels) {
            counts[j] += 1;
            for f in 0..D {
                sums[j][f] += p[f];
            }
        }

        let mut shift = 0.0;
        for j in 0..k {
            let next = if counts[j] == 0 {
                // Empty cluster: re-seed at the worst-served point.
                let far = dists
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, d)| if *d > dists[best] { i } else { best });
                dists[far] = 0.0;
                points[far]
            } else {
                let mut c = [0.0; D];
                for f in 0..D {
                    c[f] = sums[j][f] / counts[j] as f64;
                }
                c
            };
            shift += sq_dist(&centroids[j], &next);
            centroids[j] = next;
        }

        if shift <= tolerance {
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, p) in labels.iter_mut().zip(points) {
        let (j, d) = nearest(p, &centroids);
        *label = j;
        inertia += d;
    }

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}
