//! Shared machinery of the alternating-optimisation engines.
//!
//! Each engine owns its prototype and membership formulas; this module holds
//! the parts they have in common: the iteration driver (cap, cancellation,
//! logging), input validation, the weighted-mean prototype step, nearest and
//! Lagrange membership steps, and farthest-first re-seeding of empty clusters.

use ndarray::{Array2, ArrayView2};
use tracing::{debug, warn};

use crate::config::ClusterConfig;
use crate::distance::Distance;
use crate::error::{Error, Result};
use crate::partition::{membership_weight, Partition};

/// Result of a prototype-based run (feature or kernel space).
#[derive(Debug, Clone)]
pub struct PrototypeFit {
    /// Final partition.
    pub partition: Partition,
    /// One column per cluster: p×k means, or n×k pseudo-coordinates for kernel engines.
    pub prototypes: Array2<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the convergence test passed before the iteration cap.
    pub converged: bool,
}

impl From<PrototypeFit> for Partition {
    fn from(fit: PrototypeFit) -> Self {
        fit.partition
    }
}

/// Iteration count and convergence flag of a driver run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Progress {
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
}

/// Run `step` until it reports convergence, the cap is hit, or the run is cancelled.
///
/// Reaching the cap is not an error.
pub(crate) fn iterate<F>(
    config: &ClusterConfig,
    engine: &'static str,
    mut step: F,
) -> Result<Progress>
where
    F: FnMut(usize) -> Result<bool>,
{
    for iteration in 0..config.max_iter() {
        config.check_cancelled(iteration)?;
        if step(iteration)? {
            debug!(engine, iterations = iteration + 1, "converged");
            return Ok(Progress {
                iterations: iteration + 1,
                converged: true,
            });
        }
    }
    warn!(
        engine,
        max_iter = config.max_iter(),
        "iteration cap reached before convergence"
    );
    Ok(Progress {
        iterations: config.max_iter(),
        converged: false,
    })
}

/// Reject empty inputs and cluster counts outside `1..=n`.
pub(crate) fn check_cluster_count(n: usize, k: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if k == 0 || k > n {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }
    Ok(())
}

/// Validate a feature matrix against the requested cluster count.
pub(crate) fn check_data(data: ArrayView2<'_, f64>, k: usize) -> Result<()> {
    if data.ncols() == 0 {
        return Err(Error::EmptyInput);
    }
    check_cluster_count(data.nrows(), k)
}

/// Weighted means `v[:,k] = Σ U^m x / Σ U^m`, plus the clusters with zero weight.
///
/// Empty clusters keep a zero column; callers re-seed them.
pub(crate) fn feature_prototypes(
    data: ArrayView2<'_, f64>,
    partition: &Partition,
    fuzzification: f64,
) -> (Array2<f64>, Vec<usize>) {
    let k = partition.n_clusters();
    let mut prototypes = Array2::zeros((data.ncols(), k));
    let mut weights = vec![0.0; k];

    for (i, c, u) in partition.nonzeros() {
        let w = membership_weight(u, fuzzification);
        weights[c] += w;
        prototypes.column_mut(c).scaled_add(w, &data.row(i));
    }

    let mut empty = Vec::new();
    for (c, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            prototypes.column_mut(c).mapv_inplace(|x| x / w);
        } else {
            empty.push(c);
        }
    }
    (prototypes, empty)
}

/// `d[i,k] = measure(v[:,k], x[i,:])`.
pub(crate) fn prototype_distances(
    data: ArrayView2<'_, f64>,
    prototypes: ArrayView2<'_, f64>,
    distance: Distance,
) -> Array2<f64> {
    let mut distances = Array2::zeros((data.nrows(), prototypes.ncols()));
    for (k, prototype) in prototypes.columns().into_iter().enumerate() {
        for (i, row) in data.rows().into_iter().enumerate() {
            distances[[i, k]] = distance.apply(prototype, row);
        }
    }
    distances
}

/// Pick `count` distinct samples, each the farthest from every live prototype
/// and from the samples picked before it.
///
/// `nearest[i]` is the distance from sample `i` to its nearest live prototype;
/// `sample_distance(i, s)` the distance between two samples.
pub(crate) fn farthest_samples(
    mut nearest: Vec<f64>,
    count: usize,
    sample_distance: impl Fn(usize, usize) -> f64,
) -> Vec<usize> {
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let mut best = None;
        let mut best_d = f64::NEG_INFINITY;
        for (i, &d) in nearest.iter().enumerate() {
            if d > best_d {
                best_d = d;
                best = Some(i);
            }
        }
        // Fewer samples than requested seeds.
        let Some(s) = best else { break };
        picked.push(s);
        for (i, d) in nearest.iter_mut().enumerate() {
            if *d != f64::NEG_INFINITY {
                *d = d.min(sample_distance(i, s));
            }
        }
        nearest[s] = f64::NEG_INFINITY;
    }
    picked
}

/// Minimum over the live (non-empty) columns of every row.
pub(crate) fn nearest_live(distances: ArrayView2<'_, f64>, empty: &[usize]) -> Vec<f64> {
    distances
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(k, _)| !empty.contains(k))
                .map(|(_, &d)| d)
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Re-seed every empty feature-space prototype at a farthest-first sample.
pub(crate) fn reseed_feature_prototypes(
    data: ArrayView2<'_, f64>,
    prototypes: &mut Array2<f64>,
    distances: &mut Array2<f64>,
    empty: &[usize],
    distance: Distance,
) {
    if empty.is_empty() {
        return;
    }
    let nearest = nearest_live(distances.view(), empty);
    let seeds = farthest_samples(nearest, empty.len(), |i, s| {
        distance.apply(data.row(i), data.row(s))
    });
    for (&c, &s) in empty.iter().zip(seeds.iter()) {
        debug!(cluster = c, sample = s, "re-seeding empty cluster");
        prototypes.column_mut(c).assign(&data.row(s));
        for (i, row) in data.rows().into_iter().enumerate() {
            distances[[i, c]] = distance.apply(data.row(s), row);
        }
    }
}

/// Assign every sample to its nearest cluster; returns whether any label changed.
///
/// Ties resolve to the lowest cluster index.
pub(crate) fn assign_nearest(distances: ArrayView2<'_, f64>, labels: &mut [usize]) -> bool {
    let mut changed = false;
    for (row, label) in distances.rows().into_iter().zip(labels.iter_mut()) {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (k, &d) in row.iter().enumerate() {
            if d < best_d {
                best_d = d;
                best = k;
            }
        }
        if *label != best {
            *label = best;
            changed = true;
        }
    }
    changed
}

/// Lagrange-multiplier membership update; returns the largest absolute change.
///
/// `U[i,k] = 1 / Σⱼ (d[i,k] / d[i,j])^(1/(m-1))`. Rows with zero distances give
/// their whole membership, in equal shares, to the zero-distance clusters.
pub(crate) fn update_fuzzy_memberships(
    distances: ArrayView2<'_, f64>,
    partition: &mut Partition,
    fuzzification: f64,
) -> f64 {
    let exponent = 1.0 / (fuzzification - 1.0);
    let mut step: f64 = 0.0;
    let mut u = partition.memberships_mut();

    for (d, mut row) in distances.rows().into_iter().zip(u.rows_mut()) {
        let zeros = d.iter().filter(|&&x| x == 0.0).count();
        for (k, slot) in row.iter_mut().enumerate() {
            let value = if zeros > 0 {
                if d[k] == 0.0 {
                    1.0 / zeros as f64
                } else {
                    0.0
                }
            } else {
                let sum: f64 = d.iter().map(|&dj| (d[k] / dj).powf(exponent)).sum();
                1.0 / sum
            };
            step = step.max((value - *slot).abs());
            *slot = value;
        }
    }
    step
}
