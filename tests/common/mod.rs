//! Synthetic datasets shared by the integration tests.

#![allow(dead_code)]

use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Isotropic Gaussian blobs: `per_blob` samples around every centre.
///
/// Returns the data and the blob index of every sample.
pub fn gaussian_blobs(
    centres: &[[f64; 2]],
    per_blob: usize,
    std_dev: f64,
    seed: u64,
) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, std_dev).unwrap();

    let n = centres.len() * per_blob;
    let mut data = Array2::zeros((n, 2));
    let mut truth = Vec::with_capacity(n);
    for (c, centre) in centres.iter().enumerate() {
        for s in 0..per_blob {
            let i = c * per_blob + s;
            data[[i, 0]] = centre[0] + noise.sample(&mut rng);
            data[[i, 1]] = centre[1] + noise.sample(&mut rng);
            truth.push(c);
        }
    }
    (data, truth)
}

/// The three well separated blobs used across the end-to-end tests.
pub fn three_blobs(seed: u64) -> (Array2<f64>, Vec<usize>) {
    gaussian_blobs(&[[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]], 30, 0.5, seed)
}

/// Whether two labelings agree up to a relabeling of clusters.
pub fn same_clustering(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut forward = std::collections::HashMap::new();
    let mut backward = std::collections::HashMap::new();
    a.iter().zip(b.iter()).all(|(&x, &y)| {
        *forward.entry(x).or_insert(y) == y && *backward.entry(y).or_insert(x) == x
    })
}
