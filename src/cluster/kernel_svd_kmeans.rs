//! Kernel k-means over a truncated SVD of the kernel.
//!
//! With `K ≈ U diag(σ) Vᵀ` (U, V: n×p, p ≪ n) the kernel projections of a
//! pseudo-coordinate never need the full matrix:
//!
//! ```text
//! (Kγ)[i] ≈ Σ_s U[i,s] σ_s (Vᵀγ)[s]
//! ```
//!
//! so one iteration costs O(n·p) per cluster instead of O(n²). The constant
//! `K[i,i]` term does not change the argmin and is dropped from the assignment
//! score:
//!
//! ```text
//! score[i,k] = γ_kᵀKγ_k − 2 (Kγ_k)[i]
//! ```
//!
//! Choosing the rank is left to the caller; [`TruncatedSvd::from_kernel`]
//! computes a factor from a dense kernel when the `svd` feature is enabled.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use tracing::debug;

use super::alternating::{
    assign_nearest, check_cluster_count, farthest_samples, iterate, PrototypeFit,
};
use crate::config::ClusterConfig;
use crate::error::{Error, Result};
use crate::partition::{Partition, PartitionGenerator};

/// Low-rank factorisation `K ≈ U diag(σ) Vᵀ` of a kernel matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedSvd {
    u: Array2<f64>,
    singular_values: Array1<f64>,
    v: Array2<f64>,
}

impl TruncatedSvd {
    /// Wrap precomputed factors: `u` and `v` are n×p, `singular_values` has length p.
    pub fn new(u: Array2<f64>, singular_values: Array1<f64>, v: Array2<f64>) -> Result<Self> {
        if u.dim() != v.dim() || singular_values.len() != u.ncols() {
            return Err(Error::ShapeMismatch {
                expected: format!("u, v: n×{0}, singular values: {0}", u.ncols()),
                actual: format!(
                    "u: {}×{}, v: {}×{}, singular values: {}",
                    u.nrows(),
                    u.ncols(),
                    v.nrows(),
                    v.ncols(),
                    singular_values.len()
                ),
            });
        }
        if u.nrows() == 0 || u.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(Self {
            u,
            singular_values,
            v,
        })
    }

    /// Rank-`rank` SVD of a dense kernel matrix.
    #[cfg(feature = "svd")]
    pub fn from_kernel(kernel: ArrayView2<'_, f64>, rank: usize) -> Result<Self> {
        let n = kernel.nrows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if kernel.ncols() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: kernel.ncols(),
            });
        }
        if rank == 0 || rank > n {
            return Err(Error::InvalidParameter {
                name: "rank",
                message: "must be in 1..=n",
            });
        }

        let mat = faer::Mat::<f64>::from_fn(n, n, |i, j| kernel[[i, j]]);
        let svd = mat.svd();
        let (u, s, v) = (svd.u(), svd.s_diagonal(), svd.v());

        Self::new(
            Array2::from_shape_fn((n, rank), |(i, j)| u[(i, j)]),
            Array1::from_shape_fn(rank, |j| s[j]),
            Array2::from_shape_fn((n, rank), |(i, j)| v[(i, j)]),
        )
    }

    /// Number of samples n.
    pub fn n_samples(&self) -> usize {
        self.u.nrows()
    }

    /// Rank p of the factorisation.
    pub fn rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Left factor (n×p).
    pub fn u(&self) -> ArrayView2<'_, f64> {
        self.u.view()
    }

    /// Singular values (p).
    pub fn singular_values(&self) -> ArrayView1<'_, f64> {
        self.singular_values.view()
    }

    /// Right factor (n×p).
    pub fn v(&self) -> ArrayView2<'_, f64> {
        self.v.view()
    }

    /// `Σ_s U[i,s] σ_s w[s]`.
    fn project(&self, i: usize, w: ArrayView1<'_, f64>) -> f64 {
        self.u
            .row(i)
            .iter()
            .zip(self.singular_values.iter())
            .zip(w.iter())
            .map(|((u, s), w)| u * s * w)
            .sum()
    }

    /// Approximate `K[i,j]`.
    fn entry(&self, i: usize, j: usize) -> f64 {
        self.project(i, self.v.row(j))
    }

    /// Approximate `K[i,i] + K[s,s] − 2K[i,s]`, clamped at zero.
    fn distance(&self, i: usize, s: usize) -> f64 {
        (self.entry(i, i) + self.entry(s, s) - 2.0 * self.entry(i, s)).max(0.0)
    }
}

/// Hard kernel k-means on a low-rank kernel factorisation.
///
/// Takes a [`TruncatedSvd`] rather than a single matrix, so it exposes
/// `fit`/`cluster` as inherent methods instead of implementing
/// [`ClusterAlgorithm`](super::ClusterAlgorithm).
#[derive(Debug, Clone)]
pub struct KernelSvdKMeans {
    config: ClusterConfig,
}

impl KernelSvdKMeans {
    /// Create a new SVD kernel k-means clusterer.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Run the engine and return the full fit.
    pub fn fit(&self, svd: &TruncatedSvd, k: usize) -> Result<PrototypeFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(svd, k, &mut rng)
    }

    /// Run the engine and return only the partition.
    pub fn cluster(&self, svd: &TruncatedSvd, k: usize) -> Result<Partition> {
        self.fit(svd, k).map(Into::into)
    }

    /// Run with a caller-supplied random source instead of the configured seed.
    pub fn fit_with_rng<R: Rng>(
        &self,
        svd: &TruncatedSvd,
        k: usize,
        rng: &mut R,
    ) -> Result<PrototypeFit> {
        let n = svd.n_samples();
        check_cluster_count(n, k)?;
        self.config.validate()?;

        let mut partition = Partition::zeros(n, k);
        self.config
            .generator_or(PartitionGenerator::HardRandom)
            .generate(&mut partition, rng);

        let mut labels = partition.labels();
        let mut prototypes = Array2::zeros((n, k));

        let progress = iterate(&self.config, "kernel_svd_kmeans", |_| {
            let (mut gamma, vt_gamma, empty) = pseudo_coordinates(svd, &partition);
            let mut scores = assignment_scores(svd, gamma.view(), vt_gamma.view());
            if !empty.is_empty() {
                for (c, s) in reseed(svd, &mut scores, &empty) {
                    gamma[[s, c]] = 1.0;
                }
            }

            let changed = assign_nearest(scores.view(), &mut labels);
            partition.set_labels(&labels);
            prototypes = gamma;
            Ok(!changed)
        })?;

        Ok(PrototypeFit {
            partition,
            prototypes,
            iterations: progress.iterations,
            converged: progress.converged,
        })
    }
}

/// Dense γ (n×k), `Vᵀγ` (p×k) and the clusters with zero weight.
fn pseudo_coordinates(
    svd: &TruncatedSvd,
    partition: &Partition,
) -> (Array2<f64>, Array2<f64>, Vec<usize>) {
    let k = partition.n_clusters();
    let weights = partition.cluster_weights(1.0);
    let mut gamma = Array2::zeros((svd.n_samples(), k));
    let mut vt_gamma = Array2::zeros((svd.rank(), k));

    for (i, c, u) in partition.nonzeros() {
        let g = u / weights[c];
        gamma[[i, c]] = g;
        vt_gamma.column_mut(c).scaled_add(g, &svd.v.row(i));
    }

    let empty = (0..k).filter(|&c| weights[c] == 0.0).collect();
    (gamma, vt_gamma, empty)
}

/// `score[i,k] = span_k − 2 (Kγ_k)[i]`.
fn assignment_scores(
    svd: &TruncatedSvd,
    gamma: ArrayView2<'_, f64>,
    vt_gamma: ArrayView2<'_, f64>,
) -> Array2<f64> {
    let n = svd.n_samples();
    let k = gamma.ncols();
    let mut scores = Array2::zeros((n, k));
    for c in 0..k {
        let w = vt_gamma.column(c);
        let projection: Vec<f64> = (0..n).map(|i| svd.project(i, w)).collect();
        let span: f64 = gamma
            .column(c)
            .iter()
            .zip(projection.iter())
            .filter(|(g, _)| **g != 0.0)
            .map(|(g, p)| g * p)
            .sum();
        for (i, p) in projection.iter().enumerate() {
            scores[[i, c]] = span - 2.0 * p;
        }
    }
    scores
}

/// Re-seed empty clusters at farthest-first samples under the approximate kernel.
///
/// Returns the `(cluster, sample)` pairs chosen.
fn reseed(svd: &TruncatedSvd, scores: &mut Array2<f64>, empty: &[usize]) -> Vec<(usize, usize)> {
    let n = svd.n_samples();
    let diagonal: Vec<f64> = (0..n).map(|i| svd.entry(i, i)).collect();

    let nearest: Vec<f64> = scores
        .rows()
        .into_iter()
        .zip(diagonal.iter())
        .map(|(row, &kii)| {
            row.iter()
                .enumerate()
                .filter(|(c, _)| !empty.contains(c))
                .map(|(_, &score)| (kii + score).max(0.0))
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let seeds = farthest_samples(nearest, empty.len(), |i, s| svd.distance(i, s));
    let mut seeded = Vec::with_capacity(seeds.len());
    for (&c, &s) in empty.iter().zip(seeds.iter()) {
        debug!(cluster = c, sample = s, "re-seeding empty svd cluster");
        let w = svd.v.row(s);
        let span = svd.project(s, w);
        for i in 0..n {
            scores[[i, c]] = span - 2.0 * svd.project(i, w);
        }
        seeded.push((c, s));
    }
    seeded
}
