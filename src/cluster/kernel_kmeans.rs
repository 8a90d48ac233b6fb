//! Kernel k-means.
//!
//! Lloyd iterations carried out implicitly in the feature space of a kernel.
//! Clusters need not be linearly separable in input space: with a Gaussian
//! kernel, concentric rings come apart.
//!
//! Prototypes are pseudo-coordinates (see [`crate::kernel`]); the assignment
//! step uses
//!
//! ```text
//! d²[i,k] = K[i,i] − 2 (Kγ_k)[i] + γ_kᵀ K γ_k
//! ```
//!
//! and the run converges once no sample changes cluster. With a linear
//! kernel `K = X Xᵀ` the result equals [`KMeans`](super::KMeans) for the same seed.

use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

use super::alternating::{assign_nearest, iterate, PrototypeFit};
use super::kernel::{check_kernel, KernelPrototypes};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::partition::{Partition, PartitionGenerator};

/// Hard k-means over a precomputed kernel matrix.
#[derive(Debug, Clone)]
pub struct KernelKMeans {
    config: ClusterConfig,
}

impl KernelKMeans {
    /// Create a new kernel k-means clusterer.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Run with a caller-supplied random source instead of the configured seed.
    pub fn fit_with_rng<R: Rng>(
        &self,
        kernel: ArrayView2<'_, f64>,
        k: usize,
        rng: &mut R,
    ) -> Result<PrototypeFit> {
        check_kernel(kernel, k)?;
        self.config.validate()?;

        let n = kernel.nrows();
        let mut partition = Partition::zeros(n, k);
        self.config
            .generator_or(PartitionGenerator::HardRandom)
            .generate(&mut partition, rng);

        let mut labels = partition.labels();
        let mut prototypes = Array2::zeros((n, k));

        let progress = iterate(&self.config, "kernel_kmeans", |_| {
            let (mut current, empty) = KernelPrototypes::from_partition(kernel, &partition, 1.0);
            let mut distances = current.squared_distances(kernel);
            current.reseed(kernel, &mut distances, &empty);

            let changed = assign_nearest(distances.view(), &mut labels);
            partition.set_labels(&labels);
            prototypes = current.dense();
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

impl ClusterAlgorithm for KernelKMeans {
    type Fit = PrototypeFit;

    fn fit(&self, kernel: ArrayView2<'_, f64>, k: usize) -> Result<PrototypeFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(kernel, k, &mut rng)
    }
}
