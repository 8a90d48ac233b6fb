//! Kernel fuzzy C-means.
//!
//! Fuzzy C-means in the feature space of a kernel. Pseudo-coordinates are
//! weighted by `U^m`, and the membership update applies the usual Lagrange
//! formula to the squared kernel distances:
//!
//! ```text
//! U[i,k] = 1 / Σⱼ (d²[i,k] / d²[i,j])^(1/(m-1))
//! ```
//!
//! Starts from a hard random partition unless a generator is configured.

use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

use super::alternating::{iterate, update_fuzzy_memberships, PrototypeFit};
use super::kernel::{check_kernel, KernelPrototypes};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::partition::{Partition, PartitionGenerator};

/// Fuzzy C-means over a precomputed kernel matrix.
#[derive(Debug, Clone)]
pub struct KernelFuzzyCMeans {
    config: ClusterConfig,
}

impl KernelFuzzyCMeans {
    /// Create a new kernel fuzzy C-means clusterer.
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
        self.config.validate_fuzzy()?;

        let n = kernel.nrows();
        let m = self.config.fuzzification();
        let epsilon = self.config.epsilon();

        let mut partition = Partition::zeros(n, k);
        self.config
            .generator_or(PartitionGenerator::HardRandom)
            .generate(&mut partition, rng);

        let mut prototypes = Array2::zeros((n, k));

        let progress = iterate(&self.config, "kernel_fuzzy_cmeans", |_| {
            let (mut current, empty) = KernelPrototypes::from_partition(kernel, &partition, m);
            let mut distances = current.squared_distances(kernel);
            current.reseed(kernel, &mut distances, &empty);

            let step = update_fuzzy_memberships(distances.view(), &mut partition, m);
            prototypes = current.dense();
            Ok(step < epsilon)
        })?;

        Ok(PrototypeFit {
            partition,
            prototypes,
            iterations: progress.iterations,
            converged: progress.converged,
        })
    }
}

impl ClusterAlgorithm for KernelFuzzyCMeans {
    type Fit = PrototypeFit;

    fn fit(&self, kernel: ArrayView2<'_, f64>, k: usize) -> Result<PrototypeFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(kernel, k, &mut rng)
    }
}
