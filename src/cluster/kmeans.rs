//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster dispersion**.
//! The foundational clustering algorithm, dating to 1957 (Lloyd).
//!
//! # The Objective
//!
//! ```text
//! J = Σₖ Σᵢ∈Cₖ d(xᵢ, μₖ)
//! ```
//!
//! With the default Euclidean measure the assignment step is identical to the
//! classic squared-Euclidean objective (same argmin).
//!
//! # Alternating Optimization
//!
//! 1. Start from a random hard partition
//! 2. **Update**: Each prototype → mean of its assigned points
//! 3. **Assign**: Each point → nearest prototype (ties → lowest index)
//! 4. Repeat until no assignment changes
//!
//! # Failure Modes
//!
//! - **Local optima**: Lloyd finds a local minimum only
//! - **Wrong k**: Must specify k in advance
//! - **Empty clusters**: A prototype that loses every point is re-seeded at the
//!   sample farthest from all other prototypes rather than becoming NaN

use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

use super::alternating::{
    assign_nearest, check_data, feature_prototypes, iterate, prototype_distances,
    reseed_feature_prototypes, PrototypeFit,
};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::partition::{Partition, PartitionGenerator};

/// Hard k-means in feature space.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: ClusterConfig,
}

impl KMeans {
    /// Create a new K-means clusterer.
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
        data: ArrayView2<'_, f64>,
        k: usize,
        rng: &mut R,
    ) -> Result<PrototypeFit> {
        check_data(data, k)?;
        self.config.validate()?;

        let distance = self.config.distance();
        let mut partition = Partition::zeros(data.nrows(), k);
        self.config
            .generator_or(PartitionGenerator::HardRandom)
            .generate(&mut partition, rng);

        let mut labels = partition.labels();
        let mut prototypes = Array2::zeros((data.ncols(), k));

        let progress = iterate(&self.config, "kmeans", |_| {
            let (mut means, empty) = feature_prototypes(data, &partition, 1.0);
            let mut distances = prototype_distances(data, means.view(), distance);
            reseed_feature_prototypes(data, &mut means, &mut distances, &empty, distance);

            let changed = assign_nearest(distances.view(), &mut labels);
            partition.set_labels(&labels);
            prototypes = means;
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

impl ClusterAlgorithm for KMeans {
    type Fit = PrototypeFit;

    fn fit(&self, data: ArrayView2<'_, f64>, k: usize) -> Result<PrototypeFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(data, k, &mut rng)
    }
}
