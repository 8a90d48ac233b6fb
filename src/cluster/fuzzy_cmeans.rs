//! Fuzzy C-means clustering.
//!
//! FCM provides **soft clustering**: every point holds a membership in every
//! cluster, and memberships of a point sum to 1.
//!
//! # The Objective
//!
//! ```text
//! J_m = Σᵢ Σₖ U[i,k]^m · d(xᵢ, vₖ)
//! ```
//!
//! The fuzzification exponent `m > 1` controls softness: as `m → 1` the
//! memberships approach a hard partition, large `m` flattens them toward `1/k`.
//!
//! # Alternating Optimization
//!
//! **Prototype step**: `vₖ = Σᵢ U[i,k]^m xᵢ / Σᵢ U[i,k]^m`
//!
//! **Membership step** (closed-form Lagrange-multiplier solution):
//! ```text
//! U[i,k] = 1 / Σⱼ (d[i,k] / d[i,j])^(1/(m-1))
//! ```
//!
//! Iteration stops once the largest membership change drops below epsilon.
//!
//! # Failure Modes
//!
//! - **Exact matches**: a zero distance would divide by zero; the point
//!   instead takes full membership of the matching cluster(s)
//! - **Local optima**: like k-means, the result depends on initialization

use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

use super::alternating::{
    check_data, feature_prototypes, iterate, prototype_distances, reseed_feature_prototypes,
    update_fuzzy_memberships, PrototypeFit,
};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::partition::{Partition, PartitionGenerator};

/// Fuzzy C-means in feature space.
#[derive(Debug, Clone)]
pub struct FuzzyCMeans {
    config: ClusterConfig,
}

impl FuzzyCMeans {
    /// Create a new fuzzy C-means clusterer.
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
        self.config.validate_fuzzy()?;

        let m = self.config.fuzzification();
        let epsilon = self.config.epsilon();
        let distance = self.config.distance();

        let mut partition = Partition::zeros(data.nrows(), k);
        self.config
            .generator_or(PartitionGenerator::FuzzyRandom)
            .generate(&mut partition, rng);

        let mut prototypes = Array2::zeros((data.ncols(), k));

        let progress = iterate(&self.config, "fuzzy_cmeans", |_| {
            let (mut means, empty) = feature_prototypes(data, &partition, m);
            let mut distances = prototype_distances(data, means.view(), distance);
            reseed_feature_prototypes(data, &mut means, &mut distances, &empty, distance);

            let step = update_fuzzy_memberships(distances.view(), &mut partition, m);
            prototypes = means;
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

impl ClusterAlgorithm for FuzzyCMeans {
    type Fit = PrototypeFit;

    fn fit(&self, data: ArrayView2<'_, f64>, k: usize) -> Result<PrototypeFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(data, k, &mut rng)
    }
}
