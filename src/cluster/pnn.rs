//! Pairwise nearest neighbour (PNN) clustering.
//!
//! Bottom-up clustering in feature space. Every sample starts as its own
//! cluster with a **code vector** equal to the sample; each step merges the
//! pair with the smallest merge cost and replaces the survivor's code vector
//! by the size-weighted mean of both.
//!
//! # Merge Cost
//!
//! ```text
//! cost(A, B) = (nₐ × nᵦ)/(nₐ + nᵦ) × d(μₐ, μᵦ)
//! ```
//!
//! With [`Distance::SquaredEuclidean`](crate::Distance::SquaredEuclidean) this
//! is exactly Ward's criterion: the increase in within-cluster variance, and
//! merge costs never decrease. The default Euclidean measure gives a cheaper,
//! less outlier-sensitive variant.
//!
//! # When to Use
//!
//! - **Deterministic results**: no random initialisation
//! - **Small-medium data**: O(n²) pair cache, O(n³) time

use ndarray::{Array2, ArrayView2};

use super::alternating::check_data;
use super::merge::{agglomerate, Agglomerative, PnnFit};
use super::sparse::SymmetricSparse;
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::distance::Distance;
use crate::error::Result;

/// Code vectors (one row per slot) under a dissimilarity measure.
struct Codebook {
    codes: Array2<f64>,
    distance: Distance,
}

impl Agglomerative for Codebook {
    fn absorb(&mut self, survivor: usize, retired: usize, w_survivor: f64, w_retired: f64) {
        let total = w_survivor + w_retired;
        let retired_code = self.codes.row(retired).to_owned();
        let mut code = self.codes.row_mut(survivor);
        code.mapv_inplace(|x| x * w_survivor / total);
        code.scaled_add(w_retired / total, &retired_code);
    }

    fn dissimilarity(&self, a: usize, b: usize) -> f64 {
        self.distance.apply(self.codes.row(a), self.codes.row(b))
    }
}

/// Pairwise nearest neighbour clustering in feature space.
#[derive(Debug, Clone)]
pub struct PairwiseNearestNeighbour {
    config: ClusterConfig,
}

impl PairwiseNearestNeighbour {
    /// Create a new PNN clusterer.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }
}

impl ClusterAlgorithm for PairwiseNearestNeighbour {
    type Fit = PnnFit;

    fn fit(&self, data: ArrayView2<'_, f64>, k: usize) -> Result<PnnFit> {
        check_data(data, k)?;
        self.config.validate()?;

        let n = data.nrows();
        let distance = self.config.distance();

        let mut cache = SymmetricSparse::new(n);
        for a in 0..n {
            for b in (a + 1)..n {
                cache.insert(a, b, 0.5 * distance.apply(data.row(a), data.row(b)));
            }
        }

        let mut codebook = Codebook {
            codes: data.to_owned(),
            distance,
        };
        let history = agglomerate(&mut codebook, cache, n, k, &self.config, "pnn")?;
        let partition = history.partition()?;

        Ok(PnnFit { partition, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pnn_basic() {
        let data = array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];

        let labels = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
            .fit_predict(data.view(), 2)
            .unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_pnn_history() {
        let data = array![[0.0, 0.0], [1.0, 0.0], [10.0, 0.0]];

        let fit = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
            .fit(data.view(), 1)
            .unwrap();

        assert_eq!(fit.history.n_items(), 3);
        assert_eq!(fit.history.n_merges(), 2);
        assert_eq!(fit.history.merges()[0].retired, 1);
        assert_eq!(fit.history.merges()[1].size, 3);
        assert!(fit.partition.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_pnn_ward_costs_non_decreasing() {
        let data = array![[0.0], [0.4], [1.5], [3.0], [3.2], [7.0], [7.1], [9.0]];

        let fit = PairwiseNearestNeighbour::new(
            ClusterConfig::new(0).with_distance(Distance::SquaredEuclidean),
        )
        .fit(data.view(), 1)
        .unwrap();

        let costs = fit.history.costs();
        for pair in costs.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-12, "costs decreased: {pair:?}");
        }
        // First merge joins 7.0 and 7.1 (samples 5 and 6).
        assert_eq!(fit.history.merges()[0].survivor, 5);
        assert!((costs[0] - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_pnn_duplicate_points_merge_first() {
        // Zero-cost pairs are real pairs.
        let data = array![[5.0], [0.0], [5.0], [9.0]];
        let fit = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
            .fit(data.view(), 3)
            .unwrap();
        assert_eq!(fit.history.merges()[0].cost, 0.0);
        assert_eq!(fit.history.merges()[0].survivor, 0);
        assert_eq!(fit.history.merges()[0].retired, 2);
    }

    #[test]
    fn test_pnn_k_equals_n_is_identity() {
        let data = array![[0.0], [1.0], [2.0]];
        let fit = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
            .fit(data.view(), 3)
            .unwrap();
        assert_eq!(fit.history.n_merges(), 0);
        assert_eq!(fit.partition.labels(), vec![0, 1, 2]);
    }
}
