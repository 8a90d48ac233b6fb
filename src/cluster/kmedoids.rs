//! K-medoids clustering (PAM, partitioning around medoids).
//!
//! Like k-means, but every cluster is represented by one of its own samples
//! (the **medoid**) rather than a computed mean. Works with any dissimilarity,
//! and is less sensitive to outliers since a single far point cannot drag the
//! representative away.
//!
//! # Algorithm
//!
//! 1. Sample k distinct medoids (partial Fisher–Yates shuffle)
//! 2. **Assign**: each point → nearest medoid (ties → lowest index)
//! 3. **Swap**: within each cluster, replace the medoid by the member that
//!    lowers the cluster's total distance the most:
//!    ```text
//!    Δ(c) = Σⱼ∈C d(c, xⱼ) − d(medoid, xⱼ)
//!    ```
//! 4. Repeat until no medoid changes
//!
//! Swaps are only accepted with `Δ < 0`, so the total within-cluster distance
//! recorded after every assignment never increases.

use ndarray::ArrayView2;
use rand::prelude::*;

use super::alternating::{check_data, iterate};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::distance::Distance;
use crate::error::Result;
use crate::partition::Partition;

/// Result of a k-medoids run.
#[derive(Debug, Clone)]
pub struct KMedoidsFit {
    /// Final hard partition.
    pub partition: Partition,
    /// Sample index of every cluster's medoid.
    pub medoids: Vec<usize>,
    /// Total distance of samples to their medoid, after every assignment step.
    pub costs: Vec<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the medoids stopped changing before the iteration cap.
    pub converged: bool,
}

impl From<KMedoidsFit> for Partition {
    fn from(fit: KMedoidsFit) -> Self {
        fit.partition
    }
}

/// PAM k-medoids in feature space.
#[derive(Debug, Clone)]
pub struct KMedoids {
    config: ClusterConfig,
}

impl KMedoids {
    /// Create a new k-medoids clusterer.
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
    ) -> Result<KMedoidsFit> {
        check_data(data, k)?;
        self.config.validate()?;

        let n = data.nrows();
        let distance = self.config.distance();
        let d = |a: usize, b: usize| distance.apply(data.row(a), data.row(b));

        let mut medoids = sample_medoids(n, k, rng);
        let mut labels = vec![0usize; n];
        let mut costs = Vec::new();

        let progress = iterate(&self.config, "kmedoids", |_| {
            costs.push(assign_to_medoids(&medoids, &mut labels, &d));

            let mut changed = false;
            for (c, medoid) in medoids.iter_mut().enumerate() {
                let members: Vec<usize> = (0..n).filter(|&i| labels[i] == c).collect();
                if let Some(best) = best_swap(*medoid, &members, &d) {
                    *medoid = best;
                    changed = true;
                }
            }
            Ok(!changed)
        })?;

        // Labels always reflect the final medoids.
        if !progress.converged {
            costs.push(assign_to_medoids(&medoids, &mut labels, &d));
        }

        let partition = Partition::from_labels(&labels, k)?;
        Ok(KMedoidsFit {
            partition,
            medoids,
            costs,
            iterations: progress.iterations,
            converged: progress.converged,
        })
    }

    /// Total distance of every sample to the medoid of its cluster.
    pub fn total_cost(
        data: ArrayView2<'_, f64>,
        distance: Distance,
        medoids: &[usize],
        labels: &[usize],
    ) -> f64 {
        labels
            .iter()
            .enumerate()
            .map(|(i, &c)| distance.apply(data.row(medoids[c]), data.row(i)))
            .sum()
    }
}

impl ClusterAlgorithm for KMedoids {
    type Fit = KMedoidsFit;

    fn fit(&self, data: ArrayView2<'_, f64>, k: usize) -> Result<KMedoidsFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed());
        self.fit_with_rng(data, k, &mut rng)
    }
}

/// k distinct indices from `0..n` by a partial Fisher–Yates shuffle.
fn sample_medoids<R: Rng>(n: usize, k: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}

/// Nearest-medoid assignment; returns the total distance.
fn assign_to_medoids(
    medoids: &[usize],
    labels: &mut [usize],
    d: &impl Fn(usize, usize) -> f64,
) -> f64 {
    let mut cost = 0.0;
    for (i, label) in labels.iter_mut().enumerate() {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (c, &m) in medoids.iter().enumerate() {
            let dist = d(m, i);
            if dist < best_d {
                best_d = dist;
                best = c;
            }
        }
        *label = best;
        cost += best_d;
    }
    cost
}

/// Member whose promotion to medoid lowers the cluster cost the most, if any.
fn best_swap(medoid: usize, members: &[usize], d: &impl Fn(usize, usize) -> f64) -> Option<usize> {
    let mut best = None;
    let mut lowest_delta = 0.0;
    for &candidate in members {
        if candidate == medoid {
            continue;
        }
        let delta: f64 = members
            .iter()
            .map(|&j| d(candidate, j) - d(medoid, j))
            .sum();
        if delta < lowest_delta {
            lowest_delta = delta;
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sample_medoids_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        for k in 1..=10 {
            let mut medoids = sample_medoids(10, k, &mut rng);
            assert_eq!(medoids.len(), k);
            medoids.sort_unstable();
            medoids.dedup();
            assert_eq!(medoids.len(), k);
            assert!(medoids.iter().all(|&m| m < 10));
        }
    }

    #[test]
    fn test_best_swap_moves_to_center() {
        let points = [0.0f64, 1.0, 2.0];
        let d = |a: usize, b: usize| (points[a] - points[b]).abs();
        assert_eq!(best_swap(0, &[0, 1, 2], &d), Some(1));
        assert_eq!(best_swap(1, &[0, 1, 2], &d), None);
    }

    #[test]
    fn test_kmedoids_basic() {
        let data = array![
            [0.0, 0.0],
            [0.1, 0.2],
            [0.2, 0.1],
            [10.0, 10.0],
            [10.1, 10.2],
            [10.2, 10.1]
        ];

        let fit = KMedoids::new(ClusterConfig::new(42))
            .fit(data.view(), 2)
            .unwrap();
        let labels = fit.partition.labels();

        assert!(fit.converged);
        assert!(fit.partition.is_hard());
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_kmedoids_medoids_belong_to_their_cluster() {
        let data = grid(6);
        let fit = KMedoids::new(ClusterConfig::new(9))
            .fit(data.view(), 4)
            .unwrap();
        let labels = fit.partition.labels();
        for (c, &m) in fit.medoids.iter().enumerate() {
            assert_eq!(labels[m], c);
        }
    }

    #[test]
    fn test_kmedoids_cost_never_increases() {
        let data = grid(7);
        let fit = KMedoids::new(ClusterConfig::new(3))
            .fit(data.view(), 5)
            .unwrap();
        for pair in fit.costs.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "cost increased: {pair:?}");
        }
        let labels = fit.partition.labels();
        let final_cost =
            KMedoids::total_cost(data.view(), Distance::Euclidean, &fit.medoids, &labels);
        assert!((final_cost - fit.costs[fit.costs.len() - 1]).abs() < 1e-9);
    }

    /// Slightly jittered `side × side` grid.
    fn grid(side: usize) -> ndarray::Array2<f64> {
        ndarray::Array2::from_shape_fn((side * side, 2), |(i, j)| {
            let base = if j == 0 { i / side } else { i % side } as f64;
            base + ((i * 7 + j * 3) % 5) as f64 * 0.01
        })
    }
}
