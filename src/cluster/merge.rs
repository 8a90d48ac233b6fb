//! Merge history and the shared agglomeration loop of the PNN engines.
//!
//! Pairwise nearest neighbour clustering starts from one cluster per sample
//! and repeatedly merges the pair whose union increases the total squared
//! error the least:
//!
//! ```text
//! cost(a, b) = (wₐ × w_b)/(wₐ + w_b) × dist(a, b)
//! ```
//!
//! where `w` counts the samples a cluster has absorbed. The lower slot index
//! survives every merge; the retired slot's weight drops to zero.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::sparse::SymmetricSparse;
use crate::config::ClusterConfig;
use crate::error::{Error, Result};
use crate::partition::Partition;

/// A single merge operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Slot that absorbed the other.
    pub survivor: usize,
    /// Slot retired by the merge.
    pub retired: usize,
    /// Increase in squared error caused by the merge.
    pub cost: f64,
    /// Number of samples in the merged cluster.
    pub size: usize,
}

/// Ordered merges plus the retired → survivor parent map.
#[derive(Debug, Clone, Default)]
pub struct MergeHistory {
    n_items: usize,
    merges: Vec<Merge>,
    parent: HashMap<usize, usize>,
}

impl MergeHistory {
    /// Empty history over `n_items` singleton clusters.
    pub fn new(n_items: usize) -> Self {
        Self {
            n_items,
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            parent: HashMap::new(),
        }
    }

    /// Record that `retired` was merged into `survivor`.
    pub fn record(&mut self, survivor: usize, retired: usize, cost: f64, size: usize) {
        self.parent.insert(retired, survivor);
        self.merges.push(Merge {
            survivor,
            retired,
            cost,
            size,
        });
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Merges in the order they happened.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Merge costs in order.
    pub fn costs(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.cost).collect()
    }

    /// Final cluster slot of `slot`, following the parent chain.
    ///
    /// A chain longer than the number of items, or a slot that is its own
    /// parent, means the history is malformed.
    pub fn root(&self, slot: usize) -> Result<usize> {
        let mut current = slot;
        for _ in 0..=self.n_items {
            match self.parent.get(&current) {
                None => return Ok(current),
                Some(&next) if next == current => break,
                Some(&next) => current = next,
            }
        }
        Err(Error::MalformedMergeHistory { slot })
    }

    /// Hard partition with one column per root, numbered in first-seen order.
    pub fn partition(&self) -> Result<Partition> {
        let mut index: HashMap<usize, usize> = HashMap::new();
        let mut labels = Vec::with_capacity(self.n_items);
        for i in 0..self.n_items {
            let root = self.root(i)?;
            let next = index.len();
            labels.push(*index.entry(root).or_insert(next));
        }
        Partition::from_labels(&labels, index.len())
    }
}

/// Result of a PNN run.
#[derive(Debug, Clone)]
pub struct PnnFit {
    /// Final hard partition.
    pub partition: Partition,
    /// Every merge performed.
    pub history: MergeHistory,
}

impl From<PnnFit> for Partition {
    fn from(fit: PnnFit) -> Self {
        fit.partition
    }
}

/// Cluster representatives that can be merged and compared.
pub(crate) trait Agglomerative {
    /// Fold `retired` into `survivor`, weighting by cluster sizes.
    fn absorb(&mut self, survivor: usize, retired: usize, w_survivor: f64, w_retired: f64);

    /// Squared-error distance between the representatives of two live slots.
    fn dissimilarity(&self, a: usize, b: usize) -> f64;
}

/// Merge cheapest pairs until `k` clusters remain.
///
/// `cache` holds the initial pair costs; pairs absent from it are never
/// merged directly.
pub(crate) fn agglomerate<A: Agglomerative>(
    model: &mut A,
    mut cache: SymmetricSparse,
    n: usize,
    k: usize,
    config: &ClusterConfig,
    engine: &'static str,
) -> Result<MergeHistory> {
    let mut weights = vec![1.0f64; n];
    let mut history = MergeHistory::new(n);
    debug!(engine, n, k, pairs = cache.n_pairs(), "starting agglomeration");

    for step in 0..n - k {
        config.check_cancelled(step)?;

        let (a, b, cost) = cache
            .min_pair()
            .ok_or(Error::DisconnectedGraph { remaining: n - step })?;
        let (wa, wb) = (weights[a], weights[b]);

        model.absorb(a, b, wa, wb);
        weights[a] = wa + wb;
        weights[b] = 0.0;
        history.record(a, b, cost, weights[a] as usize);
        trace!(survivor = a, retired = b, cost, "merge");

        let mut neighbours = cache.remove_slot(b);
        neighbours.extend(cache.neighbours(a));
        neighbours.sort_unstable();
        neighbours.dedup();

        for i in neighbours {
            if i == a || i == b {
                continue;
            }
            let (wi, wa) = (weights[i], weights[a]);
            let cost = (wi * wa) / (wi + wa) * model.dissimilarity(i, a);
            cache.insert(i, a, cost);
        }
    }

    debug!(engine, merges = history.n_merges(), "agglomeration finished");
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points on a line; representatives are weighted means.
    struct Line {
        points: Vec<f64>,
    }

    impl Agglomerative for Line {
        fn absorb(&mut self, survivor: usize, retired: usize, ws: f64, wr: f64) {
            self.points[survivor] =
                (ws * self.points[survivor] + wr * self.points[retired]) / (ws + wr);
        }

        fn dissimilarity(&self, a: usize, b: usize) -> f64 {
            let d = self.points[a] - self.points[b];
            d * d
        }
    }

    fn full_cache(points: &[f64]) -> SymmetricSparse {
        let mut cache = SymmetricSparse::new(points.len());
        for a in 0..points.len() {
            for b in (a + 1)..points.len() {
                let d = points[a] - points[b];
                cache.insert(a, b, 0.5 * d * d);
            }
        }
        cache
    }

    #[test]
    fn test_history_partition_first_seen_order() {
        let mut history = MergeHistory::new(4);
        history.record(1, 3, 0.5, 2);
        history.record(0, 1, 1.0, 3);

        assert_eq!(history.root(3).unwrap(), 0);
        assert_eq!(history.root(2).unwrap(), 2);

        let partition = history.partition().unwrap();
        assert_eq!(partition.labels(), vec![0, 0, 1, 0]);
        assert_eq!(history.costs(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_history_rejects_cycles() {
        let mut history = MergeHistory::new(3);
        history.record(0, 1, 1.0, 2);
        history.record(1, 0, 1.0, 2);
        assert_eq!(
            history.root(0),
            Err(Error::MalformedMergeHistory { slot: 0 })
        );
        assert!(history.partition().is_err());

        let mut selfish = MergeHistory::new(3);
        selfish.record(2, 2, 0.0, 1);
        assert!(selfish.root(2).is_err());
    }

    #[test]
    fn test_agglomerate_line() {
        let points = vec![0.0, 1.0, 10.0, 11.0, 30.0];
        let cache = full_cache(&points);
        let mut model = Line { points };

        let history =
            agglomerate(&mut model, cache, 5, 2, &ClusterConfig::new(0), "test").unwrap();

        assert_eq!(history.n_merges(), 3);
        // Lowest-index pair wins the tie between (0,1) and (2,3).
        assert_eq!(history.merges()[0].survivor, 0);
        assert_eq!(history.merges()[0].retired, 1);
        assert_eq!(history.merges()[1].survivor, 2);
        assert_eq!(history.merges()[0].cost, 0.5);

        let labels = history.partition().unwrap().labels();
        assert_eq!(labels, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_agglomerate_disconnected() {
        let mut cache = SymmetricSparse::new(4);
        cache.insert(0, 1, 1.0);
        cache.insert(2, 3, 1.0);
        let mut model = Line {
            points: vec![0.0, 1.0, 5.0, 6.0],
        };

        let result = agglomerate(&mut model, cache, 4, 1, &ClusterConfig::new(0), "test");
        assert_eq!(result.unwrap_err(), Error::DisconnectedGraph { remaining: 2 });
    }

    #[test]
    fn test_agglomerate_cancelled() {
        let points = vec![0.0, 1.0, 2.0];
        let token = crate::config::CancelToken::new();
        token.cancel();
        let config = ClusterConfig::new(0).with_cancel_token(token);
        let mut model = Line {
            points: points.clone(),
        };

        let result = agglomerate(&mut model, full_cache(&points), 3, 1, &config, "test");
        assert_eq!(result.unwrap_err(), Error::Cancelled { iterations: 0 });
    }
}
