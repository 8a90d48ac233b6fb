//! The partition matrix: n samples × k clusters membership assignment.
//!
//! A partition is **hard** when every row is one-hot, and **fuzzy** when every
//! entry lies in \[0, 1\] and every row sums to 1. Hard partitions are a special
//! case of fuzzy ones.
//!
//! Kernel engines only ever touch the non-zero entries of a partition; see
//! [`Partition::nonzeros`].

mod generator;

pub use generator::PartitionGenerator;

use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2};

use crate::error::{Error, Result};

/// n×k membership matrix produced by every engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    memberships: Array2<f64>,
}

impl Partition {
    /// All-zero partition, filled in by a generator or a merge history.
    pub(crate) fn zeros(n_samples: usize, n_clusters: usize) -> Self {
        Self {
            memberships: Array2::zeros((n_samples, n_clusters)),
        }
    }

    /// Wrap an existing membership matrix without validation.
    pub fn from_memberships(memberships: Array2<f64>) -> Self {
        Self { memberships }
    }

    /// Build a hard partition from one label per sample.
    pub fn from_labels(labels: &[usize], n_clusters: usize) -> Result<Self> {
        let mut partition = Self::zeros(labels.len(), n_clusters);
        for (i, &label) in labels.iter().enumerate() {
            if label >= n_clusters {
                return Err(Error::InvalidClusterCount {
                    requested: label + 1,
                    n_items: n_clusters,
                });
            }
            partition.memberships[[i, label]] = 1.0;
        }
        Ok(partition)
    }

    /// Number of samples (rows).
    pub fn n_samples(&self) -> usize {
        self.memberships.nrows()
    }

    /// Number of clusters (columns).
    pub fn n_clusters(&self) -> usize {
        self.memberships.ncols()
    }

    /// Membership of sample `i` in cluster `k`.
    pub fn get(&self, i: usize, k: usize) -> f64 {
        self.memberships[[i, k]]
    }

    /// Read-only view of the membership matrix.
    pub fn memberships(&self) -> ArrayView2<'_, f64> {
        self.memberships.view()
    }

    pub(crate) fn memberships_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.memberships.view_mut()
    }

    /// Consume the partition and return the membership matrix.
    pub fn into_inner(self) -> Array2<f64> {
        self.memberships
    }

    /// Iterate `(sample, cluster, membership)` over non-zero entries, row-major.
    pub fn nonzeros(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.memberships
            .indexed_iter()
            .filter(|(_, &u)| u != 0.0)
            .map(|((i, k), &u)| (i, k, u))
    }

    /// Dominant cluster per sample (ties resolve to the lowest index).
    pub fn labels(&self) -> Vec<usize> {
        self.memberships
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                let mut best_u = f64::NEG_INFINITY;
                for (k, &u) in row.iter().enumerate() {
                    if u > best_u {
                        best_u = u;
                        best = k;
                    }
                }
                best
            })
            .collect()
    }

    /// Overwrite the partition with one-hot rows.
    pub(crate) fn set_labels(&mut self, labels: &[usize]) {
        debug_assert_eq!(labels.len(), self.n_samples());
        self.memberships.fill(0.0);
        for (i, &k) in labels.iter().enumerate() {
            self.memberships[[i, k]] = 1.0;
        }
    }

    /// Every row is one-hot.
    pub fn is_hard(&self) -> bool {
        self.memberships.rows().into_iter().all(|row| {
            let ones = row.iter().filter(|&&u| u == 1.0).count();
            let zeros = row.iter().filter(|&&u| u == 0.0).count();
            ones == 1 && ones + zeros == row.len()
        })
    }

    /// Every entry lies in \[0, 1\] and every row sums to 1 within `tol`.
    pub fn is_fuzzy(&self, tol: f64) -> bool {
        self.memberships.rows().into_iter().all(|row| {
            row.iter().all(|&u| (0.0..=1.0).contains(&u)) && (row.sum() - 1.0).abs() <= tol
        })
    }

    /// Column sums of `U^m`: the effective size of every cluster.
    pub fn cluster_weights(&self, fuzzification: f64) -> Array1<f64> {
        let mut weights = Array1::zeros(self.n_clusters());
        for (_, k, u) in self.nonzeros() {
            weights[k] += membership_weight(u, fuzzification);
        }
        weights
    }
}

/// `u^m`, skipping `powf` for the hard case.
#[inline]
pub(crate) fn membership_weight(u: f64, fuzzification: f64) -> f64 {
    if fuzzification == 1.0 {
        u
    } else {
        u.powf(fuzzification)
    }
}
