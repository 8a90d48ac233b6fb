//! # meld
//!
//! Partition-matrix clustering: hard and fuzzy k-means, k-medoids, kernel
//! k-means (dense or over a truncated SVD) and pairwise nearest neighbour
//! merging, in feature space or over a precomputed kernel.
//!
//! Every engine is built from an immutable [`ClusterConfig`] with a mandatory
//! seed, so equal inputs give bit-identical partitions.
//!
//! ```rust
//! use meld::{ClusterAlgorithm, ClusterConfig, KMeans};
//! use ndarray::array;
//!
//! let data = array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];
//! let fit = KMeans::new(ClusterConfig::new(7)).fit(data.view(), 2).unwrap();
//!
//! assert!(fit.converged);
//! assert!(fit.partition.is_hard());
//! ```
//!
//! **Default build** includes the `svd` feature (`TruncatedSvd::from_kernel`,
//! backed by `faer`).

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod distance;
/// Error types used across `meld`.
pub mod error;
pub mod partition;
pub mod quality;

pub use cluster::kernel;
pub use cluster::{
    ClusterAlgorithm, FuzzyCMeans, KMeans, KMedoids, KMedoidsFit, KernelFuzzyCMeans,
    KernelKMeans, KernelPairwiseNearestNeighbour, KernelSvdKMeans, Merge, MergeHistory,
    PairwiseNearestNeighbour, PnnFit, PrototypeFit, TruncatedSvd,
};
pub use config::{CancelToken, ClusterConfig};
pub use distance::{Distance, DistanceFn};
pub use error::{Error, Result};
pub use partition::{Partition, PartitionGenerator};
