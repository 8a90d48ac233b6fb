//! Clustering engines producing partition matrices.
//!
//! Every engine turns one input matrix into a [`Partition`](crate::Partition):
//! an n×k membership matrix, hard (one-hot rows) or fuzzy (rows summing to 1).
//!
//! ## Engines
//!
//! | Engine | Input | Partition | Family |
//! |--------|-------|-----------|--------|
//! | [`KMeans`] | features n×p | hard | alternating |
//! | [`FuzzyCMeans`] | features n×p | fuzzy | alternating |
//! | [`KMedoids`] | features n×p | hard | alternating (swap) |
//! | [`KernelKMeans`] | kernel n×n | hard | alternating |
//! | [`KernelFuzzyCMeans`] | kernel n×n | fuzzy | alternating |
//! | [`KernelSvdKMeans`] | [`TruncatedSvd`] | hard | alternating |
//! | [`PairwiseNearestNeighbour`] | features n×p | hard | agglomerative |
//! | [`KernelPairwiseNearestNeighbour`] | kernel n×n | hard | agglomerative |
//!
//! ### Alternating optimisation
//!
//! Start from a random partition, then alternate a **prototype step** (weighted
//! means, `U^m` weights) with a **membership step** (nearest prototype, or the
//! fuzzy Lagrange update) until memberships settle or the iteration cap is hit.
//! Reaching the cap is not an error: the fit reports `converged == false`.
//!
//! Kernel variants never form coordinates; prototypes are pseudo-coordinates
//! over the samples and distances come from the kernel trick.
//!
//! ### Agglomerative merging
//!
//! Start with one cluster per sample and merge the cheapest pair until k
//! remain. Deterministic, no seed needed; the [`MergeHistory`] records every
//! merge.
//!
//! ## Usage
//!
//! ```rust
//! use meld::cluster::{ClusterAlgorithm, FuzzyCMeans, KMeans};
//! use meld::ClusterConfig;
//! use ndarray::array;
//!
//! let data = array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];
//!
//! // Hard clustering with k-means
//! let labels = KMeans::new(ClusterConfig::new(42))
//!     .fit_predict(data.view(), 2)
//!     .unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! // Soft clustering with fuzzy C-means
//! let partition = FuzzyCMeans::new(ClusterConfig::new(42))
//!     .cluster(data.view(), 2)
//!     .unwrap();
//! assert!(partition.is_fuzzy(1e-9));
//! ```

mod alternating;
mod fuzzy_cmeans;
pub mod kernel;
mod kernel_fuzzy_cmeans;
mod kernel_kmeans;
mod kernel_pnn;
mod kernel_svd_kmeans;
mod kmeans;
mod kmedoids;
mod merge;
mod pnn;
mod sparse;
mod traits;

pub use alternating::PrototypeFit;
pub use fuzzy_cmeans::FuzzyCMeans;
pub use kernel_fuzzy_cmeans::KernelFuzzyCMeans;
pub use kernel_kmeans::KernelKMeans;
pub use kernel_pnn::KernelPairwiseNearestNeighbour;
pub use kernel_svd_kmeans::{KernelSvdKMeans, TruncatedSvd};
pub use kmeans::KMeans;
pub use kmedoids::{KMedoids, KMedoidsFit};
pub use merge::{Merge, MergeHistory, PnnFit};
pub use pnn::PairwiseNearestNeighbour;
pub use traits::ClusterAlgorithm;
