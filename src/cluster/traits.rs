//! Clustering traits.

use ndarray::ArrayView2;

use crate::error::Result;
use crate::partition::Partition;

/// Common interface for every engine that consumes a single matrix.
///
/// The input is a feature matrix (n × p) for feature-space engines and a
/// kernel matrix (n × n) for kernel engines.
pub trait ClusterAlgorithm {
    /// Detailed result of a run (partition plus prototypes, medoids or merges).
    type Fit: Into<Partition>;

    /// Run the engine and return the full fit.
    fn fit(&self, input: ArrayView2<'_, f64>, k: usize) -> Result<Self::Fit>;

    /// Run the engine and return only the partition.
    fn cluster(&self, input: ArrayView2<'_, f64>, k: usize) -> Result<Partition> {
        self.fit(input, k).map(Into::into)
    }

    /// Run the engine and return the dominant cluster of every sample.
    fn fit_predict(&self, input: ArrayView2<'_, f64>, k: usize) -> Result<Vec<usize>> {
        self.cluster(input, k).map(|p| p.labels())
    }
}
