//! Pairwise nearest neighbour clustering in kernel space.
//!
//! Same merge rule as [`PairwiseNearestNeighbour`](super::PairwiseNearestNeighbour),
//! with code vectors replaced by sparse pseudo-coordinates `γ` over the
//! samples. The squared distance between two clusters is
//!
//! ```text
//! d²(a, b) = γₐᵀKγₐ + γ_bᵀKγ_b − 2 γₐᵀKγ_b
//! ```
//!
//! Only pairs with a non-zero kernel entry start out connected. For a sparse
//! kernel (a neighbourhood graph) the merge graph may therefore fall apart
//! before `k` clusters remain, which is reported as
//! [`Error::DisconnectedGraph`](crate::Error::DisconnectedGraph).

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::kernel::{check_kernel, kernel_distance};
use super::merge::{agglomerate, Agglomerative, PnnFit};
use super::sparse::{SparseColumn, SymmetricSparse};
use super::traits::ClusterAlgorithm;
use crate::config::ClusterConfig;
use crate::error::Result;

/// Pseudo-coordinates with cached kernel projections.
struct KernelCodebook<'a> {
    kernel: ArrayView2<'a, f64>,
    columns: Vec<SparseColumn>,
    /// `Kγ` of merged slots; singletons use the kernel column.
    projections: Vec<Option<Array1<f64>>>,
    spans: Vec<f64>,
}

impl<'a> KernelCodebook<'a> {
    fn new(kernel: ArrayView2<'a, f64>) -> Self {
        let n = kernel.nrows();
        Self {
            kernel,
            columns: (0..n).map(SparseColumn::unit).collect(),
            projections: vec![None; n],
            spans: (0..n).map(|i| kernel[[i, i]]).collect(),
        }
    }

    fn projection(&self, slot: usize) -> ArrayView1<'_, f64> {
        match &self.projections[slot] {
            Some(p) => p.view(),
            None => self.kernel.column(slot),
        }
    }
}

impl Agglomerative for KernelCodebook<'_> {
    fn absorb(&mut self, survivor: usize, retired: usize, w_survivor: f64, w_retired: f64) {
        let total = w_survivor + w_retired;
        let (fs, fr) = (w_survivor / total, w_retired / total);

        let column = self.columns[survivor].combine(&self.columns[retired], fs, fr);
        let mut projection = self.projection(survivor).to_owned();
        projection.mapv_inplace(|x| x * fs);
        projection.scaled_add(fr, &self.projection(retired));

        self.spans[survivor] = column.dot(projection.view());
        self.columns[survivor] = column;
        self.projections[survivor] = Some(projection);

        self.columns[retired].clear();
        self.projections[retired] = None;
        self.spans[retired] = 0.0;
    }

    fn dissimilarity(&self, a: usize, b: usize) -> f64 {
        let cross = self.columns[a].dot(self.projection(b));
        (self.spans[a] + self.spans[b] - 2.0 * cross).max(0.0)
    }
}

/// Pairwise nearest neighbour clustering over a precomputed kernel matrix.
#[derive(Debug, Clone)]
pub struct KernelPairwiseNearestNeighbour {
    config: ClusterConfig,
}

impl KernelPairwiseNearestNeighbour {
    /// Create a new kernel PNN clusterer.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }
}

impl ClusterAlgorithm for KernelPairwiseNearestNeighbour {
    type Fit = PnnFit;

    fn fit(&self, kernel: ArrayView2<'_, f64>, k: usize) -> Result<PnnFit> {
        check_kernel(kernel, k)?;
        self.config.validate()?;

        let n = kernel.nrows();
        let mut cache = SymmetricSparse::new(n);
        for a in 0..n {
            for b in (a + 1)..n {
                if kernel[[a, b]] != 0.0 {
                    cache.insert(a, b, 0.5 * kernel_distance(kernel, a, b));
                }
            }
        }

        let mut codebook = KernelCodebook::new(kernel);
        let history = agglomerate(&mut codebook, cache, n, k, &self.config, "kernel_pnn")?;
        let partition = history.partition()?;

        Ok(PnnFit { partition, history })
    }
}
