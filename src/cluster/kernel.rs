//! Kernel (Gram) matrices and kernel-space prototypes.
//!
//! Kernel engines never see coordinates. A cluster prototype is a
//! **pseudo-coordinate** `γ_k` over the samples:
//!
//! ```text
//! γ_k[i] = U[i,k]^m / Σⱼ U[j,k]^m
//! ```
//!
//! and the squared feature-space distance from sample `i` to it expands to
//!
//! ```text
//! d²[i,k] = K[i,i] − 2 (Kγ_k)[i] + γ_kᵀ K γ_k
//! ```
//!
//! Only the non-zero entries of the partition contribute, so hard partitions
//! touch one kernel column per sample.

use ndarray::{Array1, Array2, ArrayView2};
use tracing::debug;

use super::alternating::{check_cluster_count, farthest_samples, nearest_live};
use crate::error::{Error, Result};
use crate::partition::Partition;

/// Relative tolerance for the symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Linear kernel `K = X Xᵀ`.
///
/// ```rust
/// use ndarray::array;
///
/// let k = meld::kernel::linear(array![[1.0, 0.0], [1.0, 2.0]].view());
/// assert_eq!(k, array![[1.0, 1.0], [1.0, 5.0]]);
/// ```
pub fn linear(data: ArrayView2<'_, f64>) -> Array2<f64> {
    data.dot(&data.t())
}

/// Gaussian (RBF) kernel `K[i,j] = exp(−‖xᵢ − xⱼ‖² / 2σ²)`.
pub fn gaussian(data: ArrayView2<'_, f64>, sigma: f64) -> Result<Array2<f64>> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::InvalidParameter {
            name: "sigma",
            message: "must be finite and > 0",
        });
    }
    let n = data.nrows();
    let scale = 2.0 * sigma * sigma;
    let mut kernel = Array2::zeros((n, n));
    for i in 0..n {
        kernel[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let sq: f64 = data
                .row(i)
                .iter()
                .zip(data.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            let value = (-sq / scale).exp();
            kernel[[i, j]] = value;
            kernel[[j, i]] = value;
        }
    }
    Ok(kernel)
}

/// Validate a kernel matrix against the requested cluster count.
///
/// The matrix must be square and symmetric with a non-negative diagonal.
pub(crate) fn check_kernel(kernel: ArrayView2<'_, f64>, k: usize) -> Result<()> {
    let n = kernel.nrows();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if kernel.ncols() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: kernel.ncols(),
        });
    }
    for i in 0..n {
        if kernel[[i, i]] < 0.0 {
            return Err(Error::InvalidParameter {
                name: "kernel",
                message: "diagonal must be non-negative",
            });
        }
        for j in (i + 1)..n {
            let (a, b) = (kernel[[i, j]], kernel[[j, i]]);
            if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0) {
                return Err(Error::InvalidParameter {
                    name: "kernel",
                    message: "must be symmetric",
                });
            }
        }
    }
    check_cluster_count(n, k)
}

/// `K[i,i] + K[s,s] − 2K[i,s]`, clamped at zero.
#[inline]
pub(crate) fn kernel_distance(kernel: ArrayView2<'_, f64>, i: usize, s: usize) -> f64 {
    (kernel[[i, i]] + kernel[[s, s]] - 2.0 * kernel[[i, s]]).max(0.0)
}

/// Pseudo-coordinates of every cluster with their kernel projections.
#[derive(Debug, Clone)]
pub(crate) struct KernelPrototypes {
    /// Non-zero entries `(sample, γ)` of every pseudo-coordinate.
    columns: Vec<Vec<(usize, f64)>>,
    /// n×k, column k is `Kγ_k`.
    projections: Array2<f64>,
    /// `γ_kᵀ K γ_k` per cluster.
    spans: Array1<f64>,
}

impl KernelPrototypes {
    /// Build pseudo-coordinates from `U^m`; also returns the clusters with zero weight.
    pub(crate) fn from_partition(
        kernel: ArrayView2<'_, f64>,
        partition: &Partition,
        fuzzification: f64,
    ) -> (Self, Vec<usize>) {
        let n = partition.n_samples();
        let k = partition.n_clusters();
        let weights = partition.cluster_weights(fuzzification);

        let mut columns = vec![Vec::new(); k];
        for (i, c, u) in partition.nonzeros() {
            if weights[c] > 0.0 {
                let w = crate::partition::membership_weight(u, fuzzification);
                columns[c].push((i, w / weights[c]));
            }
        }

        let mut projections = Array2::zeros((n, k));
        let mut spans = Array1::zeros(k);
        for (c, column) in columns.iter().enumerate() {
            let mut projection = projections.column_mut(c);
            for &(i, g) in column {
                projection.scaled_add(g, &kernel.column(i));
            }
            spans[c] = column.iter().map(|&(i, g)| g * projection[i]).sum();
        }

        let empty = (0..k).filter(|&c| columns[c].is_empty()).collect();
        (
            Self {
                columns,
                projections,
                spans,
            },
            empty,
        )
    }

    /// `d²[i,k]` for every sample and cluster, clamped at zero.
    pub(crate) fn squared_distances(&self, kernel: ArrayView2<'_, f64>) -> Array2<f64> {
        let (n, k) = self.projections.dim();
        Array2::from_shape_fn((n, k), |(i, c)| {
            (kernel[[i, i]] - 2.0 * self.projections[[i, c]] + self.spans[c]).max(0.0)
        })
    }

    /// Re-seed every empty cluster at a farthest-first sample.
    pub(crate) fn reseed(
        &mut self,
        kernel: ArrayView2<'_, f64>,
        distances: &mut Array2<f64>,
        empty: &[usize],
    ) {
        if empty.is_empty() {
            return;
        }
        let nearest = nearest_live(distances.view(), empty);
        let seeds = farthest_samples(nearest, empty.len(), |i, s| kernel_distance(kernel, i, s));
        for (&c, &s) in empty.iter().zip(seeds.iter()) {
            debug!(cluster = c, sample = s, "re-seeding empty kernel cluster");
            self.columns[c] = vec![(s, 1.0)];
            self.projections.column_mut(c).assign(&kernel.column(s));
            self.spans[c] = kernel[[s, s]];
            for i in 0..distances.nrows() {
                distances[[i, c]] = kernel_distance(kernel, i, s);
            }
        }
    }

    /// Dense n×k pseudo-coordinate matrix.
    pub(crate) fn dense(&self) -> Array2<f64> {
        let mut gamma = Array2::zeros(self.projections.dim());
        for (c, column) in self.columns.iter().enumerate() {
            for &(i, g) in column {
                gamma[[i, c]] = g;
            }
        }
        gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_kernel() {
        let good = array![[2.0, 1.0], [1.0, 2.0]];
        assert!(check_kernel(good.view(), 2).is_ok());

        let rect = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            check_kernel(rect.view(), 1),
            Err(Error::DimensionMismatch { .. })
        ));

        let asym = array![[1.0, 0.5], [0.2, 1.0]];
        assert!(matches!(
            check_kernel(asym.view(), 1),
            Err(Error::InvalidParameter { .. })
        ));

        let negative = array![[-1.0, 0.0], [0.0, 1.0]];
        assert!(check_kernel(negative.view(), 1).is_err());

        assert!(check_kernel(good.view(), 3).is_err());
    }

    #[test]
    fn test_gaussian_kernel() {
        let data = array![[0.0], [1.0]];
        let k = gaussian(data.view(), 1.0).unwrap();
        assert_eq!(k[[0, 0]], 1.0);
        assert!((k[[0, 1]] - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(k[[0, 1]], k[[1, 0]]);
        assert!(gaussian(data.view(), 0.0).is_err());
    }

    #[test]
    fn test_kernel_distances_match_feature_space() {
        let data = array![[0.0, 0.0], [2.0, 0.0], [0.0, 3.0], [5.0, 5.0]];
        let kernel = linear(data.view());
        let partition = Partition::from_labels(&[0, 0, 1, 1], 2).unwrap();

        let (prototypes, empty) = KernelPrototypes::from_partition(kernel.view(), &partition, 1.0);
        assert!(empty.is_empty());

        let d = prototypes.squared_distances(kernel.view());
        // Cluster 0 mean is (1, 0).
        assert!((d[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((d[[3, 0]] - 41.0).abs() < 1e-12);
        // Cluster 1 mean is (2.5, 4).
        assert!((d[[2, 1]] - (6.25 + 1.0)).abs() < 1e-12);

        let gamma = prototypes.dense();
        assert_eq!(gamma.column(0).to_vec(), vec![0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_kernel_reseed() {
        let data = array![[0.0], [1.0], [2.0], [10.0]];
        let kernel = linear(data.view());
        let partition = Partition::from_labels(&[0, 0, 0, 0], 2).unwrap();

        let (mut prototypes, empty) =
            KernelPrototypes::from_partition(kernel.view(), &partition, 1.0);
        assert_eq!(empty, vec![1]);

        let mut d = prototypes.squared_distances(kernel.view());
        prototypes.reseed(kernel.view(), &mut d, &empty);
        assert_eq!(d[[3, 1]], 0.0);
        assert!((d[[0, 1]] - 100.0).abs() < 1e-12);
        assert_eq!(prototypes.dense()[[3, 1]], 1.0);
    }
}
