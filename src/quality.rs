//! Partition quality measures.
//!
//! Consumers of a finished [`Partition`]; no engine depends on them.
//!
//! # Metrics Overview
//!
//! | Metric | Range | Best | Properties |
//! |--------|-------|------|------------|
//! | [`partition_coefficient`] | [1/k, 1] | 1 | Crispness of a fuzzy partition |
//! | [`partition_entropy`] | [0, ln k] | 0 | Fuzziness, information view |
//! | [`xie_beni_index`] | [0, ∞) | 0 | Compactness over separation |
//! | [`inclusion`] | [0, 1] per pair | low off-diagonal | Overlap between clusters |
//! | [`adjusted_rand_index`] | [-1, 1] | 1 | Agreement with reference labels |
//!
//! # Example
//!
//! ```rust
//! use meld::quality::{partition_coefficient, partition_entropy};
//! use meld::Partition;
//!
//! let hard = Partition::from_labels(&[0, 1, 1], 2).unwrap();
//! assert_eq!(partition_coefficient(&hard), 1.0);
//! assert_eq!(partition_entropy(&hard), 0.0);
//! ```
//!
//! # References
//!
//! - Bezdek (1981). "Pattern Recognition with Fuzzy Objective Function Algorithms"
//! - Xie & Beni (1991). "A validity measure for fuzzy clustering"
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)

use std::collections::HashMap;

use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};
use crate::partition::{membership_weight, Partition};

/// Mean over samples of `Σₖ U[i,k]²`.
///
/// 1 for a hard partition, `1/k` for the uniform one.
pub fn partition_coefficient(partition: &Partition) -> f64 {
    let n = partition.n_samples();
    if n == 0 {
        return 0.0;
    }
    partition.nonzeros().map(|(_, _, u)| u * u).sum::<f64>() / n as f64
}

/// Mean over samples of `−Σₖ U[i,k] ln U[i,k]`, with `0 ln 0 = 0`.
pub fn partition_entropy(partition: &Partition) -> f64 {
    let n = partition.n_samples();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = partition
        .nonzeros()
        .filter(|&(_, _, u)| u > 0.0)
        .map(|(_, _, u)| -u * u.ln())
        .sum();
    total / n as f64
}

/// Xie–Beni validity index.
///
/// ```text
/// XB = (Σᵢ Σₖ U[i,k]^m ‖xᵢ − vₖ‖² / n) / min_{k≠l} ‖vₖ − v_l‖²
/// ```
///
/// `prototypes` is p×k, one column per cluster, as returned by the
/// feature-space engines. Coincident prototypes give `f64::INFINITY`.
pub fn xie_beni_index(
    partition: &Partition,
    prototypes: ArrayView2<'_, f64>,
    data: ArrayView2<'_, f64>,
    fuzzification: f64,
) -> Result<f64> {
    let (n, p) = data.dim();
    let k = partition.n_clusters();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if partition.n_samples() != n || prototypes.dim() != (p, k) {
        return Err(Error::ShapeMismatch {
            expected: format!("{n}×{k} partition, {p}×{k} prototypes"),
            actual: format!(
                "{}×{} partition, {}×{} prototypes",
                partition.n_samples(),
                k,
                prototypes.nrows(),
                prototypes.ncols()
            ),
        });
    }
    if k < 2 {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }

    let squared = |a: ndarray::ArrayView1<'_, f64>, b: ndarray::ArrayView1<'_, f64>| -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    };

    let compactness: f64 = partition
        .nonzeros()
        .map(|(i, c, u)| {
            membership_weight(u, fuzzification) * squared(data.row(i), prototypes.column(c))
        })
        .sum::<f64>()
        / n as f64;

    let mut separation = f64::INFINITY;
    for a in 0..k {
        for b in (a + 1)..k {
            separation = separation.min(squared(prototypes.column(a), prototypes.column(b)));
        }
    }

    if separation == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(compactness / separation)
}

/// Pairwise cluster inclusion.
///
/// ```text
/// I[a,b] = Σᵢ min(U[i,a], U[i,b]) / min(Σᵢ U[i,a], Σᵢ U[i,b])
/// ```
///
/// Symmetric with a unit diagonal; pairs involving an empty cluster are 0.
pub fn inclusion(partition: &Partition) -> Array2<f64> {
    let u = partition.memberships();
    let k = partition.n_clusters();
    let sums: Vec<f64> = u.columns().into_iter().map(|c| c.sum()).collect();

    let mut result = Array2::eye(k);
    for a in 0..k {
        for b in (a + 1)..k {
            let denom = sums[a].min(sums[b]);
            let value = if denom > 0.0 {
                u.rows()
                    .into_iter()
                    .map(|row| row[a].min(row[b]))
                    .sum::<f64>()
                    / denom
            } else {
                0.0
            };
            result[[a, b]] = value;
            result[[b, a]] = value;
        }
    }
    result
}

/// Adjusted Rand Index between two labelings.
///
/// 1 for identical clusterings up to relabeling, about 0 for random ones.
/// Mismatched or empty inputs give 0.
///
/// ```rust
/// use meld::quality::adjusted_rand_index;
///
/// let pred = [1, 1, 0, 0];
/// let truth = [0, 0, 1, 1];
/// assert!((adjusted_rand_index(&pred, &truth) - 1.0).abs() < 1e-12);
/// ```
pub fn adjusted_rand_index(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let mut joint: HashMap<(usize, usize), usize> = HashMap::new();
    let mut row_sums: HashMap<usize, usize> = HashMap::new();
    let mut col_sums: HashMap<usize, usize> = HashMap::new();
    for (&p, &t) in pred.iter().zip(truth.iter()) {
        *joint.entry((p, t)).or_insert(0) += 1;
        *row_sums.entry(p).or_insert(0) += 1;
        *col_sums.entry(t).or_insert(0) += 1;
    }

    let sum_comb_ij: f64 = joint.values().map(|&c| comb2(c)).sum();
    let sum_comb_a: f64 = row_sums.values().map(|&a| comb2(a)).sum();
    let sum_comb_b: f64 = col_sums.values().map(|&b| comb2(b)).sum();
    let comb_n = comb2(pred.len());

    let expected = if comb_n > 0.0 {
        sum_comb_a * sum_comb_b / comb_n
    } else {
        0.0
    };
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }
    (sum_comb_ij - expected) / denom
}

fn comb2(n: usize) -> f64 {
    if n < 2 {
        0.0
    } else {
        (n * (n - 1) / 2) as f64
    }
}
