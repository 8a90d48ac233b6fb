//! Sparse structures for the merge engines.
//!
//! Entry presence is explicit: a stored `0.0` is a real zero-cost pair, and
//! an absent entry means the pair is not connected.

use std::collections::BTreeMap;

use ndarray::ArrayView1;

/// Symmetric sparse n×n cost cache with an empty diagonal.
#[derive(Debug, Clone)]
pub(crate) struct SymmetricSparse {
    rows: Vec<BTreeMap<usize, f64>>,
}

impl SymmetricSparse {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            rows: vec![BTreeMap::new(); n],
        }
    }

    /// Set the cost of pair `(i, j)`; `i != j`.
    pub(crate) fn insert(&mut self, i: usize, j: usize, cost: f64) {
        debug_assert_ne!(i, j);
        self.rows[i].insert(j, cost);
        self.rows[j].insert(i, cost);
    }

    /// Cost of pair `(i, j)`, if present.
    #[cfg(test)]
    pub(crate) fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows[i].get(&j).copied()
    }

    /// Slots sharing an entry with `slot`, ascending.
    pub(crate) fn neighbours(&self, slot: usize) -> Vec<usize> {
        self.rows[slot].keys().copied().collect()
    }

    /// Drop every entry of `slot`; returns its former neighbours.
    pub(crate) fn remove_slot(&mut self, slot: usize) -> Vec<usize> {
        let row = std::mem::take(&mut self.rows[slot]);
        for &j in row.keys() {
            self.rows[j].remove(&slot);
        }
        row.into_keys().collect()
    }

    /// Number of stored pairs.
    pub(crate) fn n_pairs(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Cheapest pair `(a, b, cost)` with `a < b`.
    ///
    /// Pairs are scanned row-major; ties keep the first pair seen.
    pub(crate) fn min_pair(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (a, row) in self.rows.iter().enumerate() {
            for (&b, &cost) in row.range(a + 1..) {
                if best.map_or(true, |(_, _, c)| cost < c) {
                    best = Some((a, b, cost));
                }
            }
        }
        best
    }
}

/// Sparse column vector, entries sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SparseColumn {
    entries: Vec<(usize, f64)>,
}

impl SparseColumn {
    /// Unit vector `e_i`.
    pub(crate) fn unit(i: usize) -> Self {
        Self {
            entries: vec![(i, 1.0)],
        }
    }

    /// `fa·self + fb·other`, merging the two index lists.
    pub(crate) fn combine(&self, other: &Self, fa: f64, fb: f64) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + other.entries.len());
        let (mut x, mut y) = (self.entries.iter().peekable(), other.entries.iter().peekable());
        loop {
            let heads = (x.peek().map(|&&e| e), y.peek().map(|&&e| e));
            let next = match heads {
                (Some((i, a)), Some((j, b))) => {
                    if i < j {
                        x.next();
                        (i, fa * a)
                    } else if j < i {
                        y.next();
                        (j, fb * b)
                    } else {
                        x.next();
                        y.next();
                        (i, fa * a + fb * b)
                    }
                }
                (Some((i, a)), None) => {
                    x.next();
                    (i, fa * a)
                }
                (None, Some((j, b))) => {
                    y.next();
                    (j, fb * b)
                }
                (None, None) => break,
            };
            entries.push(next);
        }
        Self { entries }
    }

    /// Dot product with a dense vector.
    pub(crate) fn dot(&self, dense: ArrayView1<'_, f64>) -> f64 {
        self.entries.iter().map(|&(i, v)| v * dense[i]).sum()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
