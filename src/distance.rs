//! Dissimilarity measures between two vectors.
//!
//! Feature-space engines ([`KMeans`](crate::KMeans), [`FuzzyCMeans`](crate::FuzzyCMeans),
//! [`KMedoids`](crate::KMedoids), [`PairwiseNearestNeighbour`](crate::PairwiseNearestNeighbour))
//! compare prototypes and samples through a [`Distance`]. Kernel engines derive
//! squared distances from the Gram matrix instead and ignore it.
//!
//! | Measure | Formula |
//! |---------|---------|
//! | Euclidean | √Σ (aᵢ − bᵢ)² |
//! | SquaredEuclidean | Σ (aᵢ − bᵢ)² |
//! | Manhattan | Σ \|aᵢ − bᵢ\| |
//! | Chebyshev | max \|aᵢ − bᵢ\| |
//! | Canberra | Σ \|aᵢ − bᵢ\| / (\|aᵢ\| + \|bᵢ\|) |
//! | BrayCurtis | Σ \|aᵢ − bᵢ\| / Σ \|aᵢ + bᵢ\| |
//!
//! For PNN, `SquaredEuclidean` turns the merge cost into Ward's criterion,
//! which is reducible and yields a non-decreasing merge sequence.

use core::fmt;
use ndarray::ArrayView1;

/// Signature of a user-supplied dissimilarity.
pub type DistanceFn = fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64;

/// Pluggable dissimilarity between two equally sized vectors.
#[derive(Clone, Copy, Default)]
pub enum Distance {
    /// Plain Euclidean distance.
    #[default]
    Euclidean,
    /// Squared Euclidean distance.
    SquaredEuclidean,
    /// City-block distance.
    Manhattan,
    /// Maximum coordinate difference.
    Chebyshev,
    /// Canberra distance; terms with a zero denominator contribute 0.
    Canberra,
    /// Bray–Curtis dissimilarity; 0 when both vectors sum to zero magnitude.
    BrayCurtis,
    /// Caller-supplied function.
    Custom(DistanceFn),
}

impl Distance {
    /// Dissimilarity between `a` and `b`.
    pub fn apply(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Distance::Euclidean => squared_euclidean(a, b).sqrt(),
            Distance::SquaredEuclidean => squared_euclidean(a, b),
            Distance::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
            Distance::Chebyshev => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            Distance::Canberra => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| {
                    let denom = x.abs() + y.abs();
                    if denom == 0.0 {
                        0.0
                    } else {
                        (x - y).abs() / denom
                    }
                })
                .sum(),
            Distance::BrayCurtis => {
                let (num, denom) = a
                    .iter()
                    .zip(b.iter())
                    .fold((0.0, 0.0), |(num, denom), (x, y)| {
                        (num + (x - y).abs(), denom + (x + y).abs())
                    });
                if denom == 0.0 {
                    0.0
                } else {
                    num / denom
                }
            }
            Distance::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Euclidean => write!(f, "Euclidean"),
            Distance::SquaredEuclidean => write!(f, "SquaredEuclidean"),
            Distance::Manhattan => write!(f, "Manhattan"),
            Distance::Chebyshev => write!(f, "Chebyshev"),
            Distance::Canberra => write!(f, "Canberra"),
            Distance::BrayCurtis => write!(f, "BrayCurtis"),
            Distance::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[inline]
fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_builtin_measures() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];

        assert!((Distance::Euclidean.apply(a.view(), b.view()) - 5.0).abs() < 1e-12);
        assert!((Distance::SquaredEuclidean.apply(a.view(), b.view()) - 25.0).abs() < 1e-12);
        assert!((Distance::Manhattan.apply(a.view(), b.view()) - 7.0).abs() < 1e-12);
        assert!((Distance::Chebyshev.apply(a.view(), b.view()) - 4.0).abs() < 1e-12);
        // Both terms have a zero in `a`, so each contributes 1.
        assert!((Distance::Canberra.apply(a.view(), b.view()) - 2.0).abs() < 1e-12);
        assert!((Distance::BrayCurtis.apply(a.view(), b.view()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators() {
        let z = array![0.0, 0.0];
        assert_eq!(Distance::Canberra.apply(z.view(), z.view()), 0.0);
        assert_eq!(Distance::BrayCurtis.apply(z.view(), z.view()), 0.0);
    }

    #[test]
    fn test_custom_measure() {
        fn first_axis(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
            (a[0] - b[0]).abs()
        }
        let d = Distance::Custom(first_axis);
        let a = array![1.0, 100.0];
        let b = array![4.0, -100.0];
        assert_eq!(d.apply(a.view(), b.view()), 3.0);
        assert_eq!(format!("{d:?}"), "Custom(..)");
    }

    #[test]
    fn test_default_is_euclidean() {
        assert!(matches!(Distance::default(), Distance::Euclidean));
    }
}
