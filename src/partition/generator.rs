//! Initial partition strategies for the alternating-optimisation engines.

use rand::Rng;

use super::Partition;

/// Strategy that fills a freshly sized [`Partition`] before optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionGenerator {
    /// Uniform random memberships, each row normalised to sum to 1.
    FuzzyRandom,
    /// One uniformly chosen cluster per row.
    HardRandom,
}

impl PartitionGenerator {
    /// Fill every row of `partition` using `rng`.
    ///
    /// A partition without columns has nothing to fill and is left untouched.
    pub fn generate<R: Rng>(&self, partition: &mut Partition, rng: &mut R) {
        let k = partition.n_clusters();
        if k == 0 {
            return;
        }
        let mut u = partition.memberships_mut();

        match self {
            PartitionGenerator::FuzzyRandom => {
                for mut row in u.rows_mut() {
                    let mut sum = 0.0;
                    for x in row.iter_mut() {
                        *x = rng.random::<f64>();
                        sum += *x;
                    }
                    if sum > 0.0 {
                        row.mapv_inplace(|x| x / sum);
                    } else {
                        // All draws were exactly 0.0.
                        row.fill(1.0 / k as f64);
                    }
                }
            }
            PartitionGenerator::HardRandom => {
                u.fill(0.0);
                for mut row in u.rows_mut() {
                    row[rng.random_range(0..k)] = 1.0;
                }
            }
        }
    }
}
