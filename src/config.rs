//! Engine configuration.
//!
//! Every engine takes a [`ClusterConfig`] at construction and never mutates it.
//! The seed is mandatory: runs are reproducible by construction and no engine
//! falls back to an ambient random source.
//!
//! ```rust
//! use meld::{ClusterConfig, Distance, PartitionGenerator};
//!
//! let config = ClusterConfig::new(42)
//!     .with_max_iter(200)
//!     .with_epsilon(1e-6)
//!     .with_distance(Distance::SquaredEuclidean)
//!     .with_generator(PartitionGenerator::FuzzyRandom);
//! assert_eq!(config.max_iter(), 200);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::distance::Distance;
use crate::error::{Error, Result};
use crate::partition::PartitionGenerator;

/// Default fuzzification exponent for fuzzy engines.
pub const DEFAULT_FUZZIFICATION: f64 = 2.0;
/// Default convergence tolerance for fuzzy engines.
pub const DEFAULT_EPSILON: f64 = 1e-7;
/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Cooperative cancellation flag, checked at every outer-loop boundary.
///
/// Clones share the flag, so one clone can be handed to another thread and
/// cancelled from there while the engine runs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Immutable configuration shared by all engines.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    seed: u64,
    max_iter: usize,
    epsilon: f64,
    fuzzification: f64,
    distance: Distance,
    generator: Option<PartitionGenerator>,
    cancel: Option<CancelToken>,
}

impl ClusterConfig {
    /// Create a configuration with defaults and the given random seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_iter: DEFAULT_MAX_ITER,
            epsilon: DEFAULT_EPSILON,
            fuzzification: DEFAULT_FUZZIFICATION,
            distance: Distance::default(),
            generator: None,
            cancel: None,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the maximum membership change.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the fuzzification exponent (fuzzy engines only).
    pub fn with_fuzzification(mut self, fuzzification: f64) -> Self {
        self.fuzzification = fuzzification;
        self
    }

    /// Set the dissimilarity measure (feature-space engines only).
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// Override the engine's default initial partition strategy.
    pub fn with_generator(mut self, generator: PartitionGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Random seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Iteration cap.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Convergence tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Fuzzification exponent.
    pub fn fuzzification(&self) -> f64 {
        self.fuzzification
    }

    /// Dissimilarity measure.
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Generator override, if any.
    pub fn generator(&self) -> Option<PartitionGenerator> {
        self.generator
    }

    /// Generator to use given an engine's default.
    pub(crate) fn generator_or(&self, default: PartitionGenerator) -> PartitionGenerator {
        self.generator.unwrap_or(default)
    }

    /// Check the parameters every engine relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be finite and > 0",
            });
        }
        if !self.fuzzification.is_finite() || self.fuzzification < 1.0 {
            return Err(Error::InvalidParameter {
                name: "fuzzification",
                message: "must be finite and >= 1",
            });
        }
        Ok(())
    }

    /// Fuzzy engines divide by `m - 1`.
    pub(crate) fn validate_fuzzy(&self) -> Result<()> {
        self.validate()?;
        if self.fuzzification <= 1.0 {
            return Err(Error::InvalidParameter {
                name: "fuzzification",
                message: "must be > 1 for fuzzy clustering",
            });
        }
        Ok(())
    }

    /// Fail with [`Error::Cancelled`] if the token was triggered.
    pub(crate) fn check_cancelled(&self, iterations: usize) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled { iterations }),
            _ => Ok(()),
        }
    }
}
