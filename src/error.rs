use thiserror::Error;

/// Result alias for `meld`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input matrix has no rows (or no columns).
    #[error("empty input provided")]
    EmptyInput,

    /// Matrix dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Shape mismatch (string description).
    #[error("shape mismatch: expected {expected}, actual {actual}")]
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Requested cluster count is outside `1..=n`.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter or input value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// No mergeable pair is left before the requested cluster count was reached.
    ///
    /// Happens when a sparse kernel splits the samples into more than `k`
    /// disconnected groups.
    #[error("kernel graph is disconnected: {remaining} clusters left, no mergeable pair")]
    DisconnectedGraph {
        /// Clusters still active when the merge loop ran dry.
        remaining: usize,
    },

    /// A merge history chain does not terminate at a root.
    #[error("malformed merge history at slot {slot}")]
    MalformedMergeHistory {
        /// Slot whose chain could not be resolved.
        slot: usize,
    },

    /// The run was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("cancelled after {iterations} iterations")]
    Cancelled {
        /// Completed outer-loop iterations (or merge steps).
        iterations: usize,
    },
}
