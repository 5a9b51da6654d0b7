//! Error types for nearcull operations.
//!
//! Construction is the only fallible surface of the crate: once an index is
//! built, queries (`remove_near`, `contains`, `diagnostics`) cannot fail.
//! All construction errors are reported before any state is built, so a
//! failed build leaves nothing behind.
//!
//! # Error Propagation
//!
//! ```
//! use nearcull::{NearCullIndex, Result};
//!
//! fn build(entries: Vec<(Vec<u8>, u64)>) -> Result<NearCullIndex<Vec<u8>>> {
//!     let index = NearCullIndex::new(entries, 4)?;
//!     Ok(index)
//! }
//! # assert!(build(vec![(b"ACGT".to_vec(), 3)]).is_ok());
//! # assert!(build(vec![]).is_err());
//! ```

use std::fmt;

/// Result type alias for nearcull operations.
///
/// All fallible operations return [`Result<T>`] where the error type is
/// [`NearCullError`].
pub type Result<T> = std::result::Result<T, NearCullError>;

/// Errors that can occur while building a [`NearCullIndex`](crate::NearCullIndex).
///
/// Each variant carries enough context to diagnose the offending input.
/// `Clone` + `PartialEq` enable testing and error comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NearCullError {
    /// The initial multiset was empty.
    ///
    /// The index is built once from the full multiset; an empty multiset
    /// has no distinct weights to shard over and nothing to query.
    EmptyInput,

    /// The initial multiset contained the same key more than once.
    ///
    /// Keys must be pairwise distinct: the metric tree insertion walk
    /// assumes no two keys ever collide at distance zero.
    DuplicateKey,

    /// A key's length did not match the configured sequence length.
    KeyLengthMismatch {
        /// Sequence length the metric was configured with.
        expected: usize,
        /// Length of the offending key.
        actual: usize,
    },

    /// A weight was not a positive integer.
    InvalidWeight {
        /// The offending weight value.
        weight: u64,
    },

    /// Invalid parameters provided to a builder.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Internal invariant violated.
    ///
    /// This should never occur in correct usage. If it does, it indicates
    /// a bug in nearcull itself.
    InternalError {
        /// Description of the invariant that was violated.
        message: String,
    },
}

impl fmt::Display for NearCullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => {
                write!(f, "Initial multiset is empty. At least one keyed entry is required.")
            }
            Self::DuplicateKey => {
                write!(f, "Initial multiset contains a duplicate key. Keys must be pairwise distinct.")
            }
            Self::KeyLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Key length {} does not match configured sequence length {}.",
                    actual, expected
                )
            }
            Self::InvalidWeight { weight } => {
                write!(f, "Invalid weight: {}. Weights must be positive integers.", weight)
            }
            Self::InvalidParameters { message } => {
                write!(f, "Invalid parameters: {}.", message)
            }
            Self::InternalError { message } => {
                write!(f, "Internal error (this is a bug in nearcull): {}.", message)
            }
        }
    }
}

impl std::error::Error for NearCullError {}

impl NearCullError {
    /// Create a `KeyLengthMismatch` error.
    #[must_use]
    pub fn key_length_mismatch(expected: usize, actual: usize) -> Self {
        Self::KeyLengthMismatch { expected, actual }
    }

    /// Create an `InvalidWeight` error.
    #[must_use]
    pub fn invalid_weight(weight: u64) -> Self {
        Self::InvalidWeight { weight }
    }

    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `InternalError`.
    ///
    /// This should only be used for conditions that indicate bugs in nearcull.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
