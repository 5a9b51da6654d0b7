//! nearcull: weight-bounded near-duplicate removal for fixed-length keys.
//!
//! nearcull indexes a fixed multiset of fixed-length symbol sequences
//! ("keys"), each tagged with a positive integer weight, and answers one
//! compound destructive query: *find every live key within metric distance
//! `k` of a query key whose weight does not exceed a bound, and atomically
//! remove every match*. The index is built once and then consumed by
//! repeated queries. The typical caller is an iterative deduplication
//! pass that visits keys in descending weight order, each time absorbing
//! all lower-or-equal-weight near-duplicates into the current key.
//!
//! # Quick Start
//!
//! ```
//! use nearcull::NearCullIndex;
//!
//! // Keys are length-4 byte sequences; weights are positive integers.
//! let mut index = NearCullIndex::new(
//!     vec![
//!         (b"ACGT".to_vec(), 10),
//!         (b"ACGA".to_vec(), 5),
//!         (b"TTTT".to_vec(), 1),
//!     ],
//!     4,
//! )
//! .unwrap();
//!
//! // Remove ACGT and everything within distance 1 weighing at most 10.
//! let removed = index.remove_near(&b"ACGT".to_vec(), 1, 10);
//! assert_eq!(removed.len(), 2);
//!
//! assert!(!index.contains(&b"ACGT".to_vec()));
//! assert!(!index.contains(&b"ACGA".to_vec()));
//! assert!(index.contains(&b"TTTT".to_vec()));
//! ```
//!
//! # Architecture
//!
//! ```text
//! NearCullIndex
//!   ├── FrequencyRankTable     distinct weights -> dense ascending ranks
//!   ├── shards[1..=m]          one BK-style metric tree per Fenwick position
//!   │     └── TreeNode         key copy + exists + subtreeExists cache
//!   └── LiveSet                authoritative membership (xxh3-hashed)
//! ```
//!
//! Each key is physically copied into the `O(log m)` shards on its weight
//! rank's Fenwick update chain; a bound query visits the complementary
//! `O(log m)`-shard prefix decomposition, which meets every eligible key's
//! chain in exactly one shard. Within a shard, radius search prunes by the
//! triangle inequality and by a lazily tightened per-node "subtree still
//! has live members" cache; removal is purely logical (flags flip
//! true→false once, nothing is deallocated or rebalanced).
//!
//! # What nearcull is not
//!
//! - Not persistent: the structure has no serialized form.
//! - Not concurrent: `remove_near` takes `&mut self`; callers serialize.
//! - Not a general metric store: no insertion after construction, no
//!   unseen weights, no duplicate keys.
//!
//! # Optional Features
//!
//! - `metrics`: query counters and Prometheus text export
//! - `proptest`: property-based tests (dev only)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Fluent builder for the index
pub mod builder;

/// Error types and result alias
pub mod error;

/// The sharded index and its query types
pub mod index;

/// Distance metric abstraction and the default Hamming metric
pub mod metric;

mod rank;
mod tree;

/// Query counters and observability (requires the `metrics` feature)
#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
pub mod metrics;

// Re-export the working set at the crate root.
pub use builder::NearCullIndexBuilder;
pub use error::{NearCullError, Result};
pub use index::{DepthStats, NearCullIndex, WeightBound};
pub use metric::{Metric, SymbolHamming};

#[cfg(feature = "metrics")]
pub use metrics::{MetricsSnapshot, QueryMetrics};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use nearcull::prelude::*;
///
/// let mut index = NearCullIndex::new(vec![(b"AAAA".to_vec(), 1)], 4).unwrap();
/// assert_eq!(index.remove_near(&b"AAAA".to_vec(), 0, WeightBound::Unbounded).len(), 1);
/// ```
pub mod prelude {
    pub use crate::builder::NearCullIndexBuilder;
    pub use crate::error::{NearCullError, Result};
    pub use crate::index::{DepthStats, NearCullIndex, WeightBound};
    pub use crate::metric::{Metric, SymbolHamming};

    #[cfg(feature = "metrics")]
    pub use crate::metrics::{MetricsSnapshot, QueryMetrics};
}
