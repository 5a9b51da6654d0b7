//! Query counters and observability (requires the `metrics` feature).
//!
//! Counters are accumulated across every [`remove_near`] call on an index
//! and answer the questions that matter for this structure's health: how
//! much of the tree do searches actually touch, and how much work do the
//! two pruning rules (the subtree-emptiness cache and the
//! triangle-inequality label bound) save.
//!
//! Recording uses relaxed atomics; the index itself is single-threaded,
//! so the counters are exact.
//!
//! [`remove_near`]: crate::NearCullIndex::remove_near
//!
//! # Examples
//!
//! ```
//! use nearcull::NearCullIndex;
//!
//! let mut index = NearCullIndex::new(
//!     vec![(b"AAAA".to_vec(), 2), (b"AAAT".to_vec(), 1)],
//!     4,
//! )
//! .unwrap();
//! index.remove_near(&b"AAAA".to_vec(), 1, 2);
//!
//! let snapshot = index.metrics().snapshot();
//! assert_eq!(snapshot.queries, 1);
//! assert_eq!(snapshot.keys_removed, 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tree::TraversalStats;

/// Accumulated counters for one index.
#[derive(Debug, Default)]
pub struct QueryMetrics {
    queries: AtomicU64,
    nodes_visited: AtomicU64,
    cache_pruned: AtomicU64,
    bound_pruned: AtomicU64,
    keys_removed: AtomicU64,
}

/// Point-in-time copy of [`QueryMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Destructive queries executed.
    pub queries: u64,
    /// Tree nodes whose key was compared against a query.
    pub nodes_visited: u64,
    /// Subtrees skipped because they were known empty.
    pub cache_pruned: u64,
    /// Subtrees skipped by the triangle-inequality label bound.
    pub bound_pruned: u64,
    /// Keys emitted across all queries (duplicate emissions included).
    pub keys_removed: u64,
}

impl QueryMetrics {
    pub(crate) fn record_query(&self, stats: &TraversalStats, removed: usize) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.nodes_visited
            .fetch_add(stats.nodes_visited as u64, Ordering::Relaxed);
        self.cache_pruned
            .fetch_add(stats.cache_pruned as u64, Ordering::Relaxed);
        self.bound_pruned
            .fetch_add(stats.bound_pruned as u64, Ordering::Relaxed);
        self.keys_removed.fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            nodes_visited: self.nodes_visited.load(Ordering::Relaxed),
            cache_pruned: self.cache_pruned.load(Ordering::Relaxed),
            bound_pruned: self.bound_pruned.load(Ordering::Relaxed),
            keys_removed: self.keys_removed.load(Ordering::Relaxed),
        }
    }

    /// Render the counters in Prometheus text exposition format.
    #[must_use]
    pub fn export_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP nearcull_queries Destructive queries executed\n\
             # TYPE nearcull_queries counter\n\
             nearcull_queries {}\n\
             # HELP nearcull_nodes_visited Tree nodes compared against a query\n\
             # TYPE nearcull_nodes_visited counter\n\
             nearcull_nodes_visited {}\n\
             # HELP nearcull_cache_pruned Subtrees skipped as known empty\n\
             # TYPE nearcull_cache_pruned counter\n\
             nearcull_cache_pruned {}\n\
             # HELP nearcull_bound_pruned Subtrees skipped by the label bound\n\
             # TYPE nearcull_bound_pruned counter\n\
             nearcull_bound_pruned {}\n\
             # HELP nearcull_keys_removed Keys emitted across all queries\n\
             # TYPE nearcull_keys_removed counter\n\
             nearcull_keys_removed {}\n",
            snapshot.queries,
            snapshot.nodes_visited,
            snapshot.cache_pruned,
            snapshot.bound_pruned,
            snapshot.keys_removed,
        )
    }
}
