//! Weight-rank-sharded metric index with destructive queries.
//!
//! [`NearCullIndex`] owns an array of metric tree shards addressed by
//! binary-indexed (Fenwick) positions over weight *ranks*. The distinct
//! weights of the initial multiset are ranked `0..m-1` ascending; a key of
//! rank `r` is physically copied into every shard on the standard Fenwick
//! update chain starting at `r + 1`, i.e. `O(log m)` copies per key.
//!
//! A bound query is answered by the complementary prefix decomposition:
//! the `O(log m)` shards reached by repeatedly clearing the lowest set bit
//! of the start position together cover exactly the keys whose rank falls
//! in the prefix, and intersect each such key's insertion chain in exactly
//! one shard. Each live key is therefore found through exactly one
//! physical copy per decomposition pass.
//!
//! # Query anatomy
//!
//! [`remove_near`](NearCullIndex::remove_near) runs two phases and
//! concatenates their results:
//!
//! - **Phase A** (finite bound only): radius-0 searches down the
//!   decomposition of the full range `[1, m]`, removing the query key's
//!   own copy regardless of its weight.
//! - **Phase B**: radius-`k` searches down the decomposition of the
//!   prefix covering every rank whose weight is within the bound.
//!
//! When the query key's own weight is within the bound, the two
//! decompositions may intersect its insertion chain in *different* shards,
//! in which case the key is emitted once per phase. This duplicate
//! emission is deliberate, kept for parity with the emit rule (a node
//! emits whenever its local copy is still marked live), and covered by an
//! explicit test.
//!
//! # Examples
//!
//! ```
//! use nearcull::NearCullIndex;
//!
//! let mut index = NearCullIndex::new(
//!     vec![
//!         (b"AAAA".to_vec(), 10),
//!         (b"AAAT".to_vec(), 5),
//!         (b"GGGG".to_vec(), 1),
//!     ],
//!     4,
//! )
//! .unwrap();
//!
//! // Absorb everything within distance 1 of AAAA weighing at most 10.
//! let removed = index.remove_near(&b"AAAA".to_vec(), 1, 10);
//! assert_eq!(removed.len(), 2);
//! assert!(!index.contains(&b"AAAA".to_vec()));
//! assert!(index.contains(&b"GGGG".to_vec()));
//! ```

use std::collections::HashSet;
use std::hash::{BuildHasherDefault, Hash};

use xxhash_rust::xxh3::Xxh3;

use crate::error::{NearCullError, Result};
use crate::metric::{Metric, SymbolHamming};
use crate::rank::FrequencyRankTable;
use crate::tree::{SearchContext, TraversalStats, TreeNode};

#[cfg(feature = "metrics")]
use crate::metrics::QueryMetrics;

/// Authoritative membership set of keys not yet removed.
///
/// Hashed with xxh3; owns key copies independent of the shard trees.
pub(crate) type LiveSet<K> = HashSet<K, BuildHasherDefault<Xxh3>>;

/// Weight restriction of a destructive query.
///
/// `u64` converts into `Finite`, so callers with a concrete bound can pass
/// the weight directly.
///
/// # Examples
///
/// ```
/// use nearcull::WeightBound;
///
/// assert_eq!(WeightBound::from(7), WeightBound::Finite(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightBound {
    /// Only keys whose weight is `<=` the value match (the query key
    /// itself is exempt and always removed).
    Finite(u64),
    /// No weight restriction; the unconditional self-removal phase is
    /// skipped.
    Unbounded,
}

impl From<u64> for WeightBound {
    fn from(weight: u64) -> Self {
        Self::Finite(weight)
    }
}

/// Shard depth statistics.
///
/// Computed by a full read-only traversal of every shard tree, counting
/// physical nodes, including stale copies of already-removed keys. This
/// is a structural health metric, not a live-content metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStats {
    /// Deepest leaf across all shards (1 for a lone root).
    pub max_depth: usize,
    /// Mean leaf depth across all shards.
    pub average_depth: f64,
}

/// In-memory index answering weight-bounded near-duplicate removal queries.
///
/// Built once from a multiset of distinct fixed-length keys with positive
/// weights, then mutated only through [`remove_near`](Self::remove_near).
/// Generic over the key type and the [`Metric`] capability;
/// [`SymbolHamming`] is the default metric for byte-sequence keys.
///
/// Single-threaded by design: `remove_near` takes `&mut self` and mutates
/// node flags and the live set with no internal locking.
#[derive(Debug)]
pub struct NearCullIndex<K, M = SymbolHamming> {
    /// Shard roots addressed `1..=m`; index 0 unused.
    shards: Vec<Option<Box<TreeNode<K>>>>,
    ranks: FrequencyRankTable,
    live: LiveSet<K>,
    metric: M,
    #[cfg(feature = "metrics")]
    metrics: QueryMetrics,
}

#[inline(always)]
fn lowbit(idx: usize) -> usize {
    idx & idx.wrapping_neg()
}

impl<K> NearCullIndex<K, SymbolHamming>
where
    K: Eq + Hash + Clone + AsRef<[u8]>,
{
    /// Build an index over byte-sequence keys of `sequence_length` symbols
    /// using the [`SymbolHamming`] metric.
    ///
    /// # Errors
    ///
    /// See [`with_metric`](Self::with_metric).
    pub fn new<I>(entries: I, sequence_length: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
    {
        Self::with_metric(entries, SymbolHamming::new(sequence_length))
    }
}

impl<K, M> NearCullIndex<K, M>
where
    K: Eq + Hash + Clone,
    M: Metric<K>,
{
    /// Build an index from `entries` with a caller-provided metric.
    ///
    /// Validates every entry before any structure is built: keys must be
    /// pairwise distinct and of the metric's sequence length, weights must
    /// be positive, and the multiset must be non-empty.
    ///
    /// # Errors
    ///
    /// [`NearCullError::EmptyInput`], [`NearCullError::DuplicateKey`],
    /// [`NearCullError::KeyLengthMismatch`], or
    /// [`NearCullError::InvalidWeight`] when a precondition fails.
    pub fn with_metric<I>(entries: I, metric: M) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
    {
        let entries: Vec<(K, u64)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(NearCullError::EmptyInput);
        }

        let mut live = LiveSet::with_capacity_and_hasher(entries.len(), Default::default());
        for (key, weight) in &entries {
            if !metric.key_fits(key) {
                return Err(NearCullError::key_length_mismatch(
                    metric.sequence_length(),
                    metric.key_length(key),
                ));
            }
            if *weight == 0 {
                return Err(NearCullError::invalid_weight(*weight));
            }
            if !live.insert(key.clone()) {
                return Err(NearCullError::DuplicateKey);
            }
        }

        let ranks = FrequencyRankTable::from_weights(entries.iter().map(|(_, w)| *w));
        let shard_count = ranks.len();

        let mut index = Self {
            shards: (0..=shard_count).map(|_| None).collect(),
            ranks,
            live,
            metric,
            #[cfg(feature = "metrics")]
            metrics: QueryMetrics::default(),
        };
        for (key, weight) in entries {
            index.insert_key(key, weight)?;
        }
        Ok(index)
    }

    /// Place a physical copy of `key` into every shard on its Fenwick
    /// update chain.
    fn insert_key(&mut self, key: K, weight: u64) -> Result<()> {
        // The table was built from these same entries, so the lookup
        // cannot miss.
        let rank = self
            .ranks
            .rank(weight)
            .ok_or_else(|| NearCullError::internal_error("weight missing from rank table"))?;

        let shard_count = self.shard_count();
        let mut idx = rank + 1;
        while idx <= shard_count {
            match self.shards[idx] {
                Some(ref mut root) => root.insert_below(key.clone(), &self.metric),
                None => self.shards[idx] = Some(Box::new(TreeNode::new(key.clone()))),
            }
            idx += lowbit(idx);
        }
        Ok(())
    }

    /// Find and logically remove every live key within distance `radius`
    /// of `query` whose weight is within `bound`.
    ///
    /// Returns the removed keys in discovery order. Under a finite bound
    /// the query key's own stored copy is removed unconditionally, even
    /// when its weight exceeds the bound, and may appear twice in the
    /// result when both phases discover it through different shards (see
    /// the [module docs](self)).
    ///
    /// Querying a key that is no longer live (or was never inserted) is
    /// not an error; the traversals simply find fewer or no matches.
    pub fn remove_near<B>(&mut self, query: &K, radius: usize, bound: B) -> Vec<K>
    where
        B: Into<WeightBound>,
    {
        let bound = bound.into();
        let mut removed = Vec::new();
        let mut stats = TraversalStats::default();

        // Phase A: unconditional self-removal down the full-range
        // decomposition, radius 0.
        if let WeightBound::Finite(_) = bound {
            self.visit_decomposition(self.shard_count(), query, 0, &mut removed, &mut stats);
        }

        // Phase B: bounded range removal down the prefix decomposition
        // covering every rank within the bound.
        let floor_rank = match bound {
            WeightBound::Finite(max_weight) => self.ranks.floor_rank(max_weight),
            WeightBound::Unbounded => Some(self.ranks.len() - 1),
        };
        if let Some(floor_rank) = floor_rank {
            self.visit_decomposition(floor_rank + 1, query, radius, &mut removed, &mut stats);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_query(&stats, removed.len());
        #[cfg(not(feature = "metrics"))]
        let _ = stats;

        removed
    }

    /// Run a radius search over every shard of the prefix decomposition
    /// starting at `start`.
    fn visit_decomposition(
        &mut self,
        start: usize,
        query: &K,
        radius: usize,
        removed: &mut Vec<K>,
        stats: &mut TraversalStats,
    ) {
        let mut idx = start;
        while idx > 0 {
            if let Some(root) = self.shards[idx].as_deref_mut() {
                if root.subtree_exists {
                    let mut ctx = SearchContext {
                        metric: &self.metric,
                        live: &mut self.live,
                        removed,
                        stats,
                    };
                    root.remove_within(query, radius, &mut ctx);
                } else {
                    stats.cache_pruned += 1;
                }
            }
            idx -= lowbit(idx);
        }
    }

    /// Whether `key` is still live.
    ///
    /// O(1) membership check against the live set; never fails and
    /// returns `false` for removed and never-inserted keys alike.
    #[must_use]
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.live.contains(key)
    }

    /// Structural depth statistics aggregated over every shard tree.
    #[must_use]
    pub fn diagnostics(&self) -> DepthStats {
        let mut leaves = 0u64;
        let mut max_depth = 0u64;
        let mut depth_sum = 0u64;

        for root in self.shards.iter().flatten() {
            let acc = root.depth_stats();
            leaves += acc.leaves;
            max_depth = max_depth.max(acc.max_depth);
            depth_sum += acc.depth_sum;
        }

        DepthStats {
            max_depth: max_depth as usize,
            average_depth: if leaves == 0 {
                0.0
            } else {
                depth_sum as f64 / leaves as f64
            },
        }
    }

    /// Number of shards (`m`, the number of distinct weights at
    /// construction).
    #[must_use]
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len() - 1
    }

    /// Number of keys still live.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether every key has been removed.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The metric this index prunes with.
    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The fixed key length `L`.
    #[must_use]
    #[inline]
    pub fn sequence_length(&self) -> usize {
        self.metric.sequence_length()
    }

    /// Query counters accumulated since construction.
    #[cfg(feature = "metrics")]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }
}
