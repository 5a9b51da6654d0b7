//! Metric tree shards: BK-style trees with lazy deletion.
//!
//! Each shard is a Burkhard-Keller tree over the physical key copies
//! assigned to it. A parent-child edge is labeled with the distance between
//! the child's key and the parent's key at the time the child was created;
//! because every key in a label-`i` subtree sits at exactly distance `i`
//! from the parent, the triangle inequality lets a radius-`k` search visit
//! only labels inside `[dist - k, dist + k]` around the query's distance to
//! the parent.
//!
//! Removal is purely logical. Every node carries two flags:
//!
//! - `exists`: is this stored copy still live,
//! - `subtree_exists`: does this node's subtree (inclusive) still contain
//!   any live copy.
//!
//! `subtree_exists` is a conservative cache: it may be stale-true, but once
//! false it is durable: the whole subtree is known empty and later
//! traversals skip it outright. The cache is tightened only along paths a
//! search actually walks; children a search did not descend into keep
//! their previous cached value. Both flags move true→false exactly once.

use std::hash::Hash;

use crate::index::LiveSet;
use crate::metric::Metric;

/// Per-call counters for one radius search.
///
/// Cheap enough to maintain unconditionally; surfaced through the
/// `metrics` feature and through tests that assert pruning behavior.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TraversalStats {
    /// Nodes whose key was compared against the query.
    pub nodes_visited: usize,
    /// Children skipped because their subtree is known empty.
    pub cache_pruned: usize,
    /// Children skipped by the triangle-inequality label bound.
    pub bound_pruned: usize,
}

/// Borrowed state threaded through one `remove_within` traversal.
pub(crate) struct SearchContext<'a, K, M> {
    /// Distance capability shared by every shard.
    pub metric: &'a M,
    /// Authoritative membership set; removals are mirrored here.
    pub live: &'a mut LiveSet<K>,
    /// Keys removed so far, in discovery order.
    pub removed: &'a mut Vec<K>,
    /// Counters for this call.
    pub stats: &'a mut TraversalStats,
}

/// One node of a metric tree shard.
///
/// Owns its key copy and, via the label-indexed child table, its entire
/// subtree. The child table is allocated lazily on the first insertion
/// below the node and has one slot per distance label in `[0, L]`.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<K> {
    pub(crate) key: K,
    pub(crate) exists: bool,
    pub(crate) subtree_exists: bool,
    children: Vec<Option<Box<TreeNode<K>>>>,
}

/// Leaf count, max depth, and total leaf depth of one shard tree.
///
/// Counts physical nodes regardless of `exists` flags.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DepthAccumulator {
    pub leaves: u64,
    pub max_depth: u64,
    pub depth_sum: u64,
}

impl<K> TreeNode<K> {
    /// Create a live leaf node owning `key`.
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            exists: true,
            subtree_exists: true,
            children: Vec::new(),
        }
    }

    /// Insert `key` into the subtree rooted at this node.
    ///
    /// Walks down by distance label until a free slot is found and creates
    /// a leaf there. Assumes `key` is distinct from every key already in
    /// the tree; duplicates would collide at label 0.
    pub(crate) fn insert_below<M>(&mut self, key: K, metric: &M)
    where
        M: Metric<K>,
    {
        let labels = metric.sequence_length() + 1;
        let mut cur = self;
        loop {
            let dist = metric.distance(&key, &cur.key);
            debug_assert!(dist > 0, "duplicate key inserted into shard tree");
            debug_assert!(dist < labels, "metric reported distance beyond sequence length");

            if cur.children.is_empty() {
                cur.children.resize_with(labels, || None);
            }
            match &mut cur.children[dist] {
                slot @ None => {
                    *slot = Some(Box::new(TreeNode::new(key)));
                    return;
                }
                Some(child) => cur = child.as_mut(),
            }
        }
    }

    /// Radius search that emits and logically removes every live match.
    ///
    /// The single read/mutate primitive of a shard. Visits this node, then
    /// every eligible child whose label falls within
    /// `[dist - radius, dist + radius]`, where `dist` is the query's
    /// distance to this node's key. A child whose `subtree_exists` flag is
    /// already false is skipped regardless of the bound.
    ///
    /// After the children are visited (or skipped), this node's
    /// `subtree_exists` is recomputed as the OR of its own `exists` and
    /// every child's current cached flag, freshly tightened for children
    /// that were descended into, unchanged for the rest. This is what makes
    /// emptied subtrees permanently invisible to later traversals.
    pub(crate) fn remove_within<M>(
        &mut self,
        query: &K,
        radius: usize,
        ctx: &mut SearchContext<'_, K, M>,
    ) where
        K: Eq + Hash + Clone,
        M: Metric<K>,
    {
        ctx.stats.nodes_visited += 1;
        let dist = ctx.metric.distance(query, &self.key);

        if dist <= radius && self.exists {
            self.exists = false;
            ctx.live.remove(&self.key);
            ctx.removed.push(self.key.clone());
        }

        let lo = dist.saturating_sub(radius);
        let hi = dist + radius;
        let mut subtree_exists = self.exists;

        for (label, slot) in self.children.iter_mut().enumerate() {
            let Some(child) = slot else { continue };
            if !child.subtree_exists {
                ctx.stats.cache_pruned += 1;
                continue;
            }
            if label >= lo && label <= hi {
                child.remove_within(query, radius, ctx);
            } else {
                ctx.stats.bound_pruned += 1;
            }
            subtree_exists |= child.subtree_exists;
        }

        self.subtree_exists = subtree_exists;
    }

    /// Structural depth statistics of the subtree rooted here.
    ///
    /// A lone node counts as one leaf at depth 1. Stale copies of removed
    /// keys are counted like any other node.
    pub(crate) fn depth_stats(&self) -> DepthAccumulator {
        let mut acc = DepthAccumulator::default();
        let mut is_leaf = true;

        for child in self.children.iter().flatten() {
            let sub = child.depth_stats();
            acc.leaves += sub.leaves;
            acc.max_depth = acc.max_depth.max(sub.max_depth + 1);
            acc.depth_sum += sub.depth_sum + sub.leaves;
            is_leaf = false;
        }

        if is_leaf {
            acc.leaves = 1;
            acc.max_depth = 1;
            acc.depth_sum = 1;
        }
        acc
    }

    #[cfg(test)]
    fn child(&self, label: usize) -> Option<&TreeNode<K>> {
        self.children.get(label).and_then(|slot| slot.as_deref())
    }
}
