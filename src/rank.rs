//! Dense ranking of the distinct weight values seen at construction.
//!
//! The sharded index addresses its shards by weight *rank*, not by raw
//! weight: the distinct weights present in the initial multiset are sorted
//! ascending and numbered `0..m-1`. Bound queries then reduce to a prefix
//! of ranks via [`floor_rank`](FrequencyRankTable::floor_rank).

use std::collections::BTreeMap;

/// Maps each distinct weight present at construction to its dense rank.
///
/// Built once; never mutated afterwards. Weights not present at
/// construction have no rank; [`rank`](Self::rank) is only meaningful
/// during the one-time build, while [`floor_rank`](Self::floor_rank)
/// accepts arbitrary bounds.
#[derive(Debug, Clone)]
pub(crate) struct FrequencyRankTable {
    ranks: BTreeMap<u64, usize>,
}

impl FrequencyRankTable {
    /// Build the table from the weights of the initial multiset.
    ///
    /// Duplicate weights collapse to a single rank.
    pub(crate) fn from_weights<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut ranks: BTreeMap<u64, usize> = weights.into_iter().map(|w| (w, 0)).collect();
        for (idx, rank) in ranks.values_mut().enumerate() {
            *rank = idx;
        }
        Self { ranks }
    }

    /// Number of distinct weights (`m`).
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Rank of a weight present at construction, or `None` for unseen weights.
    #[inline]
    pub(crate) fn rank(&self, weight: u64) -> Option<usize> {
        self.ranks.get(&weight).copied()
    }

    /// Rank of the largest present weight `<= bound`.
    ///
    /// Returns `None` when the bound is smaller than every present weight.
    #[inline]
    pub(crate) fn floor_rank(&self, bound: u64) -> Option<usize> {
        self.ranks.range(..=bound).next_back().map(|(_, &rank)| rank)
    }
}
