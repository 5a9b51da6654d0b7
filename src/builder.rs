//! Fluent builder for [`NearCullIndex`].
//!
//! Construction takes the full multiset up front; the builder collects
//! entries incrementally and defers validation to
//! [`build`](NearCullIndexBuilder::build), which reports the same errors
//! as the direct constructors.
//!
//! # Examples
//!
//! ```
//! use nearcull::builder::NearCullIndexBuilder;
//! use nearcull::metric::SymbolHamming;
//!
//! let index = NearCullIndexBuilder::new()
//!     .entry(b"ACGT".to_vec(), 12)
//!     .entry(b"ACGA".to_vec(), 4)
//!     .metric(SymbolHamming::new(4))
//!     .build()
//!     .unwrap();
//! assert_eq!(index.len(), 2);
//! ```

use std::hash::Hash;

use crate::error::{NearCullError, Result};
use crate::index::NearCullIndex;
use crate::metric::Metric;

/// Builder for [`NearCullIndex`].
///
/// The metric is required; entries may be added one at a time or in bulk.
#[derive(Debug, Clone)]
pub struct NearCullIndexBuilder<K, M> {
    entries: Vec<(K, u64)>,
    metric: Option<M>,
}

impl<K, M> NearCullIndexBuilder<K, M>
where
    K: Eq + Hash + Clone,
    M: Metric<K>,
{
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            metric: None,
        }
    }

    /// Add a single keyed entry.
    #[must_use]
    pub fn entry(mut self, key: K, weight: u64) -> Self {
        self.entries.push((key, weight));
        self
    }

    /// Add every entry of an iterator.
    #[must_use]
    pub fn entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
    {
        self.entries.extend(entries);
        self
    }

    /// Set the distance metric.
    #[must_use]
    pub fn metric(mut self, metric: M) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Build the index.
    ///
    /// # Errors
    ///
    /// [`NearCullError::InvalidParameters`] when no metric was set, plus
    /// every construction error of
    /// [`NearCullIndex::with_metric`](NearCullIndex::with_metric).
    pub fn build(self) -> Result<NearCullIndex<K, M>> {
        let metric = self
            .metric
            .ok_or_else(|| NearCullError::invalid_parameters("metric not set"))?;
        NearCullIndex::with_metric(self.entries, metric)
    }
}

impl<K, M> Default for NearCullIndexBuilder<K, M>
where
    K: Eq + Hash + Clone,
    M: Metric<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::SymbolHamming;

    #[test]
    fn test_builder_happy_path() {
        let index = NearCullIndexBuilder::new()
            .entry(b"AAAA".to_vec(), 3)
            .entry(b"TTTT".to_vec(), 1)
            .metric(SymbolHamming::new(4))
            .build()
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.shard_count(), 2);
    }

    #[test]
    fn test_builder_bulk_entries() {
        let index = NearCullIndexBuilder::new()
            .entries(vec![(b"AA".to_vec(), 2), (b"AT".to_vec(), 2)])
            .metric(SymbolHamming::new(2))
            .build()
            .unwrap();
        assert_eq!(index.shard_count(), 1);
    }

    #[test]
    fn test_builder_missing_metric() {
        let result = NearCullIndexBuilder::<Vec<u8>, SymbolHamming>::new()
            .entry(b"AAAA".to_vec(), 1)
            .build();
        assert_eq!(
            result.unwrap_err(),
            NearCullError::invalid_parameters("metric not set")
        );
    }

    #[test]
    fn test_builder_propagates_validation_errors() {
        let result = NearCullIndexBuilder::<Vec<u8>, SymbolHamming>::new()
            .metric(SymbolHamming::new(4))
            .build();
        assert_eq!(result.unwrap_err(), NearCullError::EmptyInput);
    }
}
