//! Distance metric abstraction.
//!
//! The index is parametric over the metric it prunes with: any capability
//! providing a symmetric, triangle-inequality-respecting distance between
//! two fixed-length keys works. The metric also owns the sequence length
//! `L`, which bounds every distance it reports and sizes the per-node
//! child tables of the shard trees.
//!
//! # Contract
//!
//! For all keys `a`, `b`, `c` of the configured length:
//!
//! 1. `distance(a, b) == distance(b, a)` (symmetry)
//! 2. `distance(a, c) <= distance(a, b) + distance(b, c)` (triangle inequality)
//! 3. `distance(a, b) == 0` if and only if `a == b`
//! 4. `distance(a, b) <= sequence_length()`
//!
//! Radius-bounded search prunes subtrees using property 2; a metric that
//! violates it silently loses matches.
//!
//! # Examples
//!
//! ```
//! use nearcull::metric::{Metric, SymbolHamming};
//!
//! let metric = SymbolHamming::new(4);
//! assert_eq!(metric.distance(&b"ACGT".to_vec(), &b"ACGA".to_vec()), 1);
//! assert_eq!(Metric::<Vec<u8>>::sequence_length(&metric), 4);
//! ```

/// Distance capability over fixed-length keys.
///
/// Implementations must satisfy the contract documented at the
/// [module level](self). Distances are plain `usize` values in
/// `[0, sequence_length()]`.
pub trait Metric<K> {
    /// Distance between two keys of the configured length.
    fn distance(&self, a: &K, b: &K) -> usize;

    /// The fixed sequence length `L` this metric was configured for.
    ///
    /// Every distance this metric reports is at most `L`.
    fn sequence_length(&self) -> usize;

    /// Number of symbols in `key`.
    fn key_length(&self, key: &K) -> usize;

    /// Whether `key` has the length this metric expects.
    ///
    /// Checked once per key during index construction; queries assume it.
    fn key_fits(&self, key: &K) -> bool {
        self.key_length(key) == self.sequence_length()
    }
}

/// Symbol-wise Hamming distance over byte-sequence keys.
///
/// Counts the positions at which two equal-length sequences hold different
/// symbols. This is the natural metric for fixed-length tags drawn from a
/// small alphabet (e.g. `ACGT` sequence barcodes) and the default metric
/// used throughout the crate's tests.
///
/// # Examples
///
/// ```
/// use nearcull::metric::{Metric, SymbolHamming};
///
/// let metric = SymbolHamming::new(5);
/// assert_eq!(metric.distance(&"AAAAA", &"AAAAA"), 0);
/// assert_eq!(metric.distance(&"AAAAA", &"TTTTT"), 5);
/// assert!(metric.key_fits(&"AAAAA"));
/// assert!(!metric.key_fits(&"AAA"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolHamming {
    length: usize,
}

impl SymbolHamming {
    /// Create a Hamming metric for sequences of `length` symbols.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }
}

impl<K> Metric<K> for SymbolHamming
where
    K: AsRef<[u8]>,
{
    #[inline]
    fn distance(&self, a: &K, b: &K) -> usize {
        a.as_ref()
            .iter()
            .zip(b.as_ref())
            .filter(|(x, y)| x != y)
            .count()
    }

    #[inline(always)]
    fn sequence_length(&self) -> usize {
        self.length
    }

    #[inline]
    fn key_length(&self, key: &K) -> usize {
        key.as_ref().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_iff_equal() {
        let metric = SymbolHamming::new(4);
        assert_eq!(metric.distance(&"ACGT", &"ACGT"), 0);
        assert_ne!(metric.distance(&"ACGT", &"ACGA"), 0);
    }

    #[test]
    fn test_distance_symmetric() {
        let metric = SymbolHamming::new(6);
        let a = "AACCGG";
        let b = "ATCCGT";
        assert_eq!(metric.distance(&a, &b), metric.distance(&b, &a));
    }

    #[test]
    fn test_distance_bounded_by_length() {
        let metric = SymbolHamming::new(3);
        assert_eq!(metric.distance(&"AAA", &"TTT"), 3);
        assert!(metric.distance(&"AAA", &"TTT") <= Metric::<&str>::sequence_length(&metric));
    }

    #[test]
    fn test_triangle_inequality_exhaustive_small() {
        // All length-3 sequences over a 2-symbol alphabet.
        let metric = SymbolHamming::new(3);
        let keys: Vec<Vec<u8>> = (0..8u8)
            .map(|bits| (0..3).map(|i| if bits >> i & 1 == 1 { b'A' } else { b'T' }).collect())
            .collect();

        for a in &keys {
            for b in &keys {
                for c in &keys {
                    assert!(
                        metric.distance(a, c) <= metric.distance(a, b) + metric.distance(b, c)
                    );
                }
            }
        }
    }

    #[test]
    fn test_key_fits() {
        let metric = SymbolHamming::new(4);
        assert!(metric.key_fits(&b"ACGT".to_vec()));
        assert!(!metric.key_fits(&b"ACGTA".to_vec()));
        assert!(!metric.key_fits(&b"".to_vec()));
    }

    #[test]
    fn test_works_for_borrowed_and_owned_keys() {
        let metric = SymbolHamming::new(2);
        assert_eq!(metric.distance(&"AT", &"AA"), 1);
        assert_eq!(metric.distance(&b"AT".to_vec(), &b"AA".to_vec()), 1);
    }
}
