//! End-to-end tests driving the index the way a deduplication pass does.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use nearcull::{Metric, NearCullIndex, SymbolHamming, WeightBound};

const ALPHABET: &[u8] = b"ACGT";

fn random_entries(
    rng: &mut ChaCha8Rng,
    count: usize,
    length: usize,
) -> Vec<(Vec<u8>, u64)> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(count);
    while entries.len() < count {
        let key: Vec<u8> = (0..length)
            .map(|_| *ALPHABET.choose(rng).unwrap())
            .collect();
        if seen.insert(key.clone()) {
            entries.push((key, rng.gen_range(1..=50u64)));
        }
    }
    entries
}

#[test]
fn test_build_and_membership() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let entries = random_entries(&mut rng, 200, 8);
    let index = NearCullIndex::new(entries.clone(), 8).unwrap();

    assert_eq!(index.len(), 200);
    for (key, _) in &entries {
        assert!(index.contains(key));
    }
    assert!(!index.contains(&b"XXXXXXXX".to_vec()));
}

#[test]
fn test_descending_weight_dedup_consumes_everything() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let entries = random_entries(&mut rng, 300, 8);
    let weight_of: HashMap<Vec<u8>, u64> = entries.iter().cloned().collect();
    let metric = SymbolHamming::new(8);

    let mut index = NearCullIndex::new(entries.clone(), 8).unwrap();

    let mut order = entries.clone();
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let mut absorbed: HashSet<Vec<u8>> = HashSet::new();
    for (center, weight) in order {
        if !index.contains(&center) {
            continue;
        }
        let removed = index.remove_near(&center, 2, weight);
        assert!(removed.contains(&center));

        for key in &removed {
            // Sound: within radius, and within the bound unless it is the
            // query key itself.
            assert!(metric.distance(&center, key) <= 2);
            if key != &center {
                assert!(weight_of[key] <= weight);
            }
            assert!(!index.contains(key));
            absorbed.insert(key.clone());
        }
    }

    // Every key was visited or absorbed; none survives.
    assert_eq!(absorbed.len(), 300);
    assert!(index.is_empty());
}

#[test]
fn test_removed_keys_stay_removed() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let entries = random_entries(&mut rng, 100, 6);
    let mut index = NearCullIndex::new(entries.clone(), 6).unwrap();

    let (victim, weight) = entries[0].clone();
    let removed = index.remove_near(&victim, 1, weight);
    assert!(removed.contains(&victim));

    // Hammer the structure with unrelated queries; the victim never
    // reappears in the live set.
    for (query, weight) in entries.iter().skip(1).take(50) {
        index.remove_near(query, 3, *weight);
        assert!(!index.contains(&victim));
    }
}

#[test]
fn test_unbounded_sweep_empties_the_index() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let entries = random_entries(&mut rng, 64, 4);
    let mut index = NearCullIndex::new(entries.clone(), 4).unwrap();

    // Radius = L matches every key in one sweep.
    let removed = index.remove_near(&entries[0].0, 4, WeightBound::Unbounded);
    assert_eq!(removed.len(), 64);
    assert!(index.is_empty());

    // The structure stays queryable after exhaustion.
    assert!(index.remove_near(&entries[0].0, 4, WeightBound::Unbounded).is_empty());
    let stats = index.diagnostics();
    assert!(stats.max_depth >= 1);
}

#[test]
fn test_diagnostics_against_brute_force_expectations() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let entries = random_entries(&mut rng, 128, 6);
    let index = NearCullIndex::new(entries, 6).unwrap();

    let stats = index.diagnostics();
    assert!(stats.max_depth >= 1);
    assert!(stats.average_depth >= 1.0);
    assert!(stats.average_depth <= stats.max_depth as f64);
}

#[test]
fn test_matches_brute_force_on_single_queries() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let entries = random_entries(&mut rng, 150, 5);
    let metric = SymbolHamming::new(5);

    for radius in 0..=2 {
        let mut index = NearCullIndex::new(entries.clone(), 5).unwrap();
        let (query, _) = entries[radius].clone();
        let bound = 25u64;

        let mut removed = index.remove_near(&query, radius, bound);
        removed.sort();
        removed.dedup();

        let mut expected: Vec<Vec<u8>> = entries
            .iter()
            .filter(|(key, weight)| {
                (metric.distance(&query, key) <= radius && *weight <= bound) || key == &query
            })
            .map(|(key, _)| key.clone())
            .collect();
        expected.sort();

        assert_eq!(removed, expected, "radius {radius}");
    }
}
