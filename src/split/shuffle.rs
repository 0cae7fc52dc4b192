//! Seeded permutations and proportion rounding shared by both splitters.
//!
//! Every generator is a ChaCha8 stream, so a seed yields the same
//! permutation on every platform and build. Group and partition shuffles
//! each get their own generator. It is seeded from a SHA-256 digest of the
//! master seed and a scope label, so no generator is shared between
//! strata.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Slack applied before flooring `ratio * n`, so that products such as
/// `0.29 * 100 = 28.999999999999996` count as 29 rather than 28. A bare
/// `floor` would give 28 here; the slack is deliberate.
pub const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Scope label for per-group shuffles.
pub const GROUP_SCOPE: &str = "group";

/// Scope label for the final per-partition reshuffle.
pub const PARTITION_SCOPE: &str = "partition";

/// Creates the pinned generator for a seed.
pub fn rng_from_seed(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Derives an independent sub-seed from the master seed, a scope and a key.
///
/// Equal inputs always give the same sub-seed. Different keys collide only
/// with negligible probability.
pub fn derive_seed(seed: u64, scope: &str, key: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed.to_le_bytes());
    hasher.update(key);
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// Shuffles indices in place with a generator seeded from `seed`.
pub fn shuffle_in_place(indices: &mut [usize], seed: u64) {
    let mut rng = rng_from_seed(seed);
    indices.shuffle(&mut rng);
}

/// Returns a seeded permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    shuffle_in_place(&mut indices, seed);
    indices
}

/// `floor(ratio * n)`, clamped to `0..=n`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn floor_count(ratio: f64, n: usize) -> usize {
    let raw = (ratio * n as f64 + ROUNDING_TOLERANCE).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(n)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_permutation_is_a_permutation() {
        let perm = permutation(257, 7);
        assert_eq!(perm.len(), 257);
        let unique: HashSet<usize> = perm.iter().copied().collect();
        assert_eq!(unique.len(), 257);
        assert!(perm.iter().all(|&i| i < 257));
    }

    #[test]
    fn test_permutation_is_deterministic() {
        assert_eq!(permutation(100, 42), permutation(100, 42));
    }

    #[test]
    fn test_permutation_depends_on_seed() {
        assert_ne!(permutation(100, 1), permutation(100, 2));
    }

    #[test]
    fn test_permutation_of_empty_and_single() {
        assert!(permutation(0, 42).is_empty());
        assert_eq!(permutation(1, 42), vec![0]);
    }

    #[test]
    fn test_derive_seed_is_stable_and_scoped() {
        let a = derive_seed(42, GROUP_SCOPE, b"tcp");
        assert_eq!(a, derive_seed(42, GROUP_SCOPE, b"tcp"));
        assert_ne!(a, derive_seed(42, GROUP_SCOPE, b"udp"));
        assert_ne!(a, derive_seed(43, GROUP_SCOPE, b"tcp"));
        assert_ne!(a, derive_seed(42, PARTITION_SCOPE, b"tcp"));
    }

    #[test]
    fn test_floor_count_exact_products() {
        assert_eq!(floor_count(0.6, 100), 60);
        assert_eq!(floor_count(0.2, 100), 20);
        assert_eq!(floor_count(0.8, 100), 80);
        assert_eq!(floor_count(0.6, 30), 18);
        assert_eq!(floor_count(0.7, 10), 7);
    }

    #[test]
    fn test_floor_count_absorbs_representation_error() {
        assert!(0.29 * 100.0 < 29.0);
        assert_eq!(floor_count(0.29, 100), 29);
        assert_eq!(floor_count(0.57, 100), 57);
    }

    // Fixed outputs of the ChaCha8 stream under rand 0.8 and SHA-256. A
    // change here means every previously published split has moved.
    #[test]
    fn test_permutation_golden_values() {
        assert_eq!(permutation(10, 42), vec![0, 3, 5, 7, 9, 4, 8, 1, 6, 2]);
        assert_eq!(permutation(10, 7), vec![5, 4, 2, 0, 3, 6, 7, 8, 9, 1]);
    }

    #[test]
    fn test_derive_seed_golden_values() {
        assert_eq!(derive_seed(42, GROUP_SCOPE, b"\x03tcp"), 7_632_507_931_012_784_688);
        assert_eq!(
            derive_seed(42, PARTITION_SCOPE, b"train"),
            16_800_174_618_586_668_822
        );
    }

    #[test]
    fn test_floor_count_truncates() {
        assert_eq!(floor_count(0.6, 7), 4);
        assert_eq!(floor_count(0.2, 7), 1);
        assert_eq!(floor_count(0.6, 1), 0);
        assert_eq!(floor_count(0.0, 10), 0);
    }

    #[test]
    fn test_floor_count_clamps() {
        assert_eq!(floor_count(1.0, 10), 10);
        assert_eq!(floor_count(1.000_000_5, 10), 10);
        assert_eq!(floor_count(-0.1, 10), 0);
    }
}
