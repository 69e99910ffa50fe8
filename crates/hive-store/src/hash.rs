//! The key hash and bucket sizing rules.
//!
//! Keys are hashed with djb2 (seed 5381, `hash = hash * 33 + byte`), the
//! classic multiplicative string hash. The bucket array is sized to a power
//! of two so the hash can be reduced with a mask instead of a modulo.

/// djb2 over an arbitrary byte slice.
///
/// See <http://www.cse.yorku.ca/~oz/hash.html>.
pub fn djb2(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(u64::from(b));
    }
    hash
}

/// Round a configured minimum bucket count up to the next power of two.
///
/// A minimum of zero is treated as one. The count is fixed at table
/// construction and never changes afterward.
pub fn bucket_count_for(min_buckets: usize) -> usize {
    min_buckets.max(1).next_power_of_two()
}
