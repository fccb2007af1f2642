use fnv::FnvHasher;
use murmur3::murmur3_x64_128;
use std::hash::Hasher;

/// Hash function used for arbitrary byte keys.
///
/// Takes the key and the number of values to derive, and returns that many
/// 64-bit hashes. Filters reduce each value modulo their slot count, so the
/// function itself does not need to know the filter size.
pub type HashFunction = fn(&[u8], usize) -> Vec<u64>;

pub(crate) fn hash_murmur64(key: &[u8]) -> u64 {
    let mut reader = key;
    // reading from a slice cannot fail
    murmur3_x64_128(&mut reader, 0).unwrap_or_default() as u64
}

pub(crate) fn hash_fnv64(key: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish()
}

/// Double hashing: `h1 + i * h2` with murmur3 and FNV-1.
pub fn default_hash_function(item: &[u8], num_hashes: usize) -> Vec<u64> {
    let h1 = hash_murmur64(item);
    let h2 = hash_fnv64(item) | 1;
    (0..num_hashes as u64)
        .map(|i| h1.wrapping_add(i.wrapping_mul(h2)))
        .collect()
}

/// Bits needed to hold `n` elements at false positive rate `fpr`.
pub fn optimal_bit_vector_size(n: usize, fpr: f64) -> usize {
    let ln2 = std::f64::consts::LN_2;
    ((-(n as f64) * fpr.ln()) / (ln2 * ln2)).ceil() as usize
}

pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    ((m as f64 / n as f64) * std::f64::consts::LN_2).round() as usize
}
