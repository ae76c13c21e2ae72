//! Bucket addressing.
//!
//! The key is folded as a sequence of little-endian 16-bit words. An odd
//! trailing byte does not take part in the hash; keys that differ only in
//! that byte land in the same bucket and are told apart by the byte
//! comparison in the chain. The function is deterministic and not seeded
//! per table, so structured keys may cluster.

/// Non-zero starting value of the fold.
pub const HASH_SEED: u32 = 0xbabe;

/// Fold `key` and reduce it to a bucket index in `[0, bucket_count)`.
///
/// `bucket_count` must be non-zero.
#[inline]
pub fn hash_bytes(key: &[u8], bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0, "bucket_count must be positive");
    let mut hash = HASH_SEED;
    for (i, pair) in key.chunks_exact(2).enumerate() {
        let word = u32::from(u16::from_le_bytes([pair[0], pair[1]]));
        hash ^= ((i as u32) << 4) ^ (word << 8) ^ word;
    }
    hash as usize % bucket_count
}
