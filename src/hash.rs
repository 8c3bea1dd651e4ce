//! Bucket placement.
//!
//! A [`BucketHasher`] maps key bytes to a bucket index. The table never
//! rehashes, so the index computed for a key is the only place that key can
//! live for the table's lifetime.

use xxhash_rust::xxh3::xxh3_64;

/// Maps a key to one of `buckets` slots.
pub trait BucketHasher {
    /// Returns an index in `0..buckets`. `buckets` is never zero.
    fn bucket_index(key: &[u8], buckets: usize) -> usize;
}

/// Sum of the key bytes modulo the bucket count.
///
/// Bytes are summed as unsigned values without looking at any text encoding.
/// Keys that are byte permutations of each other land in the same bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteSum;

impl BucketHasher for ByteSum {
    #[inline]
    fn bucket_index(key: &[u8], buckets: usize) -> usize {
        let sum = key
            .iter()
            .fold(0usize, |sum, &byte| sum.wrapping_add(byte as usize));
        sum % buckets
    }
}

/// xxHash3 of the key bytes modulo the bucket count, for key sets that
/// cluster badly under [`ByteSum`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3;

impl BucketHasher for Xxh3 {
    #[inline]
    fn bucket_index(key: &[u8], buckets: usize) -> usize {
        (xxh3_64(key) % buckets as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sum_single_chars() {
        assert_eq!(ByteSum::bucket_index(b"a", 128), 97);
        assert_eq!(ByteSum::bucket_index(b"0", 128), 48);
        assert_eq!(ByteSum::bucket_index(b"z", 128), 122);
    }

    #[test]
    fn byte_sum_wraps_modulo() {
        // 98 + 111 + 98 = 307
        assert_eq!(ByteSum::bucket_index(b"bob", 128), 307 % 128);
        assert_eq!(ByteSum::bucket_index(b"", 128), 0);
    }

    #[test]
    fn byte_sum_is_unsigned() {
        // 0xF0 0x9F 0x8E 0x83 repeated twice
        let key = "🎃🎃".as_bytes();
        let expected = 2 * (0xF0 + 0x9F + 0x8E + 0x83) % 128;
        assert_eq!(ByteSum::bucket_index(key, 128), expected);
    }

    #[test]
    fn anagrams_collide() {
        assert_eq!(
            ByteSum::bucket_index(b"listen", 128),
            ByteSum::bucket_index(b"silent", 128)
        );
    }

    #[test]
    fn xxh3_stays_in_range() {
        for key in ["", "a", "listen", "silent", "水调歌头"] {
            assert!(Xxh3::bucket_index(key.as_bytes(), 7) < 7);
        }
    }
}
