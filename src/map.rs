use std::marker::PhantomData;

use crate::entry::Entry;
use crate::error::Result;
use crate::hash::{BucketHasher, ByteSum};

/// Default number of buckets.
pub const BUCKETS: usize = 128;

/// A hash table with separate chaining and a fixed bucket count.
///
/// Each of the `B` buckets holds a chain of entries in insertion order. The
/// bucket of a key is `H::bucket_index(key, B)` and never changes, since the
/// table does not grow or rehash.
pub struct Table<H = ByteSum, const B: usize = BUCKETS> {
    buckets: Vec<Vec<Entry>>,
    count: usize,
    hasher: PhantomData<H>,
}

impl Table {
    /// Creates an empty table with [`BUCKETS`] buckets placed by [`ByteSum`].
    pub fn new() -> Result<Self> {
        Self::create()
    }
}

impl<H: BucketHasher, const B: usize> Table<H, B> {
    const NON_EMPTY: () = assert!(B > 0, "a table needs at least one bucket");

    /// Creates an empty table for any hasher and bucket count.
    pub fn create() -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(B)?;
        buckets.resize_with(B, Vec::new);
        Ok(Self {
            buckets,
            count: 0,
            hasher: PhantomData,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Bucket a key is placed in.
    #[inline]
    pub fn bucket_of(&self, key: impl AsRef<[u8]>) -> usize {
        H::bucket_index(key.as_ref(), B)
    }

    fn find(&self, key: &[u8]) -> Option<&Entry> {
        if self.count == 0 {
            return None;
        }
        self.buckets[H::bucket_index(key, B)]
            .iter()
            .find(|entry| entry.key() == key)
    }

    /// Stores a copy of `value` under a copy of `key`.
    ///
    /// An existing key keeps its place in the chain and gets the new value.
    /// A new key is appended to the tail of its bucket's chain. Fails only
    /// when memory runs out, in which case the table is unchanged.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        let (key, value) = (key.as_ref(), value.as_ref());
        let index = H::bucket_index(key, B);
        let chain = &mut self.buckets[index];

        if let Some(entry) = chain.iter_mut().find(|entry| entry.key() == key) {
            entry.replace_value(value)?;
            tracing::trace!(bucket = index, length = value.len(), "value replaced");
            return Ok(());
        }

        let entry = Entry::try_new(key, value)?;
        chain.try_reserve(1)?;
        chain.push(entry);
        self.count += 1;
        tracing::trace!(
            bucket = index,
            chain = chain.len(),
            length = value.len(),
            "entry added"
        );
        Ok(())
    }

    /// Owned snapshot of the entry stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Entry> {
        self.find(key.as_ref()).cloned()
    }

    /// Borrowed view of the value stored under `key`, without copying.
    pub fn get_value(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.find(key.as_ref()).map(Entry::value)
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.find(key.as_ref()).is_some()
    }

    /// Removes `key`, returning whether it was present. The removed entry's
    /// bytes are wiped.
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> bool {
        if self.count == 0 {
            return false;
        }
        let key = key.as_ref();
        let index = H::bucket_index(key, B);
        let chain = &mut self.buckets[index];
        match chain.iter().position(|entry| entry.key() == key) {
            Some(position) => {
                drop(chain.remove(position));
                self.count -= 1;
                tracing::trace!(bucket = index, "entry deleted");
                true
            }
            None => false,
        }
    }

    /// Head of the lowest-indexed non-empty bucket.
    ///
    /// This follows bucket placement, not key order: only for single-byte
    /// keys under [`ByteSum`] does it coincide with the smallest key.
    pub fn first(&self) -> Option<Entry> {
        self.buckets.iter().find_map(|chain| chain.first()).cloned()
    }

    /// Tail of the highest-indexed non-empty bucket.
    pub fn last(&self) -> Option<Entry> {
        self.buckets
            .iter()
            .rev()
            .find_map(|chain| chain.last())
            .cloned()
    }

    /// Entries in bucket order, then chain order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|entry| (entry.key(), entry.value()))
    }

    /// Wipes and drops every entry. The table stays usable.
    pub fn purge(&mut self) {
        if self.count == 0 {
            return;
        }
        for chain in self.buckets.iter_mut() {
            drop(std::mem::take(chain));
        }
        tracing::debug!(entries = self.count, "table purged");
        self.count = 0;
    }

    pub fn clear(&mut self) {
        self.purge();
    }

    /// Purges the table and releases it.
    pub fn free(mut self) {
        if !self.is_empty() {
            self.purge();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Xxh3;

    #[test]
    fn new_is_empty() {
        let table = Table::new().unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.buckets.len(), BUCKETS);
        table.free();
    }

    #[test]
    fn collisions_chain_in_insertion_order() {
        let mut table = Table::new().unwrap();
        // 97 + 98 = 195 and 67 = 195 % 128
        for key in ["ab", "ba", "C"] {
            table.set(key, key).unwrap();
        }
        let bucket = table.bucket_of("ab");
        assert_eq!(table.bucket_of("ba"), bucket);
        let chain: Vec<&[u8]> = table.buckets[bucket].iter().map(Entry::key).collect();
        assert_eq!(chain, vec![b"ab".as_slice(), b"ba".as_slice(), b"C".as_slice()]);
        assert_eq!(table.first().unwrap().key(), b"ab");
        assert_eq!(table.last().unwrap().key(), b"C");
    }

    #[test]
    fn delete_closes_gap_in_chain() {
        let mut table = Table::new().unwrap();
        for key in ["ab", "ba", "C"] {
            table.set(key, "x").unwrap();
        }
        assert!(table.delete("ba"));
        let bucket = table.bucket_of("ab");
        assert_eq!(table.buckets[bucket].len(), 2);
        table.set("ba", "y").unwrap();
        assert_eq!(table.buckets[bucket].last().unwrap().key(), b"ba");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn overwrite_keeps_chain_position() {
        let mut table = Table::new().unwrap();
        table.set("ab", "1").unwrap();
        table.set("ba", "2").unwrap();
        table.set("ab", "three").unwrap();
        let bucket = table.bucket_of("ab");
        assert_eq!(table.buckets[bucket][0].key(), b"ab");
        assert_eq!(table.buckets[bucket][0].value(), b"three");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn purge_resets_buckets() {
        let mut table = Table::new().unwrap();
        table.set("a", "foo").unwrap();
        table.set("b", "bar").unwrap();
        table.purge();
        assert!(table.is_empty());
        assert!(table.buckets.iter().all(Vec::is_empty));
        table.set("c", "baz").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn custom_hasher_and_size() {
        let mut table = Table::<Xxh3, 1>::create().unwrap();
        for key in ["a", "b", "c"] {
            table.set(key, key).unwrap();
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.first().unwrap().key(), b"a");
        assert_eq!(table.last().unwrap().key(), b"c");
        assert_eq!(table.get_value("b"), Some(b"b".as_slice()));
    }
}
