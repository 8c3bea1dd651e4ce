//! A fixed-size hash table with separate chaining, mapping byte-string keys
//! to owned byte values.
//!
//! [`Table`] is the main container. [`OrderedTree`] is an older, weaker
//! variant (no delete, unbalanced) kept for comparison. Both implement
//! [`Mapping`]. Entry bytes are wiped when an entry is dropped.
//!
//! The [`mmap`] and [`tokio`] modules bulk-load newline-separated key files
//! into any [`Mapping`] and check that every key reads back.

pub mod config;
pub mod entry;
pub mod error;
pub mod hash;
pub mod map;
pub mod mmap;
pub mod parser;
pub mod tokio;
pub mod tree;

pub use entry::Entry;
pub use error::{Error, Result};
pub use hash::{BucketHasher, ByteSum, Xxh3};
pub use map::{Table, BUCKETS};
pub use tree::OrderedTree;

/// Key to value mapping shared by the hash ([`Table`]) and ordered-tree
/// ([`OrderedTree`], no delete, unbalanced) variants.
pub trait Mapping {
    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Stores copies of `key` and `value`, replacing the value of an
    /// existing key. Fails only on allocation failure, leaving the mapping
    /// unchanged.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Owned snapshot of an entry.
    fn get(&self, key: &[u8]) -> Option<Entry>;

    /// Borrowed view of a stored value.
    fn get_value(&self, key: &[u8]) -> Option<&[u8]>;

    fn first(&self) -> Option<Entry>;

    fn last(&self) -> Option<Entry>;

    /// Wipes and drops every entry.
    fn clear(&mut self);
}

impl<H: BucketHasher, const B: usize> Mapping for Table<H, B> {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        Self::set(self, key, value)
    }

    fn get(&self, key: &[u8]) -> Option<Entry> {
        Self::get(self, key)
    }

    fn get_value(&self, key: &[u8]) -> Option<&[u8]> {
        Self::get_value(self, key)
    }

    fn first(&self) -> Option<Entry> {
        Self::first(self)
    }

    fn last(&self) -> Option<Entry> {
        Self::last(self)
    }

    fn clear(&mut self) {
        Self::purge(self)
    }
}

impl Mapping for OrderedTree {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        Self::set(self, key, value)
    }

    fn get(&self, key: &[u8]) -> Option<Entry> {
        Self::get(self, key)
    }

    fn get_value(&self, key: &[u8]) -> Option<&[u8]> {
        Self::get_value(self, key)
    }

    fn first(&self) -> Option<Entry> {
        Self::first(self)
    }

    fn last(&self) -> Option<Entry> {
        Self::last(self)
    }

    fn clear(&mut self) {
        Self::clear(self)
    }
}
