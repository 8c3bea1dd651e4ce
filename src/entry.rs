//! Owned key/value pairs.
//!
//! Every [`Entry`] holds its own copies of the key and value bytes. Both
//! buffers are overwritten with zeros when the entry is dropped, so removing
//! a key, replacing a value or tearing down a whole table never leaves stale
//! data behind in freed memory.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Result;

/// A stored key/value pair.
///
/// Returned by value from `get`, `first` and `last` as an independent
/// snapshot: the caller owns it and it stays valid after the table changes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    key: Vec<u8>,
    value: Vec<u8>,
}

/// Copies `bytes` into a buffer of exactly the same size, reporting
/// allocation failure instead of aborting.
pub(crate) fn try_copy(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(bytes.len())?;
    buffer.extend_from_slice(bytes);
    Ok(buffer)
}

impl Entry {
    /// Builds an entry from copies of `key` and `value`.
    ///
    /// If the value copy fails, the already copied key is wiped on the way out.
    pub fn try_new(key: &[u8], value: &[u8]) -> Result<Self> {
        let key = try_copy(key)?;
        let value = match try_copy(value) {
            Ok(value) => value,
            Err(error) => {
                let mut key = key;
                key.zeroize();
                return Err(error);
            }
        };
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Size of the value in bytes.
    pub fn length(&self) -> usize {
        self.value.len()
    }

    /// Replaces the value with a copy of `value`.
    ///
    /// The new buffer is allocated before anything is touched; on failure
    /// the entry keeps its old value.
    pub(crate) fn replace_value(&mut self, value: &[u8]) -> Result<()> {
        let mut previous = std::mem::replace(&mut self.value, try_copy(value)?);
        previous.zeroize();
        Ok(())
    }
}

// Values may be secrets, only their size is printed.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &String::from_utf8_lossy(&self.key))
            .field("length", &self.value.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_key_and_value() {
        let key = b"b".to_vec();
        let value = b"bar\0".to_vec();
        let entry = Entry::try_new(&key, &value).unwrap();
        drop((key, value));
        assert_eq!(entry.key(), b"b");
        assert_eq!(entry.value(), b"bar\0");
        assert_eq!(entry.length(), 4);
    }

    #[test]
    fn replace_value_resizes() {
        let mut entry = Entry::try_new(b"b", b"bar").unwrap();
        entry.replace_value(b"fizzbuzz").unwrap();
        assert_eq!(entry.value(), b"fizzbuzz");
        assert_eq!(entry.length(), 8);
        entry.replace_value(b"").unwrap();
        assert_eq!(entry.length(), 0);
    }

    #[test]
    fn zeroize_wipes_both_buffers() {
        let mut entry = Entry::try_new(b"secret", b"hunter2").unwrap();
        entry.zeroize();
        assert!(entry.key().is_empty());
        assert!(entry.value().is_empty());
    }

    #[test]
    fn debug_hides_value() {
        let entry = Entry::try_new(b"user", b"hunter2").unwrap();
        let printed = format!("{:?}", entry);
        assert!(printed.contains("user"));
        assert!(!printed.contains("hunter2"));
    }
}
