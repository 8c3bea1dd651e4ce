//! Unbalanced binary search tree keyed by raw bytes.
//!
//! Kept as a baseline next to [`Table`](crate::Table): keys are ordered, so
//! `first`/`last` are the smallest and largest keys, but there is no delete
//! and nothing rebalances the tree. Inserting sorted keys degrades it into a
//! list of depth `n`.

use std::cmp::Ordering;

use crate::entry::Entry;
use crate::error::Result;

struct Node {
    entry: Entry,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn leaf(entry: Entry) -> Box<Self> {
        Box::new(Self {
            entry,
            left: None,
            right: None,
        })
    }
}

/// Ordered key/value tree. No delete, not self-balancing.
#[derive(Default)]
pub struct OrderedTree {
    root: Option<Box<Node>>,
    length: usize,
}

impl OrderedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.length
    }

    fn find(&self, key: &[u8]) -> Option<&Entry> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.entry.key()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.entry),
            };
        }
        None
    }

    /// Stores a copy of `value` under `key`, replacing the value of an
    /// existing key or hanging a new leaf where the search falls off.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        let (key, value) = (key.as_ref(), value.as_ref());
        let mut slot = &mut self.root;
        let mut depth = 0usize;
        while let Some(node) = slot {
            slot = match key.cmp(node.entry.key()) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return node.entry.replace_value(value),
            };
            depth += 1;
        }
        *slot = Some(Node::leaf(Entry::try_new(key, value)?));
        self.length += 1;
        tracing::trace!(depth, length = value.len(), "leaf added");
        Ok(())
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Entry> {
        self.find(key.as_ref()).cloned()
    }

    pub fn get_value(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.find(key.as_ref()).map(Entry::value)
    }

    /// Smallest key.
    pub fn first(&self) -> Option<Entry> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.entry.clone())
    }

    /// Largest key.
    pub fn last(&self) -> Option<Entry> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(node.entry.clone())
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node, usize)> =
            self.root.as_deref().map(|node| (node, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left.as_deref().map(|left| (left, depth + 1)));
            stack.extend(node.right.as_deref().map(|right| (right, depth + 1)));
        }
        deepest
    }

    /// Wipes and drops every node without recursing, so a degenerate tree
    /// cannot overflow the stack.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.length = 0;
    }
}

impl Drop for OrderedTree {
    fn drop(&mut self) {
        self.clear();
    }
}
