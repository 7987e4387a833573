//! The [`AdaptiveRadixTree`] map and its insertion, lookup and removal algorithms.

use std::cmp::min;

use log::{debug, trace};

use crate::error::ArtError;
use crate::iter::Iter;
use crate::keys::vector_key::VectorKey;
use crate::node::{ChildSlot, MAX_PARTIAL_LENGTH, Node, Partial};
use crate::stats::{TreeStats, TreeStatsTrait, collect_tree_stats};

/// An ordered map from byte-string keys to values, stored as an Adaptive Radix Tree.
///
/// Inner nodes come in four widths (4, 16, 48 and 256 children) and are promoted in place as
/// they fill up. Shared key runs are compressed into the inner nodes, at most
/// [`MAX_PARTIAL_LENGTH`](crate::MAX_PARTIAL_LENGTH) bytes per node.
///
/// Values live only at leaves, so a key that is a strict prefix of another stored key is
/// rejected with [`ArtError::PrefixConflict`]. Keys built from strings through [`VectorKey`] are
/// null terminated and never conflict this way.
///
/// ```rust
/// use artree::AdaptiveRadixTree;
///
/// let mut tree = AdaptiveRadixTree::<i32>::new();
/// assert_eq!(tree.insert("apple", 1), Ok(None));
/// assert_eq!(tree.insert("apple", 2), Ok(Some(1)));
/// assert_eq!(tree.insert("application", 3), Ok(None));
///
/// assert_eq!(tree.get("apple"), Some(&2));
/// assert_eq!(tree.get("orange"), None);
///
/// assert_eq!(tree.remove("apple"), Ok(2));
/// assert_eq!(tree.len(), 1);
/// ```
pub struct AdaptiveRadixTree<ValueType> {
    root: Option<Node<ValueType>>,
    num_entries: usize,
}

impl<ValueType> Default for AdaptiveRadixTree<ValueType> {
    fn default() -> Self {
        Self::new()
    }
}

/// What one step of the insertion walk does to the node held in the current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertStep {
    /// The slot is vacant; only ever the root.
    Empty,
    /// The slot holds a leaf with the same key.
    Replace,
    /// The slot holds a leaf sharing `prefix_len` bytes with the key past the current depth.
    SplitLeaf { prefix_len: usize, existing_byte: u8 },
    /// The key leaves the node's compressed path after `prefix_diff` bytes.
    SplitPrefix { prefix_diff: usize },
    /// The node has no child for the key's next byte.
    AddChild { byte: u8 },
    /// Continue into the child at `index`, `depth` bytes into the key.
    Descend { index: usize, depth: usize },
    /// The key and a stored key are prefixes of one another.
    Conflict,
}

impl<ValueType> AdaptiveRadixTree<ValueType> {
    pub fn new() -> Self {
        Self {
            root: None,
            num_entries: 0,
        }
    }

    #[inline]
    pub fn get<Key>(&self, key: Key) -> Option<&ValueType>
    where
        Key: Into<VectorKey>,
    {
        self.get_k(&key.into())
    }

    pub fn get_k(&self, key: &[u8]) -> Option<&ValueType> {
        let mut node = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            if let Some(leaf) = node.leaf() {
                return leaf.key_equals(key).then_some(&leaf.value);
            }
            let partial_len = node.partial_len();
            if node.prefix_mismatch(key, depth) != partial_len {
                return None;
            }
            depth += partial_len;
            node = node.child(*key.get(depth)?)?;
            depth += 1;
        }
    }

    #[inline]
    pub fn get_mut<Key>(&mut self, key: Key) -> Option<&mut ValueType>
    where
        Key: Into<VectorKey>,
    {
        self.get_mut_k(&key.into())
    }

    pub fn get_mut_k(&mut self, key: &[u8]) -> Option<&mut ValueType> {
        let mut node = self.root.as_mut()?;
        let mut depth = 0;
        loop {
            if node.is_leaf() {
                let leaf = node.leaf_mut()?;
                return leaf.key_equals(key).then_some(&mut leaf.value);
            }
            let partial_len = node.partial_len();
            if node.prefix_mismatch(key, depth) != partial_len {
                return None;
            }
            depth += partial_len;
            node = node.child_mut(*key.get(depth)?)?;
            depth += 1;
        }
    }

    #[inline]
    pub fn contains_key<Key>(&self, key: Key) -> bool
    where
        Key: Into<VectorKey>,
    {
        self.get(key).is_some()
    }

    #[inline]
    pub fn contains_key_k(&self, key: &[u8]) -> bool {
        self.get_k(key).is_some()
    }

    /// Inserts `value` under `key`, returning the value it replaced, if any.
    #[inline]
    pub fn insert<Key>(&mut self, key: Key, value: ValueType) -> Result<Option<ValueType>, ArtError>
    where
        Key: Into<VectorKey>,
    {
        self.insert_k(&key.into(), value)
    }

    /// Inserts `value` under the raw byte key `key`, returning the value it replaced, if any.
    ///
    /// Fails without modifying the tree when `key` is empty, or when it is a strict prefix of a
    /// stored key or has one as a strict prefix.
    pub fn insert_k(&mut self, key: &[u8], value: ValueType) -> Result<Option<ValueType>, ArtError> {
        if key.is_empty() {
            debug!("rejected insert of an empty key");
            return Err(ArtError::EmptyKey);
        }

        let mut slot = ChildSlot::new(&mut self.root);
        let mut depth = 0;
        loop {
            match Self::next_step(slot.node(), key, depth) {
                InsertStep::Empty => {
                    slot.replace(Node::new_leaf(key, value));
                }
                InsertStep::Replace => {
                    let Some(leaf) = slot.node_mut().and_then(Node::leaf_mut) else {
                        unreachable!("replace step on a slot without a leaf");
                    };
                    return Ok(Some(std::mem::replace(&mut leaf.value, value)));
                }
                InsertStep::SplitLeaf {
                    prefix_len,
                    existing_byte,
                } => {
                    let existing = slot.take_node();
                    slot.replace(Self::split_leaf(
                        existing,
                        existing_byte,
                        key,
                        value,
                        depth,
                        prefix_len,
                    ));
                }
                InsertStep::SplitPrefix { prefix_diff } => {
                    let existing = slot.take_node();
                    slot.replace(Self::split_prefix(existing, key, value, depth, prefix_diff));
                }
                InsertStep::AddChild { byte } => {
                    slot.add_child(byte, Node::new_leaf(key, value));
                }
                InsertStep::Descend {
                    index,
                    depth: next_depth,
                } => {
                    slot = slot.into_child(index);
                    depth = next_depth;
                    continue;
                }
                InsertStep::Conflict => {
                    debug!("rejected insert of {key:?}: prefix conflict at depth {depth}");
                    return Err(ArtError::PrefixConflict { key: key.to_vec() });
                }
            }
            self.num_entries += 1;
            return Ok(None);
        }
    }

    /// Classifies the node in the current slot against `key`, without modifying anything.
    fn next_step(node: Option<&Node<ValueType>>, key: &[u8], depth: usize) -> InsertStep {
        let Some(node) = node else {
            return InsertStep::Empty;
        };

        if let Some(leaf) = node.leaf() {
            if leaf.key_equals(key) {
                return InsertStep::Replace;
            }
            let prefix_len = leaf.longest_common_prefix(key, depth);
            let split = depth + prefix_len;
            return match (leaf.key().get(split), key.get(split)) {
                (Some(&existing_byte), Some(_)) => InsertStep::SplitLeaf {
                    prefix_len,
                    existing_byte,
                },
                _ => InsertStep::Conflict,
            };
        }

        let partial_len = node.partial_len();
        let prefix_diff = node.prefix_mismatch(key, depth);
        if prefix_diff < partial_len {
            if depth + prefix_diff >= key.len() {
                return InsertStep::Conflict;
            }
            return InsertStep::SplitPrefix { prefix_diff };
        }

        let depth = depth + partial_len;
        let Some(&byte) = key.get(depth) else {
            return InsertStep::Conflict;
        };
        match node.find_child(byte) {
            Some(index) => InsertStep::Descend {
                index,
                depth: depth + 1,
            },
            None => InsertStep::AddChild { byte },
        }
    }

    /// Builds the subtree that replaces `existing` once the new key diverges from it
    /// `prefix_len` bytes past `depth`. Shared runs longer than [`MAX_PARTIAL_LENGTH`] become a
    /// chain of single-child nodes, each edge consuming one byte.
    fn split_leaf(
        existing: Node<ValueType>,
        existing_byte: u8,
        key: &[u8],
        value: ValueType,
        depth: usize,
        prefix_len: usize,
    ) -> Node<ValueType> {
        let mut remaining = prefix_len;
        let mut take = min(MAX_PARTIAL_LENGTH, remaining);
        let mut partial = Partial::new();
        partial.copy_from(key, depth + remaining - take, take);

        let mut branch = Node::new_4(partial);
        branch.add_child(existing_byte, existing);
        branch.add_child(key[depth + prefix_len], Node::new_leaf(key, value));
        remaining -= take;

        while remaining > 0 {
            remaining -= 1;
            let edge = key[depth + remaining];
            take = min(MAX_PARTIAL_LENGTH, remaining);
            partial.copy_from(key, depth + remaining - take, take);

            let mut parent = Node::new_4(partial);
            parent.add_child(edge, branch);
            branch = parent;
            remaining -= take;
        }

        if prefix_len > MAX_PARTIAL_LENGTH {
            trace!("chained a {prefix_len} byte shared run at depth {depth}");
        }
        branch
    }

    /// Re-homes `existing` under a new `Node4` holding the first `prefix_diff` bytes of its
    /// compressed path, next to a leaf for `key`.
    fn split_prefix(
        mut existing: Node<ValueType>,
        key: &[u8],
        value: ValueType,
        depth: usize,
        prefix_diff: usize,
    ) -> Node<ValueType> {
        let Some(header) = existing.header_mut() else {
            unreachable!("prefix split on a leaf");
        };
        let mut partial = Partial::new();
        partial.copy_from(header.partial.as_ref(), 0, prefix_diff);
        let existing_byte = header.partial.at(prefix_diff);
        header.partial.shift_left(prefix_diff + 1);
        trace!(
            "split compressed path at depth {depth} after {prefix_diff} bytes, {} remain below",
            header.partial.len()
        );

        let mut branch = Node::new_4(partial);
        branch.add_child(existing_byte, existing);
        branch.add_child(key[depth + prefix_diff], Node::new_leaf(key, value));
        branch
    }

    /// Removes `key`, returning its value.
    #[inline]
    pub fn remove<Key>(&mut self, key: Key) -> Result<ValueType, ArtError>
    where
        Key: Into<VectorKey>,
    {
        self.remove_k(&key.into())
    }

    pub fn remove_k(&mut self, key: &[u8]) -> Result<ValueType, ArtError> {
        let removed = match self.root.as_mut() {
            None => None,
            Some(root) if root.is_leaf() => {
                if root.leaf().is_some_and(|leaf| leaf.key_equals(key)) {
                    self.root.take().and_then(Node::into_value)
                } else {
                    None
                }
            }
            Some(root) => {
                let removed = Self::remove_recurse(root, key, 0);
                if !root.is_leaf() && root.num_children() == 0 {
                    self.root = None;
                }
                removed
            }
        };

        match removed {
            Some(value) => {
                self.num_entries -= 1;
                Ok(value)
            }
            None => {
                debug!("rejected removal of absent key {key:?}");
                Err(ArtError::KeyNotFound { key: key.to_vec() })
            }
        }
    }

    fn remove_recurse(node: &mut Node<ValueType>, key: &[u8], depth: usize) -> Option<ValueType> {
        let partial_len = node.partial_len();
        if node.prefix_mismatch(key, depth) != partial_len {
            return None;
        }
        let depth = depth + partial_len;
        let byte = *key.get(depth)?;
        let index = node.find_child(byte)?;

        let child = node.child_at_mut(index);
        let removed = if child.is_leaf() {
            if !child.leaf().is_some_and(|leaf| leaf.key_equals(key)) {
                return None;
            }
            node.delete_child(byte).into_value()
        } else {
            let removed = Self::remove_recurse(child, key, depth + 1)?;
            if !child.is_leaf() && child.num_children() == 0 {
                node.delete_child(byte);
            }
            Some(removed)
        };

        node.shrink();
        removed
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, ValueType> {
        Iter::new(self.root.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &ValueType> + '_ {
        self.iter().map(|(_, value)| value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.num_entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn root(&self) -> Option<&Node<ValueType>> {
        self.root.as_ref()
    }
}

impl<'a, ValueType> IntoIterator for &'a AdaptiveRadixTree<ValueType> {
    type Item = (&'a [u8], &'a ValueType);
    type IntoIter = Iter<'a, ValueType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<ValueType> TreeStatsTrait for AdaptiveRadixTree<ValueType> {
    fn get_tree_stats(&self) -> TreeStats {
        collect_tree_stats(self.root.as_ref())
    }
}
