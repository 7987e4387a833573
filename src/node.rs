use log::trace;

use crate::mapping::NodeMapping;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::keyed_mapping::KeyedMapping;
use crate::partials::array_partial::ArrPartial;

/// Longest compressed path segment stored inline in a single inner node. Longer shared runs are
/// split across a chain of single-child nodes.
pub const MAX_PARTIAL_LENGTH: usize = 8;

pub(crate) type Partial = ArrPartial<MAX_PARTIAL_LENGTH>;

pub(crate) type Node4Mapping<V> = KeyedMapping<Node<V>, 4>;
pub(crate) type Node16Mapping<V> = KeyedMapping<Node<V>, 16>;
pub(crate) type Node48Mapping<V> = IndexedMapping<Node<V>, 48>;
pub(crate) type Node256Mapping<V> = DirectMapping<Node<V>>;

/// The shape of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Node4,
    Node16,
    Node48,
    Node256,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Leaf => "Leaf",
            NodeKind::Node4 => "Node4",
            NodeKind::Node16 => "Node16",
            NodeKind::Node48 => "Node48",
            NodeKind::Node256 => "Node256",
        }
    }

    /// Maximum number of children; zero for leaves.
    pub fn capacity(&self) -> usize {
        match self {
            NodeKind::Leaf => 0,
            NodeKind::Node4 => 4,
            NodeKind::Node16 => 16,
            NodeKind::Node48 => 48,
            NodeKind::Node256 => 256,
        }
    }
}

/// A terminal node: the full key it was inserted under and its value.
pub(crate) struct LeafNode<V> {
    key: Box<[u8]>,
    pub(crate) value: V,
}

impl<V> LeafNode<V> {
    pub(crate) fn new(key: &[u8], value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    #[inline]
    pub(crate) fn key_equals(&self, key: &[u8]) -> bool {
        *self.key == *key
    }

    /// Length of the common run of `self.key()[depth..]` and `key[depth..]`.
    pub(crate) fn longest_common_prefix(&self, key: &[u8], depth: usize) -> usize {
        let ours = self.key.get(depth..).unwrap_or_default();
        let theirs = key.get(depth..).unwrap_or_default();
        ours.iter().zip(theirs).take_while(|(a, b)| a == b).count()
    }
}

/// Metadata shared by every inner node shape. The child count lives in the mapping.
#[derive(Clone, Copy, Default, Debug)]
pub(crate) struct Header {
    pub(crate) partial: Partial,
}

pub(crate) struct InnerNode<M> {
    pub(crate) header: Header,
    pub(crate) mapping: M,
}

impl<M: Default> InnerNode<M> {
    pub(crate) fn new(partial: Partial) -> Self {
        Self {
            header: Header { partial },
            mapping: M::default(),
        }
    }
}

impl<M> InnerNode<M> {
    #[inline]
    pub(crate) fn partial_len(&self) -> usize {
        self.header.partial.len()
    }

    pub(crate) fn copy_header<O>(&mut self, from: &InnerNode<O>) {
        self.header = from.header;
    }

    /// Moves every child into a node of another shape, carrying the header along. `self` is left
    /// without children.
    pub(crate) fn resized<V, M2>(&mut self) -> InnerNode<M2>
    where
        M: NodeMapping<Node<V>>,
        M2: NodeMapping<Node<V>> + Default,
    {
        let mut resized = InnerNode::<M2>::new(Partial::new());
        resized.copy_header(self);
        self.mapping.move_into(&mut resized.mapping);
        resized
    }
}

pub(crate) enum Node<V> {
    Leaf(Box<LeafNode<V>>),
    Node4(Box<InnerNode<Node4Mapping<V>>>),
    Node16(Box<InnerNode<Node16Mapping<V>>>),
    Node48(Box<InnerNode<Node48Mapping<V>>>),
    Node256(Box<InnerNode<Node256Mapping<V>>>),
}

/// Runs `$body` against the inner node of whatever shape `$node` is, or `$leaf` for a leaf.
macro_rules! with_inner {
    ($node:expr, $inner:ident => $body:expr, leaf => $leaf:expr) => {
        match $node {
            Node::Node4($inner) => $body,
            Node::Node16($inner) => $body,
            Node::Node48($inner) => $body,
            Node::Node256($inner) => $body,
            Node::Leaf(_) => $leaf,
        }
    };
}

impl<V> Node<V> {
    #[inline]
    pub(crate) fn new_leaf(key: &[u8], value: V) -> Self {
        Node::Leaf(Box::new(LeafNode::new(key, value)))
    }

    #[inline]
    pub(crate) fn new_4(partial: Partial) -> Self {
        Node::Node4(Box::new(InnerNode::new(partial)))
    }

    #[cfg(test)]
    pub(crate) fn new_256(partial: Partial) -> Self {
        Node::Node256(Box::new(InnerNode::new(partial)))
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Node4(_) => NodeKind::Node4,
            Node::Node16(_) => NodeKind::Node16,
            Node::Node48(_) => NodeKind::Node48,
            Node::Node256(_) => NodeKind::Node256,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub(crate) fn leaf(&self) -> Option<&LeafNode<V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self) -> Option<&mut LeafNode<V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub(crate) fn into_value(self) -> Option<V> {
        match self {
            Node::Leaf(leaf) => Some(leaf.value),
            _ => None,
        }
    }

    /// Header of an inner node. Leaves carry no header.
    #[inline]
    pub(crate) fn header(&self) -> Option<&Header> {
        with_inner!(self, inner => Some(&inner.header), leaf => None)
    }

    #[inline]
    pub(crate) fn header_mut(&mut self) -> Option<&mut Header> {
        with_inner!(self, inner => Some(&mut inner.header), leaf => None)
    }

    #[inline]
    pub(crate) fn partial_len(&self) -> usize {
        with_inner!(self, inner => inner.partial_len(), leaf => 0)
    }

    /// Number of leading partial bytes matching `key[depth..]`.
    #[inline]
    pub(crate) fn prefix_mismatch(&self, key: &[u8], depth: usize) -> usize {
        with_inner!(self, inner => inner.header.partial.prefix_mismatch(key, depth), leaf => 0)
    }

    #[inline]
    pub(crate) fn num_children(&self) -> usize {
        with_inner!(self, inner => inner.mapping.num_children(), leaf => 0)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.kind().capacity()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        with_inner!(self, inner => inner.mapping.is_full(), leaf => true)
    }

    #[inline]
    pub(crate) fn find_child(&self, key: u8) -> Option<usize> {
        with_inner!(self, inner => inner.mapping.find_child(key), leaf => None)
    }

    #[inline]
    pub(crate) fn child(&self, key: u8) -> Option<&Node<V>> {
        with_inner!(self, inner => inner.mapping.seek_child(key), leaf => None)
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, key: u8) -> Option<&mut Node<V>> {
        with_inner!(self, inner => inner.mapping.seek_child_mut(key), leaf => None)
    }

    pub(crate) fn child_at_mut(&mut self, index: usize) -> &mut Node<V> {
        match self.child_slot_at(index) {
            Some(child) => child,
            None => panic!("child slot {index} was left vacant"),
        }
    }

    /// The storage cell of the child at a populated index, for in-place replacement.
    pub(crate) fn child_slot_at(&mut self, index: usize) -> &mut Option<Node<V>> {
        with_inner!(self, inner => inner.mapping.child_slot_at(index),
            leaf => unreachable!("leaves have no children"))
    }

    /// Adds a child, first promoting this node to the next wider shape if it is full.
    pub(crate) fn add_child(&mut self, key: u8, child: Node<V>) {
        if self.is_full() {
            self.grow();
        }
        with_inner!(self, inner => inner.mapping.add_child(key, child),
            leaf => unreachable!("leaves cannot take children"))
    }

    /// Removes the child under `key`. Does not change the node's shape; see [`Node::shrink`].
    pub(crate) fn delete_child(&mut self, key: u8) -> Node<V> {
        with_inner!(self, inner => inner.mapping.delete_child(key),
            leaf => unreachable!("leaves have no children"))
    }

    /// Replaces this node with the next wider shape holding the same header and children.
    fn grow(&mut self) {
        let grown = match self {
            Node::Node4(inner) => Node::Node16(Box::new(inner.resized::<V, Node16Mapping<V>>())),
            Node::Node16(inner) => Node::Node48(Box::new(inner.resized::<V, Node48Mapping<V>>())),
            Node::Node48(inner) => {
                Node::Node256(Box::new(inner.resized::<V, Node256Mapping<V>>()))
            }
            Node::Node256(_) => unreachable!("Node256 has a slot for every byte"),
            Node::Leaf(_) => unreachable!("leaves cannot take children"),
        };
        trace!(
            "grew {} to {} at {} children",
            self.kind().name(),
            grown.kind().name(),
            grown.num_children()
        );
        *self = grown;
    }

    /// Moves an underfull node to a narrower shape. A `Node4` left with a single child is replaced
    /// by that child, merging the path segments when they fit inline.
    pub(crate) fn shrink(&mut self) {
        let shrunk = match self {
            Node::Node4(inner) if inner.mapping.num_children() == 1 => {
                let child = inner.mapping.child_at(0);
                let merged = match child.header() {
                    None => None,
                    Some(child_header) => {
                        let edge = inner.mapping.key_at(0);
                        match inner
                            .header
                            .partial
                            .partial_extended_with(edge, &child_header.partial)
                        {
                            Some(merged) => Some(merged),
                            None => return,
                        }
                    }
                };
                let mut child = inner.mapping.delete_child_at(0);
                if let (Some(merged), Some(header)) = (merged, child.header_mut()) {
                    header.partial = merged;
                }
                child
            }
            Node::Node16(inner) if inner.mapping.num_children() < 5 => {
                Node::Node4(Box::new(inner.resized::<V, Node4Mapping<V>>()))
            }
            Node::Node48(inner) if inner.mapping.num_children() < 17 => {
                Node::Node16(Box::new(inner.resized::<V, Node16Mapping<V>>()))
            }
            Node::Node256(inner) if inner.mapping.num_children() < 49 => {
                Node::Node48(Box::new(inner.resized::<V, Node48Mapping<V>>()))
            }
            _ => return,
        };
        trace!(
            "shrank {} to {}",
            self.kind().name(),
            shrunk.kind().name()
        );
        *self = shrunk;
    }

    /// Children in ascending key byte order.
    pub(crate) fn iter(&self) -> Box<dyn Iterator<Item = (u8, &Node<V>)> + '_> {
        match self {
            Node::Node4(inner) => Box::new(inner.mapping.iter()),
            Node::Node16(inner) => Box::new(inner.mapping.iter()),
            Node::Node48(inner) => Box::new(inner.mapping.iter()),
            Node::Node256(inner) => Box::new(inner.mapping.iter()),
            Node::Leaf(_) => Box::new(std::iter::empty()),
        }
    }
}

/// A mutable handle on the place a node lives: the tree root or a child cell inside a parent.
///
/// Insertion walks down the tree with one of these, and whatever it writes through the handle
/// becomes visible from the parent.
pub(crate) struct ChildSlot<'a, V> {
    slot: &'a mut Option<Node<V>>,
}

impl<'a, V> ChildSlot<'a, V> {
    pub(crate) fn new(slot: &'a mut Option<Node<V>>) -> Self {
        Self { slot }
    }

    #[inline]
    pub(crate) fn node(&self) -> Option<&Node<V>> {
        self.slot.as_ref()
    }

    #[inline]
    pub(crate) fn node_mut(&mut self) -> Option<&mut Node<V>> {
        self.slot.as_mut()
    }

    /// Stores `node` in the slot, returning whatever was there.
    #[inline]
    pub(crate) fn replace(&mut self, node: Node<V>) -> Option<Node<V>> {
        self.slot.replace(node)
    }

    /// Takes the node out, leaving the slot vacant until the next [`ChildSlot::replace`].
    pub(crate) fn take_node(&mut self) -> Node<V> {
        match self.slot.take() {
            Some(node) => node,
            None => panic!("take_node on a vacant child slot"),
        }
    }

    /// Consumes the handle, returning one for the child at `index` of the node held here.
    pub(crate) fn into_child(self, index: usize) -> ChildSlot<'a, V> {
        let slot = self.slot;
        match slot {
            Some(node) => ChildSlot::new(node.child_slot_at(index)),
            None => panic!("cannot descend through a vacant child slot"),
        }
    }

    /// Adds a child to the node held here, promoting it in place if it is full.
    pub(crate) fn add_child(&mut self, key: u8, child: Node<V>) {
        match self.slot.as_mut() {
            Some(node) => node.add_child(key, child),
            None => panic!("add_child on a vacant child slot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{ChildSlot, Node, NodeKind, Partial};

    fn leaf(byte: u8) -> Node<u8> {
        Node::new_leaf(&[byte], byte)
    }

    fn value_of(node: &Node<u8>) -> u8 {
        node.leaf().map(|l| l.value).unwrap()
    }

    #[test]
    fn test_n4() {
        let mut n4 = Node::new_4(Partial::from_slice(&[1, 2, 3]));
        n4.add_child(5, leaf(1));
        n4.add_child(4, leaf(2));
        n4.add_child(3, leaf(3));
        n4.add_child(2, leaf(4));

        assert_eq!(n4.kind(), NodeKind::Node4);
        assert_eq!(n4.partial_len(), 3);
        assert_eq!(value_of(n4.child(5).unwrap()), 1);
        assert_eq!(value_of(n4.child(4).unwrap()), 2);
        assert_eq!(value_of(n4.child(3).unwrap()), 3);
        assert_eq!(value_of(n4.child(2).unwrap()), 4);
        assert!(n4.child(6).is_none());

        let keys: Vec<u8> = n4.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![2, 3, 4, 5]);

        n4.delete_child(5);
        assert!(n4.child(5).is_none());
        assert_eq!(value_of(n4.child(4).unwrap()), 2);
        assert_eq!(n4.num_children(), 3);
    }

    #[test]
    fn test_grows_through_every_shape() {
        let mut node = Node::new_4(Partial::from_slice(&[9, 9]));
        for i in 0..=255u8 {
            node.add_child(i, leaf(i));
            let expected = match i {
                0..=3 => NodeKind::Node4,
                4..=15 => NodeKind::Node16,
                16..=47 => NodeKind::Node48,
                _ => NodeKind::Node256,
            };
            assert_eq!(node.kind(), expected, "after adding {i}");
        }
        assert_eq!(node.num_children(), 256);
        assert_eq!(node.header().unwrap().partial.as_ref(), &[9, 9]);
        for i in 0..=255u8 {
            assert_eq!(value_of(node.child(i).unwrap()), i);
        }
        let keys: Vec<u8> = node.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, (0..=255u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_shrinks_back_down() {
        let mut node = Node::new_256(Partial::new());
        for i in 0..49u8 {
            node.add_child(i, leaf(i));
        }
        node.shrink();
        assert_eq!(node.kind(), NodeKind::Node256);

        node.delete_child(48);
        node.shrink();
        assert_eq!(node.kind(), NodeKind::Node48);

        for i in 16..48u8 {
            node.delete_child(i);
        }
        node.shrink();
        assert_eq!(node.kind(), NodeKind::Node16);

        for i in 4..16u8 {
            node.delete_child(i);
        }
        node.shrink();
        assert_eq!(node.kind(), NodeKind::Node4);
        for i in 0..4u8 {
            assert_eq!(value_of(node.child(i).unwrap()), i);
        }
    }

    #[test]
    fn test_single_leaf_child_collapses() {
        let mut node = Node::new_4(Partial::from_slice(&[1]));
        node.add_child(2, Node::new_leaf(&[1, 2], 12u8));
        node.add_child(3, Node::new_leaf(&[1, 3], 13u8));
        node.delete_child(3);
        node.shrink();
        assert!(node.is_leaf());
        assert_eq!(node.leaf().unwrap().key(), &[1, 2]);
    }

    #[test]
    fn test_single_inner_child_merges_partials() {
        let mut child = Node::new_4(Partial::from_slice(&[4, 5]));
        child.add_child(6, leaf(6));
        child.add_child(7, leaf(7));

        let mut node = Node::new_4(Partial::from_slice(&[1, 2]));
        node.add_child(3, child);
        node.shrink();
        assert_eq!(node.kind(), NodeKind::Node4);
        assert_eq!(node.header().unwrap().partial.as_ref(), &[1, 2, 3, 4, 5]);
        assert_eq!(node.num_children(), 2);

        let mut long_child = Node::new_4(Partial::from_slice(&[1, 2, 3, 4, 5]));
        long_child.add_child(6, leaf(6));
        long_child.add_child(7, leaf(7));
        let mut node = Node::new_4(Partial::from_slice(&[1, 2, 3]));
        node.add_child(0, long_child);
        node.shrink();
        // Nine bytes do not fit inline, so the chain stays.
        assert_eq!(node.num_children(), 1);
        assert_eq!(node.partial_len(), 3);
    }

    #[test]
    fn test_slot_replacement_is_visible_from_parent() {
        let mut root = Some(Node::new_4(Partial::new()));
        let mut slot = ChildSlot::new(&mut root);
        slot.add_child(1, leaf(1));
        slot.add_child(2, leaf(2));

        let index = slot.node().and_then(|n| n.find_child(2)).unwrap();
        let mut child = slot.into_child(index);
        let old = child.take_node();
        assert_eq!(old.into_value(), Some(2));
        child.replace(Node::new_leaf(&[2], 20));

        let root = root.unwrap();
        assert_eq!(value_of(root.child(2).unwrap()), 20);
        assert_eq!(root.num_children(), 2);
    }

    #[test]
    fn test_promotion_through_slot() {
        let mut root = Some(Node::new_4(Partial::from_slice(&[7])));
        let mut slot = ChildSlot::new(&mut root);
        for i in 0..5u8 {
            slot.add_child(i, leaf(i));
        }
        assert_eq!(slot.node().map(Node::kind), Some(NodeKind::Node16));
        assert_eq!(root.as_ref().map(Node::num_children), Some(5));
        assert_eq!(root.as_ref().and_then(Node::header).map(|h| h.partial.len()), Some(1));
    }

    #[test]
    fn test_leaf_prefix() {
        let leaf = Node::new_leaf(&[1, 2, 3, 4], ());
        let leaf = leaf.leaf().unwrap();
        assert!(leaf.key_equals(&[1, 2, 3, 4]));
        assert!(!leaf.key_equals(&[1, 2, 3]));
        assert_eq!(leaf.longest_common_prefix(&[1, 2, 3, 9], 0), 3);
        assert_eq!(leaf.longest_common_prefix(&[1, 2, 3, 9], 2), 1);
        assert_eq!(leaf.longest_common_prefix(&[1, 2], 2), 0);
        assert_eq!(leaf.longest_common_prefix(&[1], 3), 0);
    }

    #[test]
    #[should_panic(expected = "already mapped")]
    fn test_duplicate_child_is_fatal() {
        let mut n4 = Node::new_4(Partial::new());
        n4.add_child(1, leaf(1));
        n4.add_child(1, leaf(1));
    }

    #[test]
    #[should_panic(expected = "no child mapped")]
    fn test_deleting_unmapped_child_is_fatal() {
        let mut n4 = Node::new_4(Partial::new());
        n4.add_child(1, leaf(1));
        n4.delete_child(2);
    }
}
