//! Child storage for the inner node shapes.
//!
//! Every mapping addresses its children by an *index*: an opaque position that stays valid until
//! the next mutation of the mapping. Descent code looks a child up once with
//! [`NodeMapping::find_child`] and then reaches the child's storage through
//! [`NodeMapping::child_slot_at`], so that it can be replaced in place.

pub mod direct_mapping;
pub mod indexed_mapping;
pub mod keyed_mapping;

pub trait NodeMapping<N> {
    /// Maximum number of children this mapping holds.
    const WIDTH: usize;

    /// Maps `key` to `node`. The mapping must not be full and `key` must not already be mapped.
    fn add_child(&mut self, key: u8, node: N);

    /// Index of the child stored under `key`.
    fn find_child(&self, key: u8) -> Option<usize>;

    /// Key byte for a populated index.
    fn key_at(&self, index: usize) -> u8;

    fn child_at(&self, index: usize) -> &N;

    /// Storage for a populated index. Callers may take the child out temporarily, but must put a
    /// child back before the mapping is used again.
    fn child_slot_at(&mut self, index: usize) -> &mut Option<N>;

    /// Removes and returns the child at a populated index.
    fn delete_child_at(&mut self, index: usize) -> N;

    fn num_children(&self) -> usize;

    /// Moves every child into `other` in ascending key order, leaving `self` empty.
    fn move_into<M: NodeMapping<N>>(&mut self, other: &mut M);

    fn seek_child(&self, key: u8) -> Option<&N> {
        self.find_child(key).map(|index| self.child_at(index))
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let index = self.find_child(key)?;
        self.child_slot_at(index).as_mut()
    }

    fn delete_child(&mut self, key: u8) -> N {
        match self.find_child(key) {
            Some(index) => self.delete_child_at(index),
            None => panic!("delete_child: no child mapped under key {key}"),
        }
    }

    #[inline(always)]
    fn is_full(&self) -> bool {
        self.num_children() >= Self::WIDTH
    }

    #[inline(always)]
    fn width(&self) -> usize {
        Self::WIDTH
    }
}
