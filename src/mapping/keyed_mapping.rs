use crate::mapping::NodeMapping;
use crate::utils::u8_keys::{u8_keys_find_insert_position, u8_keys_find_key_position};

/// Parallel arrays of key bytes and children, kept sorted by key. Used for the 4 and 16 wide
/// node shapes, where a scan over a handful of bytes is the fastest lookup.
pub struct KeyedMapping<N, const WIDTH: usize> {
    keys: [u8; WIDTH],
    children: [Option<N>; WIDTH],
    num_children: u8,
}

impl<N, const WIDTH: usize> Default for KeyedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> KeyedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [0; WIDTH],
            children: std::array::from_fn(|_| None),
            num_children: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.keys
            .iter()
            .zip(self.children.iter())
            .take(self.num_children as usize)
            .filter_map(|(&k, c)| c.as_ref().map(|c| (k, c)))
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.num_children as usize,
            "child index {index} is not populated ({} children)",
            self.num_children
        );
    }
}

impl<N, const WIDTH: usize> NodeMapping<N> for KeyedMapping<N, WIDTH> {
    const WIDTH: usize = WIDTH;

    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let count = self.num_children as usize;
        assert!(count < WIDTH, "add_child: no space left for key {key}");
        let idx = u8_keys_find_insert_position::<WIDTH>(key, &self.keys, count);
        assert!(
            idx == 0 || self.keys[idx - 1] != key,
            "add_child: key {key} is already mapped"
        );
        self.keys.copy_within(idx..count, idx + 1);
        self.children[idx..=count].rotate_right(1);
        self.keys[idx] = key;
        self.children[idx] = Some(node);
        self.num_children += 1;
    }

    #[inline]
    fn find_child(&self, key: u8) -> Option<usize> {
        u8_keys_find_key_position::<WIDTH>(key, &self.keys, self.num_children as usize)
    }

    fn key_at(&self, index: usize) -> u8 {
        self.check_index(index);
        self.keys[index]
    }

    fn child_at(&self, index: usize) -> &N {
        self.check_index(index);
        match &self.children[index] {
            Some(child) => child,
            None => unreachable!("populated child slot {index} is vacant"),
        }
    }

    fn child_slot_at(&mut self, index: usize) -> &mut Option<N> {
        self.check_index(index);
        &mut self.children[index]
    }

    fn delete_child_at(&mut self, index: usize) -> N {
        self.check_index(index);
        let count = self.num_children as usize;
        let node = self.children[index].take();
        self.children[index..count].rotate_left(1);
        self.keys.copy_within(index + 1..count, index);
        self.keys[count - 1] = 0;
        self.num_children -= 1;
        match node {
            Some(node) => node,
            None => unreachable!("populated child slot {index} is vacant"),
        }
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn move_into<M: NodeMapping<N>>(&mut self, other: &mut M) {
        let count = self.num_children as usize;
        for (key, child) in self.keys[..count].iter().zip(self.children[..count].iter_mut()) {
            if let Some(child) = child.take() {
                other.add_child(*key, child);
            }
        }
        self.num_children = 0;
    }
}
