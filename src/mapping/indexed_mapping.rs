use crate::mapping::NodeMapping;
use crate::utils::bitset::{Bitset64, BitsetTrait};

const EMPTY: u8 = u8::MAX;

/// A 256-entry byte table pointing into a compact array of child positions. Used for the
/// 48 wide node shape.
pub struct IndexedMapping<N, const WIDTH: usize> {
    child_index: [u8; 256],
    children: [Option<N>; WIDTH],
    occupied: Bitset64<1>,
    num_children: u8,
}

impl<N, const WIDTH: usize> Default for IndexedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> IndexedMapping<N, WIDTH> {
    pub fn new() -> Self {
        assert!(WIDTH <= 64, "indexed mapping tracks at most 64 positions");
        Self {
            child_index: [EMPTY; 256],
            children: std::array::from_fn(|_| None),
            occupied: Bitset64::new(),
            num_children: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.child_index
            .iter()
            .enumerate()
            .filter(|(_, pos)| **pos != EMPTY)
            .filter_map(move |(key, pos)| {
                self.children[*pos as usize]
                    .as_ref()
                    .map(|child| (key as u8, child))
            })
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < WIDTH && self.occupied.check(index),
            "child index {index} is not populated"
        );
    }
}

impl<N, const WIDTH: usize> NodeMapping<N> for IndexedMapping<N, WIDTH> {
    const WIDTH: usize = WIDTH;

    fn add_child(&mut self, key: u8, node: N) {
        assert!(
            self.child_index[key as usize] == EMPTY,
            "add_child: key {key} is already mapped"
        );
        let pos = match self.occupied.first_empty() {
            Some(pos) if pos < WIDTH => pos,
            _ => panic!("add_child: no space left for key {key}"),
        };
        self.occupied.set(pos);
        self.child_index[key as usize] = pos as u8;
        self.children[pos] = Some(node);
        self.num_children += 1;
    }

    #[inline]
    fn find_child(&self, key: u8) -> Option<usize> {
        let pos = self.child_index[key as usize];
        (pos != EMPTY).then_some(pos as usize)
    }

    fn key_at(&self, index: usize) -> u8 {
        self.check_index(index);
        match self.child_index.iter().position(|&pos| pos as usize == index) {
            Some(key) => key as u8,
            None => unreachable!("populated position {index} has no key"),
        }
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
        let key = self.key_at(index);
        self.delete_child(key)
    }

    fn delete_child(&mut self, key: u8) -> N {
        let pos = self.child_index[key as usize];
        assert!(pos != EMPTY, "delete_child: no child mapped under key {key}");
        self.child_index[key as usize] = EMPTY;
        self.occupied.unset(pos as usize);
        self.num_children -= 1;
        match self.children[pos as usize].take() {
            Some(child) => child,
            None => unreachable!("populated child slot {pos} is vacant"),
        }
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn move_into<M: NodeMapping<N>>(&mut self, other: &mut M) {
        for (key, pos) in self.child_index.iter_mut().enumerate() {
            if *pos == EMPTY {
                continue;
            }
            if let Some(child) = self.children[*pos as usize].take() {
                other.add_child(key as u8, child);
            }
            *pos = EMPTY;
        }
        self.occupied.clear();
        self.num_children = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::indexed_mapping::IndexedMapping;
    use crate::mapping::keyed_mapping::KeyedMapping;

    #[test]
    fn test_size_stays_compact() {
        assert!(std::mem::size_of::<IndexedMapping<u8, 48>>() <= 512);
    }

    #[test]
    fn test_basic_mapping() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        for i in 0..48 {
            mapping.add_child(i, i);
            assert_eq!(*mapping.seek_child(i).unwrap(), i);
        }
        assert!(mapping.is_full());
        for i in 0..48 {
            assert_eq!(*mapping.seek_child(i).unwrap(), i);
        }
        for i in 0..48 {
            assert_eq!(mapping.delete_child(i), i);
        }
        for i in 0..48 {
            assert!(mapping.seek_child(i as u8).is_none());
        }
        assert_eq!(mapping.num_children(), 0);
    }

    #[test]
    fn positions_are_reused() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        for i in 0..48u8 {
            mapping.add_child(i * 5, i);
        }
        assert_eq!(mapping.delete_child(50), 10);
        mapping.add_child(251, 99);
        assert!(mapping.is_full());
        let idx = mapping.find_child(251).unwrap();
        assert_eq!(mapping.key_at(idx), 251);
        assert_eq!(*mapping.child_at(idx), 99);
    }

    #[test]
    fn iterates_in_key_order() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        for key in [250u8, 1, 128, 7] {
            mapping.add_child(key, key);
        }
        let keys: Vec<u8> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 7, 128, 250]);

        let mut keyed = KeyedMapping::<u8, 16>::new();
        mapping.move_into(&mut keyed);
        assert_eq!(mapping.num_children(), 0);
        assert_eq!(mapping.iter().count(), 0);
        let keys: Vec<u8> = keyed.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 7, 128, 250]);
    }

    #[test]
    #[should_panic(expected = "already mapped")]
    fn duplicate_key_is_fatal() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        mapping.add_child(3, 1);
        mapping.add_child(3, 2);
    }

    #[test]
    #[should_panic(expected = "not populated")]
    fn vacant_index_is_fatal() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        mapping.add_child(3, 1);
        mapping.delete_child_at(1);
    }
}
