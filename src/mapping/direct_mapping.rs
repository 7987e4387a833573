use crate::mapping::NodeMapping;

/// One slot per possible key byte. The index of a child is its key byte.
pub struct DirectMapping<N> {
    children: [Option<N>; 256],
    num_children: usize,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: std::array::from_fn(|_| None),
            num_children: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &N)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(key, child)| child.as_ref().map(|c| (key as u8, c)))
    }
}

impl<N> NodeMapping<N> for DirectMapping<N> {
    const WIDTH: usize = 256;

    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let slot = &mut self.children[key as usize];
        assert!(slot.is_none(), "add_child: key {key} is already mapped");
        *slot = Some(node);
        self.num_children += 1;
    }

    #[inline]
    fn find_child(&self, key: u8) -> Option<usize> {
        self.children[key as usize]
            .is_some()
            .then_some(key as usize)
    }

    fn key_at(&self, index: usize) -> u8 {
        assert!(
            self.children[index].is_some(),
            "child index {index} is not populated"
        );
        index as u8
    }

    fn child_at(&self, index: usize) -> &N {
        match &self.children[index] {
            Some(child) => child,
            None => panic!("child index {index} is not populated"),
        }
    }

    fn child_slot_at(&mut self, index: usize) -> &mut Option<N> {
        let slot = &mut self.children[index];
        assert!(slot.is_some(), "child index {index} is not populated");
        slot
    }

    #[inline]
    fn delete_child_at(&mut self, index: usize) -> N {
        match self.children[index].take() {
            Some(child) => {
                self.num_children -= 1;
                child
            }
            None => panic!("child index {index} is not populated"),
        }
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children
    }

    fn move_into<M: NodeMapping<N>>(&mut self, other: &mut M) {
        for (key, child) in self.children.iter_mut().enumerate() {
            if let Some(child) = child.take() {
                other.add_child(key as u8, child);
            }
        }
        self.num_children = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::direct_mapping::DirectMapping;
    use crate::mapping::indexed_mapping::IndexedMapping;

    #[test]
    fn test_add_seek_delete() {
        let mut node = DirectMapping::<u8>::new();
        for i in 0..=255u8 {
            node.add_child(i, i);
        }
        assert!(node.is_full());
        assert_eq!(node.find_child(200), Some(200));
        assert_eq!(node.key_at(17), 17);
        for i in 0..=255u8 {
            assert_eq!(node.delete_child(i), i);
        }
        assert_eq!(node.num_children(), 0);
        assert_eq!(node.find_child(200), None);
    }

    #[test]
    fn move_into_indexed() {
        let mut node = DirectMapping::<u8>::new();
        for i in (0..=255u8).step_by(8) {
            node.add_child(i, i);
        }
        let mut indexed = IndexedMapping::<u8, 48>::new();
        node.move_into(&mut indexed);
        assert_eq!(indexed.num_children(), 32);
        let keys: Vec<u8> = indexed.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, (0..=255u8).step_by(8).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "not populated")]
    fn deleting_vacant_slot_is_fatal() {
        let mut node = DirectMapping::<u8>::new();
        node.delete_child_at(9);
    }
}
