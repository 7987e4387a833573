use crate::node::Node;

type ChildIter<'a, V> = Box<dyn Iterator<Item = (u8, &'a Node<V>)> + 'a>;

/// Depth-first walk over the leaves of a tree, yielding entries in ascending key order.
pub struct Iter<'a, V> {
    root: Option<&'a Node<V>>,
    stack: Vec<ChildIter<'a, V>>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    fn visit(&mut self, node: &'a Node<V>) -> Option<(&'a [u8], &'a V)> {
        match node.leaf() {
            Some(leaf) => Some((leaf.key(), &leaf.value)),
            None => {
                self.stack.push(node.iter());
                None
            }
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            if let Some(entry) = self.visit(root) {
                return Some(entry);
            }
        }
        while let Some(children) = self.stack.last_mut() {
            match children.next() {
                Some((_, child)) => {
                    if let Some(entry) = self.visit(child) {
                        return Some(entry);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
