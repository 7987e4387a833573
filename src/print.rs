use std::fmt::{Debug, Display, Formatter, Result, Write};

use crate::node::Node;
use crate::tree::AdaptiveRadixTree;

impl<V: Debug> Display for AdaptiveRadixTree<V> {
    /// Draws the tree one node per line, children ordered by key byte:
    ///
    /// ```text
    /// ○ Node4 {childs=2, partial=[]}
    /// ├──○ 10: 3[10, 20, 30] -> 1
    /// └──○ 11: 3[11, 21, 31] -> 2
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let Some(root) = self.root() else {
            return f.write_str("<>");
        };
        f.write_str("○ ")?;
        write_node(f, root, "")
    }
}

fn write_node<V: Debug>(f: &mut Formatter<'_>, node: &Node<V>, indent: &str) -> Result {
    if let Some(leaf) = node.leaf() {
        return write!(f, "{}{:?} -> {:?}", leaf.key().len(), leaf.key(), leaf.value);
    }
    if let Some(header) = node.header() {
        write!(
            f,
            "{} {{childs={}, partial={:?}}}",
            node.kind().name(),
            node.num_children(),
            header.partial
        )?;
    }

    let count = node.num_children();
    for (i, (key, child)) in node.iter().enumerate() {
        let last = i + 1 == count;
        f.write_char('\n')?;
        f.write_str(indent)?;
        f.write_str(if last { "└──○ " } else { "├──○ " })?;
        write!(f, "{key}: ")?;
        let child_indent = format!("{indent}{}", if last { "   " } else { "│  " });
        write_node(f, child, &child_indent)?;
    }
    Ok(())
}
