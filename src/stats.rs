//! Structural statistics for an [`AdaptiveRadixTree`](crate::tree::AdaptiveRadixTree).

use std::collections::HashMap;

use crate::node::Node;

pub trait TreeStatsTrait {
    fn get_tree_stats(&self) -> TreeStats;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeStats {
    pub width: usize,
    pub node_type: String,
    pub total_nodes: usize,
    pub total_children: usize,
    /// Fraction of child slots in use across all nodes of this type.
    pub density: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeStats {
    /// Inner node statistics keyed by node type name (`"Node4"`, `"Node16"`, ...).
    pub node_stats: HashMap<String, NodeStats>,
    pub num_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    /// Number of nodes on the longest root to leaf path.
    pub max_height: usize,
}

pub(crate) fn collect_tree_stats<V>(root: Option<&Node<V>>) -> TreeStats {
    let mut stats = TreeStats::default();
    let Some(root) = root else {
        return stats;
    };
    update_tree_stats(&mut stats, root, 1);

    let mut total_children = 0;
    let mut total_width = 0;
    for ns in stats.node_stats.values_mut() {
        total_children += ns.total_children;
        total_width += ns.width * ns.total_nodes;
        ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
    }
    stats.num_inner_nodes = stats.node_stats.values().map(|ns| ns.total_nodes).sum();
    if total_width > 0 {
        stats.total_density = total_children as f64 / total_width as f64;
    }
    stats
}

fn update_tree_stats<V>(stats: &mut TreeStats, node: &Node<V>, height: usize) {
    stats.max_height = stats.max_height.max(height);
    if node.is_leaf() {
        stats.num_leaves += 1;
        return;
    }

    let kind = node.kind();
    let num_children = node.num_children();
    stats
        .node_stats
        .entry(kind.name().to_string())
        .and_modify(|e| {
            e.total_nodes += 1;
            e.total_children += num_children;
        })
        .or_insert(NodeStats {
            width: node.capacity(),
            node_type: kind.name().to_string(),
            total_nodes: 1,
            total_children: num_children,
            density: 0.0,
        });

    for (_, child) in node.iter() {
        update_tree_stats(stats, child, height + 1);
    }
}
