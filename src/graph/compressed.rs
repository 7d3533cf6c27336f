//! Compressed per-day contact graph

use crate::graph::Node;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Compressed sparse row snapshot of one day's undirected contact graph.
///
/// Both directions of every contact are stored, so `neighbors` returns the
/// full neighbor set of a node. Node ids and every adjacency list are sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayGraph {
    /// Nodes with at least one contact that day, ascending
    nodes: Vec<Node>,

    /// offsets[i] to offsets[i+1] defines the neighbor range of nodes[i]
    offsets: Vec<u32>,

    /// Concatenated sorted neighbor lists
    edges: Vec<Node>,
}

impl DayGraph {
    /// Freeze an adjacency map into the compressed layout
    pub fn from_adjacency(adjacency: &BTreeMap<Node, BTreeSet<Node>>) -> Self {
        let edge_count: usize = adjacency.values().map(|n| n.len()).sum();

        let mut nodes = Vec::with_capacity(adjacency.len());
        let mut offsets = Vec::with_capacity(adjacency.len() + 1);
        let mut edges = Vec::with_capacity(edge_count);

        offsets.push(0);
        for (&node, neighbors) in adjacency {
            if neighbors.is_empty() {
                continue;
            }
            nodes.push(node);
            edges.extend(neighbors.iter().copied());
            offsets.push(edges.len() as u32);
        }

        Self {
            nodes,
            offsets,
            edges,
        }
    }

    fn position(&self, node: Node) -> Option<usize> {
        self.nodes.binary_search(&node).ok()
    }

    /// Sorted neighbors of a node; empty if the node had no contact
    pub fn neighbors(&self, node: Node) -> &[Node] {
        match self.position(node) {
            Some(pos) => {
                let start = self.offsets[pos] as usize;
                let end = self.offsets[pos + 1] as usize;
                &self.edges[start..end]
            }
            None => &[],
        }
    }

    /// Check if two nodes were in contact
    pub fn has_edge(&self, a: Node, b: Node) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    pub fn degree(&self, node: Node) -> usize {
        self.neighbors(node).len()
    }

    /// Nodes with at least one neighbor, ascending
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> DayGraph {
        let mut adjacency: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();
        for (a, b) in [(1, 2), (1, 3), (2, 3), (3, 7)] {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        DayGraph::from_adjacency(&adjacency)
    }

    #[test]
    fn test_neighbors_are_sorted() {
        let graph = triangle_with_tail();
        assert_eq!(graph.neighbors(3), &[1, 2, 7]);
        assert_eq!(graph.neighbors(7), &[3]);
        assert_eq!(graph.nodes(), &[1, 2, 3, 7]);
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let graph = triangle_with_tail();
        assert!(graph.neighbors(42).is_empty());
        assert_eq!(graph.degree(42), 0);
        assert!(!graph.has_edge(42, 1));
    }

    #[test]
    fn test_edge_queries() {
        let graph = triangle_with_tail();
        assert!(graph.has_edge(1, 2));
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(1, 7));
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.node_count(), 4);
    }
}
