//! Contact graph representation and clique extraction

pub mod algorithms;
pub mod builder;
pub mod compressed;

pub use builder::ContactGraphBuilder;
pub use compressed::DayGraph;

use std::collections::BTreeMap;

/// Node address
pub type Node = u32;

/// Day bucket index
pub type Day = u32;

/// Per-day contact graphs in ascending day order
#[derive(Debug, Clone, Default)]
pub struct ContactIndex {
    days: BTreeMap<Day, DayGraph>,
}

impl ContactIndex {
    pub fn new(days: BTreeMap<Day, DayGraph>) -> Self {
        Self { days }
    }

    pub fn day(&self, day: Day) -> Option<&DayGraph> {
        self.days.get(&day)
    }

    /// Sorted neighbors of `node` on `day`; empty for unindexed days or nodes
    pub fn neighbors(&self, day: Day, node: Node) -> &[Node] {
        self.days
            .get(&day)
            .map(|graph| graph.neighbors(node))
            .unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (Day, &DayGraph)> {
        self.days.iter().map(|(&day, graph)| (day, graph))
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Undirected edges summed over all days
    pub fn edge_count(&self) -> usize {
        self.days.values().map(|g| g.edge_count()).sum()
    }
}
