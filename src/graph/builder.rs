//! Contact graph construction module

use crate::graph::{ContactIndex, Day, DayGraph, Node};
use std::collections::{BTreeMap, BTreeSet};

/// Builder that buckets connect events into per-day neighbor sets
pub struct ContactGraphBuilder {
    /// Length of one day bucket in seconds
    day_length: u64,

    /// day -> node -> neighbors seen in that bucket
    days: BTreeMap<Day, BTreeMap<Node, BTreeSet<Node>>>,

    /// Connect events recorded, self-contacts excluded
    contact_count: usize,
}

impl ContactGraphBuilder {
    pub fn new(day_length: u64) -> Self {
        Self {
            day_length: day_length.max(1),
            days: BTreeMap::new(),
            contact_count: 0,
        }
    }

    /// Day bucket of a timestamp in seconds
    pub fn day_of(&self, timestamp: f64) -> Day {
        (timestamp / self.day_length as f64).floor() as Day
    }

    /// Get or create the adjacency map of a day
    fn day_adjacency(&mut self, day: Day) -> &mut BTreeMap<Node, BTreeSet<Node>> {
        self.days.entry(day).or_default()
    }

    /// Record a connect event between two nodes
    pub fn add_contact(&mut self, timestamp: f64, a: Node, b: Node) {
        if a == b {
            return;
        }

        let day = self.day_of(timestamp);
        let adjacency = self.day_adjacency(day);
        adjacency.entry(a).or_default().insert(b);
        adjacency.entry(b).or_default().insert(a);
        self.contact_count += 1;
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    /// Freeze every day bucket into a compressed graph
    pub fn build(self) -> ContactIndex {
        let days = self
            .days
            .iter()
            .map(|(&day, adjacency)| (day, DayGraph::from_adjacency(adjacency)))
            .collect();

        ContactIndex::new(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_are_bucketed_by_day() {
        let mut builder = ContactGraphBuilder::new(86_400);
        builder.add_contact(10.0, 1, 2);
        builder.add_contact(86_399.9, 2, 3);
        builder.add_contact(86_400.0, 1, 3);

        let index = builder.build();
        assert_eq!(index.neighbors(0, 2), &[1, 3]);
        assert_eq!(index.neighbors(1, 1), &[3]);
        assert!(index.neighbors(1, 2).is_empty());
    }

    #[test]
    fn test_repeated_contacts_are_deduplicated() {
        let mut builder = ContactGraphBuilder::new(100);
        builder.add_contact(1.0, 5, 6);
        builder.add_contact(2.0, 6, 5);
        builder.add_contact(3.0, 5, 6);

        assert_eq!(builder.contact_count(), 3);
        let index = builder.build();
        assert_eq!(index.neighbors(0, 5), &[6]);
        assert_eq!(index.neighbors(0, 6), &[5]);
    }

    #[test]
    fn test_self_contact_is_ignored() {
        let mut builder = ContactGraphBuilder::new(100);
        builder.add_contact(1.0, 4, 4);
        assert_eq!(builder.contact_count(), 0);
        assert!(builder.build().day(0).is_none());
    }

    #[test]
    fn test_unseen_day_is_empty() {
        let index = ContactGraphBuilder::new(100).build();
        assert!(index.neighbors(3, 1).is_empty());
    }
}
