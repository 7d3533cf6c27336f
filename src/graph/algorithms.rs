//! Clique extraction over daily contact graphs

use crate::cluster::{Clique, DailyCliques};
use crate::config::Config;
use crate::graph::{ContactIndex, DayGraph, Node};
use itertools::Itertools;
use log;

/// Intersection of two ascending slices
pub fn intersect_sorted(a: &[Node], b: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    out
}

/// Grow a clique from the contact `seed_a`–`seed_b`.
///
/// Greedy heuristic: the candidate set is the intersection of every member's
/// neighbor list, and its smallest node is appended until the set is empty.
/// The result is maximal but not necessarily maximum.
pub fn grow_clique(graph: &DayGraph, seed_a: Node, seed_b: Node) -> Clique {
    let mut members = vec![seed_a, seed_b];
    let mut candidates = intersect_sorted(graph.neighbors(seed_a), graph.neighbors(seed_b));

    while let Some(&next) = candidates.first() {
        members.push(next);
        candidates = intersect_sorted(&candidates, graph.neighbors(next));
    }

    Clique::new(members)
}

/// Cliques of one contact graph, first occurrence kept, smaller than `min_size` dropped
pub fn extract_day_cliques(graph: &DayGraph, min_size: usize) -> Vec<Clique> {
    let mut grown = Vec::new();

    for &node in graph.nodes() {
        for &neighbor in graph.neighbors(node) {
            grown.push(grow_clique(graph, node, neighbor));
        }
    }

    grown
        .into_iter()
        .unique()
        .filter(|clique| clique.len() >= min_size)
        .collect()
}

/// Extract the cliques of every clique day from the previous day's contacts
pub fn extract_cliques(index: &ContactIndex, config: &Config) -> DailyCliques {
    log::info!(
        "Extracting cliques (K = {}) for days {:?}",
        config.min_clique_size,
        config.clique_days()
    );

    let mut daily = DailyCliques::default();

    for day in config.clique_days() {
        // day 0 has no previous day to build from
        let Some(source_day) = day.checked_sub(1) else {
            continue;
        };
        let graph = match index.day(source_day) {
            Some(graph) => graph,
            None => {
                log::debug!("Day {}: no contacts recorded on day {}", day, source_day);
                continue;
            }
        };

        let cliques = extract_day_cliques(graph, config.min_clique_size);
        log::debug!(
            "Day {}: {} cliques from {} nodes / {} edges",
            day,
            cliques.len(),
            graph.node_count(),
            graph.edge_count()
        );

        daily.insert(day, cliques);
    }

    log::info!(
        "Found {} cliques over {} days",
        daily.clique_count(),
        daily.day_count()
    );

    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ContactGraphBuilder;

    fn day_graph(edges: &[(Node, Node)]) -> DayGraph {
        let mut builder = ContactGraphBuilder::new(100);
        for &(a, b) in edges {
            builder.add_contact(0.0, a, b);
        }
        builder.build().day(0).cloned().unwrap_or_default()
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), vec![3, 7]);
        assert!(intersect_sorted(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn test_grow_clique_takes_smallest_extension() {
        // 1-2 share 3 and 4, but 3 and 4 are not adjacent
        let graph = day_graph(&[(1, 2), (1, 3), (2, 3), (1, 4), (2, 4)]);
        let clique = grow_clique(&graph, 1, 2);
        assert_eq!(clique.members(), &[1, 2, 3]);
    }

    #[test]
    fn test_triangle_yields_single_clique() {
        let graph = day_graph(&[(10, 11), (10, 12), (11, 12)]);
        let cliques = extract_day_cliques(&graph, 3);
        assert_eq!(cliques.len(), 1);
        assert_eq!(cliques[0].members(), &[10, 11, 12]);
    }

    #[test]
    fn test_small_cliques_are_dropped() {
        let graph = day_graph(&[(1, 2), (2, 3)]);
        assert!(extract_day_cliques(&graph, 3).is_empty());
        assert_eq!(extract_day_cliques(&graph, 2).len(), 2);
    }

    #[test]
    fn test_cliques_are_pairwise_adjacent_and_unique() {
        let graph = day_graph(&[
            (1, 2),
            (1, 3),
            (2, 3),
            (2, 4),
            (3, 4),
            (1, 4),
            (4, 5),
            (5, 6),
            (4, 6),
            (6, 7),
        ]);
        let cliques = extract_day_cliques(&graph, 3);

        assert!(!cliques.is_empty());
        for clique in &cliques {
            assert!(clique.len() >= 3);
            for (a, b) in clique.members().iter().tuple_combinations() {
                assert!(graph.has_edge(*a, *b), "{} and {} not adjacent", a, b);
            }
        }
        assert_eq!(cliques.iter().unique().count(), cliques.len());
        assert_eq!(cliques[0].members(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_cliques_come_from_previous_day() {
        let mut builder = ContactGraphBuilder::new(100);
        // day 1
        builder.add_contact(150.0, 1, 2);
        builder.add_contact(150.0, 1, 3);
        builder.add_contact(150.0, 2, 3);
        let index = builder.build();

        let config = Config {
            day_length: 100,
            ..Config::default()
        };
        let daily = extract_cliques(&index, &config);

        assert_eq!(daily.get(2).len(), 1);
        assert_eq!(daily.get(2)[0].members(), &[1, 2, 3]);
        assert!(daily.get(3).is_empty());
    }

    #[test]
    fn test_day_zero_is_skipped_without_validation() {
        let mut builder = ContactGraphBuilder::new(100);
        builder.add_contact(10.0, 1, 2);
        builder.add_contact(10.0, 1, 3);
        builder.add_contact(10.0, 2, 3);
        let index = builder.build();

        let config = Config {
            day_length: 100,
            first_clique_day: 0,
            trace_days: 2,
            ..Config::default()
        };
        let daily = extract_cliques(&index, &config);

        assert!(daily.get(0).is_empty());
        assert_eq!(daily.get(1)[0].members(), &[1, 2, 3]);
    }
}
