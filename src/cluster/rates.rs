//! Group-to-group interaction rates

use crate::cluster::{round_to, Group};
use crate::data::RateTable;
use std::collections::BTreeMap;

/// Directed rates between final groups, keyed by (from id, to id)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRates {
    rates: BTreeMap<(usize, usize), f64>,
}

impl GroupRates {
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.rates.get(&(from, to)).copied()
    }

    /// Entries ordered by (from, to)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rates.iter().map(|(&(from, to), &rate)| (from, to, rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Mean pairwise lambda over all member pairs, missing pairs count as 0, 4 decimals
pub fn group_rate(from: &Group, to: &Group, lambda: &RateTable) -> f64 {
    let pairs = from.size() * to.size();
    if pairs == 0 {
        return 0.0;
    }

    let sum: f64 = from
        .members
        .iter()
        .flat_map(|&a| to.members.iter().map(move |&b| (a, b)))
        .filter_map(|(a, b)| lambda.get(a, b))
        .sum();

    round_to(sum / pairs as f64, 4)
}

/// Rates for every ordered pair of distinct groups
pub fn aggregate_rates(groups: &[Group], lambda: &RateTable) -> GroupRates {
    log::info!("Aggregating rates between {} groups", groups.len());

    let mut rates = BTreeMap::new();
    for from in groups {
        for to in groups {
            if from.id == to.id {
                continue;
            }
            rates.insert((from.id, to.id), group_rate(from, to, lambda));
        }
    }

    GroupRates { rates }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lambda(entries: &[(u32, u32, f64)]) -> RateTable {
        let mut table = RateTable::default();
        for &(a, b, rate) in entries {
            table.insert(a, b, rate);
        }
        table
    }

    #[test]
    fn test_rate_averages_over_all_member_pairs() {
        let g0 = Group::new(0, 2, vec![1, 2]);
        let g1 = Group::new(1, 2, vec![3, 4]);
        let table = lambda(&[(1, 3, 0.4), (2, 4, 0.2), (3, 1, 1.0)]);

        // (0.4 + 0.2 + 0 + 0) / 4
        assert_eq!(group_rate(&g0, &g1, &table), 0.15);
        assert_eq!(group_rate(&g1, &g0, &table), 0.25);
    }

    #[test]
    fn test_rate_is_rounded_to_four_decimals() {
        let g0 = Group::new(0, 2, vec![1, 2, 3]);
        let g1 = Group::new(1, 2, vec![4]);
        let table = lambda(&[(1, 4, 0.1)]);

        assert_eq!(group_rate(&g0, &g1, &table), 0.0333);
    }

    #[test]
    fn test_aggregate_skips_self_pairs() {
        let groups = vec![
            Group::new(0, 2, vec![1, 2, 3]),
            Group::new(4, 3, vec![4, 5, 6]),
            Group::new(7, 3, vec![7, 8, 9]),
        ];
        let rates = aggregate_rates(&groups, &RateTable::default());

        assert_eq!(rates.len(), 6);
        assert_eq!(rates.get(0, 0), None);
        assert_eq!(rates.get(4, 7), Some(0.0));
        let keys: Vec<(usize, usize)> = rates.iter().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(keys[0], (0, 4));
    }
}
