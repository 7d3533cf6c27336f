//! Group formation, filtering and selection

pub mod duration;
pub mod formation;
pub mod rates;
pub mod selection;

use crate::graph::{Day, Node};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Round half away from zero to `places` decimals
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Nodes pairwise in contact within one day; members sorted and unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Clique(Vec<Node>);

impl Clique {
    pub fn new(mut members: Vec<Node>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self(members)
    }

    pub fn members(&self) -> &[Node] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, node: Node) -> bool {
        self.0.binary_search(&node).is_ok()
    }

    /// Number of members not in `other`
    pub fn difference_len(&self, other: &[Node]) -> usize {
        self.0.iter().filter(|&node| !other.contains(node)).count()
    }
}

/// Cliques per day, in extraction order. Days without cliques are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyCliques {
    days: BTreeMap<Day, Vec<Clique>>,
}

impl DailyCliques {
    /// Store a day's cliques; an empty list contributes nothing
    pub fn insert(&mut self, day: Day, cliques: Vec<Clique>) {
        if !cliques.is_empty() {
            self.days.insert(day, cliques);
        }
    }

    pub fn get(&self, day: Day) -> &[Clique] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &[Clique])> {
        self.days.iter().map(|(&day, cliques)| (day, cliques.as_slice()))
    }

    /// Days strictly after `day`, ascending
    pub fn after(&self, day: Day) -> impl Iterator<Item = (Day, &[Clique])> {
        self.days
            .range(day.saturating_add(1)..)
            .map(|(&day, cliques)| (day, cliques.as_slice()))
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn clique_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// A seed clique grown across later days while it is evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup {
    /// Day of the seed clique
    pub seed_day: Day,

    /// Union of the seed and every contributing clique
    pub members: BTreeSet<Node>,

    /// Later-day cliques that matched, at most one per day
    pub contributions: Vec<(Day, Clique)>,
}

impl CandidateGroup {
    pub fn from_seed(seed_day: Day, seed: &Clique) -> Self {
        Self {
            seed_day,
            members: seed.members().iter().copied().collect(),
            contributions: Vec::new(),
        }
    }

    /// Consistency counter: number of later days that matched
    pub fn consistency(&self) -> usize {
        self.contributions.len()
    }

    /// Exact match with the current member set
    pub fn equals(&self, clique: &Clique) -> bool {
        self.members.len() == clique.len() && self.members.iter().eq(clique.members())
    }

    /// |members ∩ clique| / |members ∪ clique|
    pub fn jaccard(&self, clique: &Clique) -> f64 {
        let common = clique
            .members()
            .iter()
            .filter(|&node| self.members.contains(node))
            .count();
        let union = self.members.len() + clique.len() - common;

        if union == 0 {
            return 0.0;
        }
        common as f64 / union as f64
    }

    /// Record a matching clique and merge its members
    pub fn absorb(&mut self, day: Day, clique: &Clique) {
        self.members.extend(clique.members().iter().copied());
        self.contributions.push((day, clique.clone()));
    }

    /// Contributing cliques that contain `node`
    pub fn occurrences(&self, node: Node) -> usize {
        self.contributions
            .iter()
            .filter(|(_, clique)| clique.contains(node))
            .count()
    }
}

/// An accepted group; `id` is its acceptance index and never changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: usize,

    /// Day of the seed clique the group grew from
    pub formed_on: Day,

    /// Members, ascending
    pub members: Vec<Node>,
}

impl Group {
    pub fn new(id: usize, formed_on: Day, mut members: Vec<Node>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            id,
            formed_on,
            members,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, node: Node) -> bool {
        self.members.binary_search(&node).is_ok()
    }
}
