//! Group formation from recurring daily cliques

use crate::cluster::{CandidateGroup, Clique, DailyCliques, Group};
use crate::config::Config;
use crate::graph::{Day, Node};
use itertools::Itertools;
use log;
use std::cmp::Reverse;

/// Result of evaluating one seed clique against the later days
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Consistency ratio below gamma; the seed is returned unchanged
    Rejected { seed: Clique, consistency: usize },

    /// Consistency reached; `members` survived frequency filtering
    Consistent {
        candidate: CandidateGroup,
        members: Vec<Node>,
    },
}

/// Turns daily cliques into accepted groups.
///
/// Each clique day is visited once. The largest clique seeds a candidate,
/// the candidate is matched against every later day, and if it recurs often
/// enough its frequent members become a group. Up to `max_update_attempts`
/// further seeds are tried per day.
pub struct GroupFormer<'a> {
    cliques: &'a DailyCliques,
    min_clique_size: usize,
    gamma: f64,
    delta: f64,
    consistency_days: u32,
    max_update_attempts: usize,

    /// Accepted groups; a group's id is its index here
    groups: Vec<Group>,
}

impl<'a> GroupFormer<'a> {
    pub fn new(cliques: &'a DailyCliques, config: &Config) -> Self {
        Self {
            cliques,
            min_clique_size: config.min_clique_size,
            gamma: config.gamma,
            delta: config.delta,
            consistency_days: config.consistency_days,
            max_update_attempts: config.max_update_attempts,
            groups: Vec::new(),
        }
    }

    /// Start from groups accepted in an earlier pass
    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    /// Run formation for every clique day in ascending order
    pub fn form_all(&mut self) -> usize {
        log::info!(
            "Forming groups from {} clique days (gamma = {}, delta = {})",
            self.cliques.day_count(),
            self.gamma,
            self.delta
        );

        let days: Vec<Day> = self.cliques.days().collect();
        let accepted: usize = days.into_iter().map(|day| self.form_day(day)).sum();

        log::info!("Accepted {} groups", accepted);
        accepted
    }

    /// Try seeds of one day until the update cap or no seed qualifies
    pub fn form_day(&mut self, day: Day) -> usize {
        let mut available: Vec<Clique> = self.cliques.get(day).to_vec();
        let mut accepted = 0;
        let mut attempts = 0;
        let mut pick = self.pick_seed(&available, true);

        while let Some(index) = pick {
            let seed = available.remove(index);

            match self.evaluate(day, &seed) {
                Evaluation::Consistent { candidate, members } => {
                    if self.try_accept(day, members) {
                        accepted += 1;
                    } else {
                        log::debug!(
                            "Day {}: candidate from {:?} ({} matches) is subsumed by an existing group",
                            day,
                            seed.members(),
                            candidate.consistency()
                        );
                    }
                }
                Evaluation::Rejected { seed, consistency } => {
                    log::debug!(
                        "Day {}: seed {:?} recurred on {} days, below consistency",
                        day,
                        seed.members(),
                        consistency
                    );
                }
            }

            if attempts >= self.max_update_attempts {
                break;
            }
            attempts += 1;
            pick = self.pick_seed(&available, false);
        }

        accepted
    }

    /// Index of the next seed clique.
    ///
    /// The first pick is the largest clique (earliest on ties). Later picks
    /// go by descending size and must keep at least K members outside the
    /// first accepted group.
    fn pick_seed(&self, available: &[Clique], first_pick: bool) -> Option<usize> {
        let by_size = (0..available.len()).sorted_by_key(|&i| Reverse(available[i].len()));

        if first_pick {
            return by_size.into_iter().next();
        }

        let first_group = self.groups.first();
        by_size.into_iter().find(|&i| match first_group {
            Some(group) => available[i].difference_len(&group.members) >= self.min_clique_size,
            None => true,
        })
    }

    /// Grow a seed over the later days and apply the consistency and frequency rules
    pub fn evaluate(&self, day: Day, seed: &Clique) -> Evaluation {
        let mut candidate = CandidateGroup::from_seed(day, seed);

        for (later_day, cliques) in self.cliques.after(day) {
            let matched = cliques
                .iter()
                .find(|clique| candidate.equals(clique) || candidate.jaccard(clique) >= self.gamma);

            if let Some(clique) = matched {
                candidate.absorb(later_day, clique);
            }
        }

        let ratio = candidate.consistency() as f64 / self.consistency_days as f64;
        if ratio < self.gamma {
            return Evaluation::Rejected {
                seed: seed.clone(),
                consistency: candidate.consistency(),
            };
        }

        let members = self.frequency_filter(&candidate);
        Evaluation::Consistent { candidate, members }
    }

    /// Members appearing in more than delta of the contributing cliques
    fn frequency_filter(&self, candidate: &CandidateGroup) -> Vec<Node> {
        let counter = candidate.consistency();
        if counter == 0 {
            return Vec::new();
        }

        candidate
            .members
            .iter()
            .copied()
            .filter(|&node| candidate.occurrences(node) as f64 / counter as f64 > self.delta)
            .collect()
    }

    /// A candidate must differ from every accepted group in more than K members
    fn is_novel(&self, members: &[Node]) -> bool {
        self.groups.iter().all(|group| {
            members.iter().filter(|&&node| !group.contains(node)).count() > self.min_clique_size
        })
    }

    fn try_accept(&mut self, day: Day, members: Vec<Node>) -> bool {
        if members.is_empty() || !self.is_novel(&members) {
            return false;
        }

        let group = Group::new(self.groups.len(), day, members);
        log::debug!("Day {}: accepted group {} {:?}", day, group.id, group.members);
        self.groups.push(group);
        true
    }
}
