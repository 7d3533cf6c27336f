//! Duration condition on group membership

use crate::cluster::{round_to, Group};
use crate::config::Config;
use crate::data::DurationTable;
use crate::graph::Node;
use log;

/// Removes members whose mean contact duration with the rest of their group is below beta
pub struct DurationFilter {
    day_length: f64,
    trace_days: u32,
    beta: f64,
}

impl DurationFilter {
    pub fn new(config: &Config) -> Self {
        Self {
            day_length: config.day_length as f64,
            trace_days: config.trace_days,
            beta: config.beta,
        }
    }

    /// Day-normalized duration of one pair: Σ round4(d / T_i) / (N + 1)
    pub fn pair_score(&self, series: &[f64]) -> f64 {
        let total: f64 = series
            .iter()
            .map(|duration| round_to(duration / self.day_length, 4))
            .sum();
        total / (self.trace_days as f64 + 1.0)
    }

    /// Sum of pair scores between `member` and every other member
    pub fn member_score(&self, member: Node, members: &[Node], table: &DurationTable) -> f64 {
        members
            .iter()
            .filter(|&&other| other != member)
            .map(|&other| self.pair_score(table.series(member, other)))
            .sum()
    }

    /// Per-member averages, computed against the unmodified group
    pub fn member_averages(&self, group: &Group, table: &DurationTable) -> Vec<(Node, f64)> {
        let others = group.size().saturating_sub(1) as f64;
        group
            .members
            .iter()
            .map(|&member| {
                let score = self.member_score(member, &group.members, table);
                (member, score / others)
            })
            .collect()
    }

    /// Filter every group in place; returns the number of members removed
    pub fn apply(&self, groups: &mut [Group], table: &DurationTable) -> usize {
        log::info!(
            "Applying duration condition (beta = {}) to {} groups",
            self.beta,
            groups.len()
        );

        let mut removed = 0;

        for group in groups.iter_mut() {
            // a lone member has no partner to average over
            if group.size() < 2 {
                continue;
            }

            let averages = self.member_averages(group, table);
            let keep: Vec<Node> = averages
                .iter()
                .filter(|(_, average)| *average >= self.beta)
                .map(|&(member, _)| member)
                .collect();

            for (member, average) in averages.iter().filter(|(_, a)| *a < self.beta) {
                log::debug!(
                    "Group {}: removing {} (mean duration score {:.4})",
                    group.id,
                    member,
                    average
                );
            }

            removed += group.members.len() - keep.len();
            group.members = keep;
        }

        log::info!("Duration condition removed {} members", removed);
        removed
    }
}
