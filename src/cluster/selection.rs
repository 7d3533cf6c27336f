//! Final disjoint group selection

use crate::cluster::Group;
use crate::graph::Node;
use log;
use std::collections::HashSet;

/// Make groups pairwise disjoint and drop the undersized ones.
///
/// Groups are visited in formation order and each node stays with the first
/// group that claims it. Survivors keep their formation id.
pub fn select_groups(groups: Vec<Group>, min_group_size: usize) -> Vec<Group> {
    log::info!("Selecting disjoint groups from {} candidates", groups.len());

    let mut claimed: HashSet<Node> = HashSet::new();

    let disjoint: Vec<Group> = groups
        .into_iter()
        .map(|mut group| {
            group.members.retain(|&node| claimed.insert(node));
            group
        })
        .collect();

    let (selected, dropped): (Vec<Group>, Vec<Group>) = disjoint
        .into_iter()
        .partition(|group| group.size() >= min_group_size);

    for group in &dropped {
        log::debug!(
            "Dropping group {} with {} remaining members",
            group.id,
            group.size()
        );
    }

    log::info!(
        "Selected {} groups covering {} nodes",
        selected.len(),
        selected.iter().map(Group::size).sum::<usize>()
    );

    selected
}
