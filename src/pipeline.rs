//! Pipeline driver: contacts -> cliques -> groups -> rates

use crate::cluster::duration::DurationFilter;
use crate::cluster::formation::GroupFormer;
use crate::cluster::rates::{aggregate_rates, GroupRates};
use crate::cluster::selection::select_groups;
use crate::cluster::{DailyCliques, Group};
use crate::config::Config;
use crate::data::{ContactEvent, DurationTable, RateTable};
use crate::graph::algorithms::extract_cliques;
use crate::graph::{ContactGraphBuilder, ContactIndex};
use crate::Result;
use serde::Serialize;

/// Counts reported for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub contacts: usize,
    pub contact_days: usize,
    pub contact_edges: usize,
    pub clique_days: usize,
    pub cliques: usize,
    pub accepted_groups: usize,
    pub members_removed_by_duration: usize,
    pub final_groups: usize,
    pub grouped_nodes: usize,
    pub group_rate_pairs: usize,
}

/// Every aggregate produced by a run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub contact_index: ContactIndex,
    pub cliques: DailyCliques,

    /// Groups as accepted by formation, before duration filtering
    pub accepted: Vec<Group>,

    /// Disjoint groups of at least the minimum size
    pub groups: Vec<Group>,

    pub rates: GroupRates,
    pub summary: RunSummary,
}

/// Bucket connect events into the per-day contact index
pub fn build_contact_index(events: &[ContactEvent], day_length: u64) -> (ContactIndex, usize) {
    let mut builder = ContactGraphBuilder::new(day_length);
    for event in events.iter().filter(|e| e.is_up()) {
        builder.add_contact(event.timestamp, event.a, event.b);
    }

    let contacts = builder.contact_count();
    (builder.build(), contacts)
}

/// Run every stage in order
pub fn run(
    config: &Config,
    events: &[ContactEvent],
    lambda: &RateTable,
    durations: &DurationTable,
) -> Result<PipelineOutput> {
    config.validate()?;

    let (contact_index, contacts) = build_contact_index(events, config.day_length);
    log::info!(
        "Indexed {} contacts over {} days ({} distinct edges)",
        contacts,
        contact_index.day_count(),
        contact_index.edge_count()
    );

    let cliques = extract_cliques(&contact_index, config);

    let mut former = GroupFormer::new(&cliques, config);
    former.form_all();
    let accepted = former.into_groups();

    let mut filtered = accepted.clone();
    let removed = DurationFilter::new(config).apply(&mut filtered, durations);

    let groups = select_groups(filtered, config.min_group_size);
    let rates = aggregate_rates(&groups, lambda);

    let summary = RunSummary {
        contacts,
        contact_days: contact_index.day_count(),
        contact_edges: contact_index.edge_count(),
        clique_days: cliques.day_count(),
        cliques: cliques.clique_count(),
        accepted_groups: accepted.len(),
        members_removed_by_duration: removed,
        final_groups: groups.len(),
        grouped_nodes: groups.iter().map(Group::size).sum(),
        group_rate_pairs: rates.len(),
    };

    Ok(PipelineOutput {
        contact_index,
        cliques,
        accepted,
        groups,
        rates,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnects_do_not_create_edges() {
        let events = vec![
            ContactEvent::up(10.0, 1, 2),
            ContactEvent::down(20.0, 1, 2),
            ContactEvent::down(30.0, 3, 4),
        ];
        let (index, contacts) = build_contact_index(&events, 86_400);

        assert_eq!(contacts, 1);
        assert_eq!(index.neighbors(0, 1), &[2]);
        assert!(index.neighbors(0, 3).is_empty());
    }

    #[test]
    fn test_invalid_config_fails_run() {
        let config = Config {
            delta: -0.1,
            ..Config::default()
        };
        let result = run(&config, &[], &RateTable::default(), &DurationTable::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_trace_produces_nothing() {
        let output = run(
            &Config::default(),
            &[],
            &RateTable::default(),
            &DurationTable::default(),
        )
        .unwrap();

        assert_eq!(output.summary, RunSummary::default());
        assert!(output.groups.is_empty());
        assert!(output.rates.is_empty());
    }
}
