//! Derivation of the pair tables from a raw contact log

use crate::cluster::round_to;
use crate::data::{ContactEvent, ContactKind, DurationTable, RateTable};
use crate::graph::Node;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Events in time order; ties keep input order
fn chronological(events: &[ContactEvent]) -> Vec<&ContactEvent> {
    events
        .iter()
        .filter(|event| event.a != event.b)
        .sorted_by(|x, y| x.timestamp.total_cmp(&y.timestamp))
        .collect()
}

/// Mean gap between consecutive contact start times; 0 with fewer than two
pub fn mean_inter_contact_time(starts: &[f64]) -> f64 {
    match (starts.first(), starts.last()) {
        (Some(first), Some(last)) if starts.len() > 1 => (last - first) / (starts.len() - 1) as f64,
        _ => 0.0,
    }
}

/// lambda = 1 / log10(mean inter-contact time), rounded to 3 decimals
pub fn contact_rate(mean_ict: f64) -> f64 {
    if mean_ict == 0.0 {
        return 0.0;
    }

    let rate = 1.0 / mean_ict.log10();
    if rate.is_finite() {
        round_to(rate, 3)
    } else {
        0.0
    }
}

/// Build the lambda table from connect events, in both directions
pub fn derive_rate_table(events: &[ContactEvent]) -> RateTable {
    let mut starts: BTreeMap<(Node, Node), Vec<f64>> = BTreeMap::new();

    for event in chronological(events).into_iter().filter(|e| e.is_up()) {
        starts.entry((event.a, event.b)).or_default().push(event.timestamp);
        starts.entry((event.b, event.a)).or_default().push(event.timestamp);
    }

    let mut table = RateTable::default();
    for ((a, b), times) in &starts {
        table.insert(*a, *b, contact_rate(mean_inter_contact_time(times)));
    }

    log::info!("Derived contact rates for {} node pairs", table.len());
    table
}

/// Mean duration of each window of contacts.
///
/// A window opens at a contact's start and absorbs the following contacts
/// that start less than `day_length` seconds later.
pub fn window_durations(contacts: &[(f64, f64)], day_length: f64) -> Vec<f64> {
    let mut means = Vec::new();
    let mut window_start: Option<f64> = None;
    let mut total = 0.0;
    let mut count = 0usize;

    for &(up, down) in contacts {
        match window_start {
            Some(start) if up - start < day_length => {
                total += down - up;
                count += 1;
            }
            _ => {
                if count > 0 {
                    means.push(total / count as f64);
                }
                window_start = Some(up);
                total = down - up;
                count = 1;
            }
        }
    }

    if count > 0 {
        means.push(total / count as f64);
    }

    means
}

/// Build the duration series table from matched connect/disconnect events
pub fn derive_duration_table(events: &[ContactEvent], day_length: f64) -> DurationTable {
    let mut open: BTreeMap<(Node, Node), f64> = BTreeMap::new();
    let mut contacts: BTreeMap<(Node, Node), Vec<(f64, f64)>> = BTreeMap::new();

    for event in chronological(events) {
        let key = (event.a.min(event.b), event.a.max(event.b));
        match event.kind {
            ContactKind::Up => {
                open.entry(key).or_insert(event.timestamp);
            }
            ContactKind::Down => {
                if let Some(up) = open.remove(&key) {
                    contacts.entry(key).or_default().push((up, event.timestamp));
                }
            }
        }
    }

    if !open.is_empty() {
        log::debug!("{} contacts still open at end of trace", open.len());
    }

    let mut table = DurationTable::default();
    for ((a, b), pair_contacts) in &contacts {
        let means = window_durations(pair_contacts, day_length);
        table.extend(*a, *b, means.iter().copied());
        table.extend(*b, *a, means);
    }

    log::info!("Derived duration series for {} node pairs", table.len());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_inter_contact_time() {
        assert_eq!(mean_inter_contact_time(&[]), 0.0);
        assert_eq!(mean_inter_contact_time(&[5.0]), 0.0);
        assert_eq!(mean_inter_contact_time(&[0.0, 100.0, 400.0]), 200.0);
    }

    #[test]
    fn test_contact_rate() {
        assert_eq!(contact_rate(0.0), 0.0);
        assert_eq!(contact_rate(1000.0), 0.333);
        // log10(1) = 0
        assert_eq!(contact_rate(1.0), 0.0);
    }

    #[test]
    fn test_rate_table_is_symmetric() {
        let events = vec![
            ContactEvent::up(0.0, 1, 2),
            ContactEvent::down(50.0, 1, 2),
            ContactEvent::up(100.0, 2, 1),
            ContactEvent::up(40.0, 3, 4),
        ];
        let table = derive_rate_table(&events);

        assert_eq!(table.get(1, 2), Some(0.5));
        assert_eq!(table.get(2, 1), Some(0.5));
        assert_eq!(table.get(3, 4), Some(0.0));
    }

    #[test]
    fn test_window_durations() {
        let contacts = [(0.0, 10.0), (50.0, 80.0), (200.0, 205.0)];
        assert_eq!(window_durations(&contacts, 100.0), vec![20.0, 5.0]);
        assert!(window_durations(&[], 100.0).is_empty());
    }

    #[test]
    fn test_duration_table_matches_up_and_down() {
        let events = vec![
            ContactEvent::up(0.0, 1, 2),
            ContactEvent::down(30.0, 2, 1),
            ContactEvent::down(40.0, 1, 2),
            ContactEvent::up(500.0, 1, 2),
            ContactEvent::down(510.0, 1, 2),
            ContactEvent::up(900.0, 1, 2),
        ];
        let table = derive_duration_table(&events, 100.0);

        assert_eq!(table.series(1, 2), &[30.0, 10.0]);
        assert_eq!(table.series(2, 1), &[30.0, 10.0]);
        assert!(table.series(1, 3).is_empty());
    }
}
