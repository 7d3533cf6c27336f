//! Pairwise rate and duration tables

use crate::data::{expect_fields, open, parse_node, parse_number, read_records, LoadReport};
use crate::error::{GroupError, RecordError};
use crate::graph::Node;
use csv::StringRecord;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Directed pairwise interaction rate (lambda)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<(Node, Node), f64>,
}

impl RateTable {
    /// Insert a rate unless the pair already has one; returns whether it was stored
    pub fn insert(&mut self, a: Node, b: Node, rate: f64) -> bool {
        match self.rates.entry((a, b)) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(rate);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, a: Node, b: Node) -> Option<f64> {
        self.rates.get(&(a, b)).copied()
    }

    /// Entries ordered by (nodeA, nodeB)
    pub fn iter(&self) -> impl Iterator<Item = (Node, Node, f64)> + '_ {
        self.rates.iter().map(|(&(a, b), &rate)| (a, b, rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Directed pairwise series of mean contact durations, one value per window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationTable {
    series: BTreeMap<(Node, Node), Vec<f64>>,
}

impl DurationTable {
    /// Append values to the series of a pair
    pub fn extend(&mut self, a: Node, b: Node, values: impl IntoIterator<Item = f64>) {
        self.series.entry((a, b)).or_default().extend(values);
    }

    /// Series of a pair; empty if absent
    pub fn series(&self, a: Node, b: Node) -> &[f64] {
        self.series.get(&(a, b)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, a: Node, b: Node) -> bool {
        self.series.contains_key(&(a, b))
    }

    /// Entries ordered by (nodeA, nodeB)
    pub fn iter(&self) -> impl Iterator<Item = (Node, Node, &[f64])> + '_ {
        self.series
            .iter()
            .map(|(&(a, b), values)| (a, b, values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Render a series as `[v1,v2,...]`
pub fn format_series(values: &[f64]) -> String {
    format!("[{}]", values.iter().join(","))
}

fn parse_series(fields: &[&str]) -> Result<Vec<f64>, RecordError> {
    let joined = fields.join(",");
    joined
        .trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace())
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_number(value, "duration"))
        .collect()
}

fn parse_rate(record: &StringRecord) -> Result<(Node, Node, f64), RecordError> {
    expect_fields(record, 3)?;
    Ok((
        parse_node(&record[0], "nodeA")?,
        parse_node(&record[1], "nodeB")?,
        parse_number(&record[2], "rate")?,
    ))
}

fn parse_durations(record: &StringRecord) -> Result<(Node, Node, Vec<f64>), RecordError> {
    if record.len() < 3 {
        return Err(RecordError::FieldCount {
            expected: 3,
            found: record.len(),
        });
    }

    let fields: Vec<&str> = record.iter().skip(2).collect();
    Ok((
        parse_node(&record[0], "nodeA")?,
        parse_node(&record[1], "nodeB")?,
        parse_series(&fields)?,
    ))
}

/// Parse `nodeA,nodeB,value` records; the first record of a pair wins
pub fn read_rate_table<R: Read>(
    reader: R,
    source: &str,
) -> Result<(RateTable, LoadReport), GroupError> {
    let mut table = RateTable::default();
    let mut duplicates = 0;

    let report = read_records(reader, source, |record| {
        let (a, b, rate) = parse_rate(record)?;
        if !table.insert(a, b, rate) {
            duplicates += 1;
        }
        Ok(())
    })?;

    if duplicates > 0 {
        log::debug!("{}: ignored {} repeated pairs", source, duplicates);
    }

    Ok((table, report))
}

pub fn load_rate_table(path: impl AsRef<Path>) -> Result<(RateTable, LoadReport), GroupError> {
    let path = path.as_ref();
    read_rate_table(open(path)?, &path.display().to_string())
}

/// Parse `nodeA,nodeB,[v1,v2,...]` records; repeated pairs append
pub fn read_duration_table<R: Read>(
    reader: R,
    source: &str,
) -> Result<(DurationTable, LoadReport), GroupError> {
    let mut table = DurationTable::default();

    let report = read_records(reader, source, |record| {
        let (a, b, values) = parse_durations(record)?;
        table.extend(a, b, values);
        Ok(())
    })?;

    Ok((table, report))
}

pub fn load_duration_table(
    path: impl AsRef<Path>,
) -> Result<(DurationTable, LoadReport), GroupError> {
    let path = path.as_ref();
    read_duration_table(open(path)?, &path.display().to_string())
}
