//! Contact event log loading

use crate::data::{expect_fields, open, parse_node, parse_number, read_records, LoadReport};
use crate::error::{GroupError, RecordError};
use crate::graph::Node;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Whether a record opens or closes a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Up,
    Down,
}

impl FromStr for ContactKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "conn" | "connect" => Ok(Self::Up),
            "down" | "disconn" | "disconnect" => Ok(Self::Down),
            _ => Err(RecordError::UnknownKind(s.to_string())),
        }
    }
}

/// One observation `timestamp,nodeA,nodeB[,kind]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Seconds since trace start
    pub timestamp: f64,
    pub a: Node,
    pub b: Node,
    pub kind: ContactKind,
}

impl ContactEvent {
    pub fn up(timestamp: f64, a: Node, b: Node) -> Self {
        Self {
            timestamp,
            a,
            b,
            kind: ContactKind::Up,
        }
    }

    pub fn down(timestamp: f64, a: Node, b: Node) -> Self {
        Self {
            timestamp,
            a,
            b,
            kind: ContactKind::Down,
        }
    }

    pub fn is_up(&self) -> bool {
        self.kind == ContactKind::Up
    }
}

fn parse_event(record: &StringRecord) -> Result<ContactEvent, RecordError> {
    if record.len() != 4 {
        expect_fields(record, 3)?;
    }

    let timestamp = parse_number(&record[0], "timestamp")?;
    if timestamp < 0.0 {
        return Err(RecordError::InvalidTimestamp(timestamp));
    }

    let kind = match record.get(3) {
        Some(kind) => kind.parse()?,
        None => ContactKind::Up,
    };

    Ok(ContactEvent {
        timestamp,
        a: parse_node(&record[1], "nodeA")?,
        b: parse_node(&record[2], "nodeB")?,
        kind,
    })
}

/// Parse an event log from any reader
pub fn read_events<R: Read>(
    reader: R,
    source: &str,
) -> Result<(Vec<ContactEvent>, LoadReport), GroupError> {
    let mut events = Vec::new();
    let report = read_records(reader, source, |record| {
        events.push(parse_event(record)?);
        Ok(())
    })?;

    Ok((events, report))
}

/// Load an event log file
pub fn load_events(path: impl AsRef<Path>) -> Result<(Vec<ContactEvent>, LoadReport), GroupError> {
    let path = path.as_ref();
    read_events(open(path)?, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_three_and_four_field_records() {
        let input = "10,1,2\n20.5,1,2,down\n30,3,4,UP\n";
        let (events, report) = read_events(input.as_bytes(), "events").unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(events[0], ContactEvent::up(10.0, 1, 2));
        assert_eq!(events[1], ContactEvent::down(20.5, 1, 2));
        assert!(events[2].is_up());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let input = "10,1,2\n10,1\nabc,1,2\n10,x,2\n-5,1,2\n10,1,2,sideways\n10,1,2,up,extra\n40,5,6\n";
        let (events, report) = read_events(input.as_bytes(), "events").unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(report.records, 2);
        assert_eq!(report.skipped, 6);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_events("/nonexistent/events.csv").unwrap_err();
        assert!(matches!(err, GroupError::Io { .. }));
    }
}
