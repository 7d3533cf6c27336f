//! Loading of contact events and precomputed pair tables

pub mod events;
pub mod stats;
pub mod tables;

use crate::error::{GroupError, RecordError};
use crate::graph::Node;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use events::{ContactEvent, ContactKind};
pub use tables::{DurationTable, RateTable};

/// Outcome of one bulk load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Where the records came from
    pub source: String,

    /// Records accepted
    pub records: usize,

    /// Malformed records skipped
    pub skipped: usize,
}

/// Open a file for a bulk load
pub(crate) fn open(path: &Path) -> Result<File, GroupError> {
    log::info!("Reading {}", path.display());
    File::open(path).map_err(|e| GroupError::io(path, e))
}

/// Feed every record of a delimited source to `parse`.
///
/// Malformed records are skipped and counted. An I/O failure aborts the
/// whole load.
pub(crate) fn read_records<R, F>(
    reader: R,
    source: &str,
    mut parse: F,
) -> Result<LoadReport, GroupError>
where
    R: Read,
    F: FnMut(&StringRecord) -> Result<(), RecordError>,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut report = LoadReport {
        source: source.to_string(),
        ..LoadReport::default()
    };

    for (line, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(GroupError::Csv(e)),
            Err(e) => {
                log::debug!("{}: skipping record {}: {}", source, line + 1, e);
                report.skipped += 1;
                continue;
            }
        };

        match parse(&record) {
            Ok(()) => report.records += 1,
            Err(e) => {
                log::debug!("{}: skipping record {}: {}", source, line + 1, e);
                report.skipped += 1;
            }
        }
    }

    if report.skipped > 0 {
        log::warn!(
            "{}: skipped {} malformed records ({} loaded)",
            source,
            report.skipped,
            report.records
        );
    } else {
        log::info!("{}: loaded {} records", source, report.records);
    }

    Ok(report)
}

pub(crate) fn expect_fields(record: &StringRecord, expected: usize) -> Result<(), RecordError> {
    if record.len() != expected {
        return Err(RecordError::FieldCount {
            expected,
            found: record.len(),
        });
    }
    Ok(())
}

pub(crate) fn parse_node(value: &str, field: &'static str) -> Result<Node, RecordError> {
    value.parse().map_err(|_| RecordError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn parse_number(value: &str, field: &'static str) -> Result<f64, RecordError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_counts_and_skips() {
        let input = "1,2\n# comment\nbad\n3,4\n";
        let mut seen = Vec::new();

        let report = read_records(input.as_bytes(), "test", |record| {
            expect_fields(record, 2)?;
            seen.push(parse_node(&record[0], "nodeA")?);
            Ok(())
        })
        .unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn test_parse_node_rejects_non_numeric() {
        assert_eq!(parse_node("42", "nodeA"), Ok(42));
        assert!(parse_node("-1", "nodeA").is_err());
        assert!(parse_node("n7", "nodeA").is_err());
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("0.25", "value"), Ok(0.25));
        assert!(parse_number("NaN", "value").is_err());
        assert!(parse_number("inf", "value").is_err());
    }
}
