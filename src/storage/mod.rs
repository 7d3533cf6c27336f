//! Results persistence module

use crate::cluster::rates::GroupRates;
use crate::cluster::{DailyCliques, Group};
use crate::config::Config;
use crate::data::tables::format_series;
use crate::data::{DurationTable, LoadReport, RateTable};
use crate::error::GroupError;
use crate::pipeline::PipelineOutput;
use crate::Result;
use itertools::Itertools;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CLIQUES_FILE: &str = "cliques.txt";
pub const GROUPS_FILE: &str = "groups.txt";
pub const GROUP_RATES_FILE: &str = "group_rates.txt";
pub const RATES_FILE: &str = "rates.txt";
pub const DURATIONS_FILE: &str = "durations.txt";
pub const SUMMARY_FILE: &str = "summary.json";

/// Pair tables derived from the event log instead of loaded
#[derive(Debug, Default)]
pub struct DerivedTables<'a> {
    pub rates: Option<&'a RateTable>,
    pub durations: Option<&'a DurationTable>,
}

fn lines<I: IntoIterator<Item = String>>(records: I) -> String {
    records.into_iter().map(|line| line + "\n").collect()
}

/// `day,cliqueIndex,[members]` ordered by day, then extraction order
pub fn render_cliques(cliques: &DailyCliques) -> String {
    lines(cliques.iter().flat_map(|(day, day_cliques)| {
        day_cliques
            .iter()
            .enumerate()
            .map(move |(i, clique)| format!("{},{},[{}]", day, i, clique.members().iter().join(",")))
    }))
}

/// `groupId,[members]` ordered by id
pub fn render_groups(groups: &[Group]) -> String {
    lines(
        groups
            .iter()
            .sorted_by_key(|group| group.id)
            .map(|group| format!("{},[{}]", group.id, group.members.iter().join(","))),
    )
}

/// `groupA,groupB,rate` ordered by (groupA, groupB)
pub fn render_group_rates(rates: &GroupRates) -> String {
    lines(rates.iter().map(|(from, to, rate)| format!("{},{},{}", from, to, rate)))
}

pub fn render_rate_table(table: &RateTable) -> String {
    lines(table.iter().map(|(a, b, rate)| format!("{},{},{}", a, b, rate)))
}

pub fn render_duration_table(table: &DurationTable) -> String {
    lines(
        table
            .iter()
            .map(|(a, b, series)| format!("{},{},{}", a, b, format_series(series))),
    )
}

fn render_summary(
    output: &PipelineOutput,
    config: &Config,
    loads: &[LoadReport],
) -> Result<String> {
    let summary = json!({
        "config": config,
        "inputs": loads,
        "skipped_records": loads.iter().map(|l| l.skipped).sum::<usize>(),
        "run": output.summary,
        "groups": output.groups.iter().map(|g| {
            json!({
                "id": g.id,
                "formed_on": g.formed_on,
                "size": g.size(),
            })
        }).collect::<Vec<_>>(),
    });

    Ok(to_string_pretty(&summary)?)
}

fn temp_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{}.tmp", name))
}

fn backup_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{}.bak", name))
}

fn write_file(path: &Path, contents: &str) -> std::result::Result<(), GroupError> {
    let file = File::create(path).map_err(|e| GroupError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| GroupError::io(path, e))
}

/// Files moved during the rename phase, undone on failure
#[derive(Default)]
struct Commit {
    placed: Vec<PathBuf>,
    backups: Vec<(PathBuf, PathBuf)>,
}

impl Commit {
    fn place(
        &mut self,
        dir: &Path,
        name: &str,
        tmp: &Path,
    ) -> std::result::Result<(), GroupError> {
        let dest = dir.join(name);
        if dest.is_file() {
            let backup = backup_path(dir, name);
            fs::rename(&dest, &backup).map_err(|e| GroupError::io(&dest, e))?;
            self.backups.push((backup, dest.clone()));
        }
        fs::rename(tmp, &dest).map_err(|e| GroupError::io(&dest, e))?;
        self.placed.push(dest);
        Ok(())
    }

    fn roll_back(self) {
        for path in &self.placed {
            let _ = fs::remove_file(path);
        }
        for (backup, dest) in &self.backups {
            if let Err(e) = fs::rename(backup, dest) {
                log::warn!("Could not restore {}: {}", dest.display(), e);
            }
        }
    }

    fn finish(self) {
        for (backup, _) in &self.backups {
            let _ = fs::remove_file(backup);
        }
    }
}

/// Write every file or none of them.
///
/// Contents go to hidden temporary files first. Once all of them are written
/// they are renamed into place; existing results are kept aside and restored
/// if any rename fails.
pub fn write_all_or_nothing(output_dir: &Path, files: &[(&str, String)]) -> Result<()> {
    fs::create_dir_all(output_dir).map_err(|e| GroupError::io(output_dir, e))?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let tmp = temp_path(output_dir, name);
        if let Err(e) = write_file(&tmp, contents) {
            let _ = fs::remove_file(&tmp);
            for path in &written {
                let _ = fs::remove_file(path);
            }
            return Err(e.into());
        }
        written.push(tmp);
    }

    let mut commit = Commit::default();
    for (tmp, (name, _)) in written.iter().zip(files) {
        if let Err(e) = commit.place(output_dir, name, tmp) {
            commit.roll_back();
            for path in &written {
                let _ = fs::remove_file(path);
            }
            return Err(e.into());
        }
    }
    commit.finish();

    Ok(())
}

/// Save analysis results to the specified directory
pub fn save_results(
    output: &PipelineOutput,
    config: &Config,
    loads: &[LoadReport],
    derived: &DerivedTables<'_>,
    output_dir: impl AsRef<Path>,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving {} groups to {}", output.groups.len(), output_dir.display());

    let mut files = vec![
        (CLIQUES_FILE, render_cliques(&output.cliques)),
        (GROUPS_FILE, render_groups(&output.groups)),
        (GROUP_RATES_FILE, render_group_rates(&output.rates)),
    ];
    if let Some(rates) = derived.rates {
        files.push((RATES_FILE, render_rate_table(rates)));
    }
    if let Some(durations) = derived.durations {
        files.push((DURATIONS_FILE, render_duration_table(durations)));
    }
    files.push((SUMMARY_FILE, render_summary(output, config, loads)?));

    write_all_or_nothing(output_dir, &files)?;

    log::info!("Results saved successfully");
    Ok(())
}
