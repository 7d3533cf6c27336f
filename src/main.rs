use anyhow::Result;
use clap::Parser;
use contact_groups::data::{events, stats, tables};
use contact_groups::storage::{self, DerivedTables};
use contact_groups::{pipeline, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "contact-groups",
    about = "Detect stable node groups and group-to-group rates from contact traces"
)]
struct Cli {
    /// Contact event log: timestamp,nodeA,nodeB[,up|down]
    #[clap(long)]
    events: PathBuf,

    /// Pairwise rate table: nodeA,nodeB,value (derived from the events if omitted)
    #[clap(long)]
    rates: Option<PathBuf>,

    /// Pairwise duration series: nodeA,nodeB,[v1,...] (derived from the events if omitted)
    #[clap(long)]
    durations: Option<PathBuf>,

    /// Output directory for results
    #[clap(long, default_value = "group_results")]
    output_dir: PathBuf,

    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Minimum clique size K
    #[clap(long)]
    min_clique_size: Option<usize>,

    /// Consistency threshold gamma
    #[clap(long)]
    gamma: Option<f64>,

    /// Member frequency threshold delta
    #[clap(long)]
    delta: Option<f64>,

    /// Mean contact duration threshold beta
    #[clap(long)]
    beta: Option<f64>,

    /// Day length in seconds
    #[clap(long)]
    day_length: Option<u64>,

    /// Number of days in the trace
    #[clap(long)]
    trace_days: Option<u32>,

    /// Seed re-picks per day after the first seed
    #[clap(long)]
    max_update_attempts: Option<usize>,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(k) = self.min_clique_size {
            config.min_clique_size = k;
        }
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(delta) = self.delta {
            config.delta = delta;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(day_length) = self.day_length {
            config.day_length = day_length;
        }
        if let Some(trace_days) = self.trace_days {
            config.trace_days = trace_days;
        }
        if let Some(attempts) = self.max_update_attempts {
            config.max_update_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = args.load_config()?;

    log::info!("Starting group detection");
    log::info!("Events: {}", args.events.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load inputs
    let (event_log, events_report) = events::load_events(&args.events)?;
    let mut loads = vec![events_report];

    let (lambda, derived_rates) = match &args.rates {
        Some(path) => {
            let (table, report) = tables::load_rate_table(path)?;
            loads.push(report);
            (table, false)
        }
        None => (stats::derive_rate_table(&event_log), true),
    };

    let (durations, derived_durations) = match &args.durations {
        Some(path) => {
            let (table, report) = tables::load_duration_table(path)?;
            loads.push(report);
            (table, false)
        }
        None => (
            stats::derive_duration_table(&event_log, config.day_length as f64),
            true,
        ),
    };

    // 2. Run the pipeline
    let output = pipeline::run(&config, &event_log, &lambda, &durations)?;

    log::info!(
        "{} cliques, {} accepted groups, {} final groups",
        output.summary.cliques,
        output.summary.accepted_groups,
        output.summary.final_groups
    );

    // 3. Save results
    let derived = DerivedTables {
        rates: derived_rates.then_some(&lambda),
        durations: derived_durations.then_some(&durations),
    };
    storage::save_results(&output, &config, &loads, &derived, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
