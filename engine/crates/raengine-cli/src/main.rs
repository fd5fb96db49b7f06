//! RAEngine - Vulnerability risk and impact analysis
//!
//! This is the main entry point for the `raengine` binary. `ingest` builds
//! the snapshot from offline exports; `analyze` scores it and writes the
//! report.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use raengine_common::logging::{init_logging_with_config, LogConfig, LogFormat};
use raengine_common::Config;
use raengine_core::RangeData;
use raengine_ingest::{ConnectionWindow, SnapshotStore};
use raengine_scoring::{report, HostImpactScorer, ScoringEngine};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// RAEngine risk analysis
#[derive(Parser, Debug)]
#[command(name = "raengine")]
#[command(version)]
#[command(about = "Vulnerability risk and impact analysis", long_about = None)]
struct Args {
    /// Configuration file path (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "conf/raengine.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact); overrides config
    #[arg(long)]
    log_format: Option<String>,

    /// Data directory (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a scan report, range data and connection logs into the snapshot
    Ingest {
        /// Scan report CSV (overrides settings.report_path)
        #[arg(long)]
        report: Option<PathBuf>,

        /// VLAN export CSV or range data JSON (overrides settings.range_path)
        #[arg(long)]
        ranges: Option<PathBuf>,

        /// Merge into the existing snapshot instead of replacing it
        #[arg(long)]
        merge: bool,
    },

    /// Score the snapshot and write the analysis report
    Analyze {
        /// Output directory (overrides settings.output_dir)
        #[arg(long)]
        output_dir: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?
        .merge_env();
    if let Some(dir) = &args.data_dir {
        config.settings.data_dir = dir.clone();
    }
    config.validate()?;

    let mut log_config = LogConfig::from_settings(&config.logging);
    if let Some(level) = &args.log_level {
        log_config = log_config.level(level.as_str());
    }
    if let Some(format) = &args.log_format {
        log_config = log_config.format(LogFormat::parse(format));
    }
    init_logging_with_config(log_config)?;

    info!("RAEngine starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Ingest {
            report,
            ranges,
            merge,
        } => ingest(&config, report, ranges, merge),
        Command::Analyze { output_dir } => {
            if let Some(dir) = output_dir {
                config.settings.output_dir = dir;
            }
            analyze(&config)
        }
    }
}

fn ingest(
    config: &Config,
    report_path: Option<PathBuf>,
    ranges: Option<PathBuf>,
    merge: bool,
) -> Result<()> {
    let settings = &config.settings;
    let store = SnapshotStore::new(&settings.data_dir);

    let report_path = report_path
        .or_else(|| settings.report_path.as_ref().map(PathBuf::from))
        .context("no scan report given (--report or settings.report_path)")?;
    let import = raengine_ingest::parse_report_file(&report_path, settings.report_preamble_rows)?;

    let mut snapshot = if merge && store.exists() {
        let mut existing = store.load()?;
        existing.merge(import.snapshot);
        existing
    } else {
        import.snapshot
    };

    let ranges = match ranges.or_else(|| settings.range_path.as_ref().map(PathBuf::from)) {
        Some(path) => raengine_ingest::load_ranges(path)?,
        None => {
            warn!("No range data given, every host will be unmatched");
            RangeData::new()
        }
    };

    let latest = Local::now().naive_local();
    let window = ConnectionWindow::load(
        &settings.connections_dir,
        latest,
        settings.connection_window_days,
        &settings.datestr_format,
    )?;
    window.apply(&mut snapshot);

    raengine_ingest::assign_subnets(&mut snapshot, &ranges);

    let scorer = HostImpactScorer::new(
        &settings.weights.impact,
        config.service_pa_scores.clone(),
    );
    scorer.score_all(&mut snapshot, &ranges);

    let host_csv = run_dir(config)?.join(&settings.host_impact_csv);
    report::write_host_impact_file(&snapshot, &host_csv)?;

    store.save(&snapshot)?;
    store.save_ranges(&ranges)?;

    info!(
        "Ingest complete: {} vulnerabilities, {} hosts",
        snapshot.vulns.len(),
        snapshot.hosts.len()
    );
    Ok(())
}

fn analyze(config: &Config) -> Result<()> {
    let store = SnapshotStore::new(&config.settings.data_dir);
    let mut snapshot = store.load()?;
    let ranges = store.load_ranges()?;

    let engine = ScoringEngine::new(config);
    let summary = engine.run(&mut snapshot, &ranges)?;

    let output = run_dir(config)?.join(&config.settings.csv_output);
    report::write_analysis_file(&snapshot, &output)?;

    info!(
        "Analysis complete: {} vulnerabilities, {} out of band, report at {}",
        summary.vulns,
        summary.outofband,
        output.display()
    );
    Ok(())
}

/// `<output_dir>/<org_abbr>/<run time>`
fn run_dir(config: &Config) -> Result<PathBuf> {
    let settings = &config.settings;
    let mut run_time = String::new();
    write!(run_time, "{}", Local::now().format(&settings.datestr_format))
        .map_err(|_| anyhow!("invalid settings.datestr_format {:?}", settings.datestr_format))?;

    Ok(Path::new(&settings.output_dir)
        .join(&settings.org_abbr)
        .join(run_time))
}
