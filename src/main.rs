use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use access_log_analyzer::{
    AnalyzerConfig, LineSource, Statistics, Strategy,
    logging::{LogFormat, init_tracing},
    report::{Report, Summary},
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

/// Analyze a web-server access log with every concurrency strategy and
/// compare their running times.
#[derive(Parser, Debug)]
#[command(name = "access-log-analyzer", version, about, long_about = None)]
struct Cli {
    /// Access log to analyze.
    file: PathBuf,

    /// Strategy to run; repeat to run several. Runs all when omitted.
    #[arg(short, long = "strategy", value_enum)]
    strategies: Vec<Strategy>,

    /// Consumers for the worker-pool and fan-out strategies.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Capacity of the bounded line and entry channels.
    #[arg(long)]
    channel_capacity: Option<usize>,

    /// Pipeline parse stage width.
    #[arg(long)]
    parse_workers: Option<usize>,

    /// Pipeline analyze stage width.
    #[arg(long)]
    analyze_workers: Option<usize>,

    /// Entries an analyze worker records before flushing its shard.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Parallel mergers in the fan-in stage.
    #[arg(long)]
    merge_groups: Option<usize>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        let defaults = AnalyzerConfig::default();
        AnalyzerConfig {
            workers: self.workers.unwrap_or(defaults.workers),
            channel_capacity: self.channel_capacity.unwrap_or(defaults.channel_capacity),
            parse_workers: self.parse_workers.unwrap_or(defaults.parse_workers),
            analyze_workers: self.analyze_workers.unwrap_or(defaults.analyze_workers),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            merge_groups: self.merge_groups.unwrap_or(defaults.merge_groups),
        }
    }

    /// Selected strategies in canonical order, baseline first.
    fn strategies(&self) -> Vec<Strategy> {
        if self.strategies.is_empty() {
            return Strategy::ALL.to_vec();
        }
        Strategy::ALL
            .into_iter()
            .filter(|s| self.strategies.contains(s))
            .collect()
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let config = cli.config();
    config.validate()?;

    let size = fs::metadata(&cli.file)
        .with_context(|| format!("cannot stat {}", cli.file.display()))?
        .len();
    println!("File size: {:.2} MB", size as f64 / (1024.0 * 1024.0));
    println!(
        "Workers: {}, parse/analyze: {}/{}, batch: {}\n",
        config.workers, config.parse_workers, config.analyze_workers, config.batch_size
    );

    let source = LineSource::new(&cli.file);
    let mut baseline: Option<Statistics> = None;
    let mut baseline_elapsed = None;
    let mut timings = Vec::new();
    let mut mismatched = Vec::new();

    for strategy in cli.strategies() {
        println!("=== {} ===", strategy.title());
        let started = Instant::now();
        let stats = strategy
            .analyze(&source, &config)
            .with_context(|| format!("{strategy} analysis failed"))?;
        let elapsed = started.elapsed();

        print!(
            "{}",
            Report {
                strategy,
                elapsed,
                stats: &stats,
                baseline: baseline_elapsed,
            }
        );
        println!();
        timings.push((strategy, elapsed));

        match &baseline {
            Some(expected) if *expected != stats => {
                error!(%strategy, "result differs from the sequential baseline");
                mismatched.push(strategy);
            }
            Some(_) => {}
            None if strategy.is_baseline() => {
                baseline_elapsed = Some(elapsed);
                baseline = Some(stats);
            }
            None => warn!(%strategy, "no sequential baseline to verify against"),
        }
    }

    print!("{}", Summary { timings: &timings });

    if mismatched.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let names: Vec<&str> = mismatched.iter().map(|s| s.name()).collect();
    eprintln!(
        "error: results differ from the sequential baseline: {}",
        names.join(", ")
    );
    Ok(ExitCode::FAILURE)
}
