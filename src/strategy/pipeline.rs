use std::mem;

use crossbeam::channel::{Receiver, Sender, bounded};
use tracing::debug;

use super::Reader;
use crate::{
    config::AnalyzerConfig, entry::LogEntry, error::Result, source::LineSource,
    statistic::Statistics, thread_pool::WorkerGroup,
};

/// Three stages over bounded channels:
///
/// 1. parse: `config.parse_workers` threads turn lines into [`LogEntry`]s.
/// 2. analyze: `config.analyze_workers` threads record entries and send their
///    shard downstream every `config.batch_size` entries, plus the remainder
///    at end of stream.
/// 3. aggregate: the calling thread merges shards as they arrive.
pub(super) fn analyze(source: &LineSource, config: &AnalyzerConfig) -> Result<Statistics> {
    let (reader, lines) = Reader::spawn(source.open()?, config.channel_capacity)?;

    let (entry_tx, entries) = bounded(config.channel_capacity);
    let parsers = WorkerGroup::spawn_n("parse", config.parse_workers, move |id| {
        parse_stage(id, &lines, &entry_tx)
    })?;

    let (shard_tx, shards) = bounded(config.analyze_workers);
    let batch_size = config.batch_size as u64;
    let analyzers = WorkerGroup::spawn_n("analyze", config.analyze_workers, move |id| {
        analyze_stage(id, &entries, &shard_tx, batch_size)
    })?;

    let stats = aggregate_stage(&shards);

    let analyzed = analyzers.join();
    let parsed = parsers.join();
    let read = reader.finish()?;
    parsed?;
    let flushes: u64 = analyzed?.into_iter().sum();

    debug!(flushes, "pipeline drained");
    debug_assert_eq!(read, stats.total_lines);
    Ok(stats)
}

fn parse_stage(id: usize, lines: &Receiver<String>, out: &Sender<LogEntry>) {
    let mut parsed = 0u64;
    for line in lines {
        if out.send(LogEntry::parse(line)).is_err() {
            break;
        }
        parsed += 1;
    }
    debug!(parser = id, parsed, "parse worker finished");
}

/// Returns how many shards this worker sent.
fn analyze_stage(
    id: usize,
    entries: &Receiver<LogEntry>,
    out: &Sender<Statistics>,
    batch_size: u64,
) -> u64 {
    let mut local = Statistics::new();
    let mut flushes = 0;
    for entry in entries {
        local.record(&entry);
        if local.total_lines >= batch_size {
            if out.send(mem::take(&mut local)).is_err() {
                return flushes;
            }
            flushes += 1;
        }
    }
    if !local.is_empty() && out.send(local).is_ok() {
        flushes += 1;
    }
    debug!(analyzer = id, flushes, "analyze worker finished");
    flushes
}

fn aggregate_stage(shards: &Receiver<Statistics>) -> Statistics {
    let mut stats = Statistics::new();
    for shard in shards {
        stats.merge(shard);
    }
    stats
}
