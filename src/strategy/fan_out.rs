use crossbeam::channel::{Receiver, Sender, bounded};
use tracing::{debug, trace};

use super::Reader;
use crate::{
    config::AnalyzerConfig,
    entry::LogEntry,
    error::Result,
    source::LineSource,
    statistic::{SharedStatistics, Statistics},
    thread_pool::WorkerGroup,
};

/// Fan-out: `config.workers` consumers compete for lines from one channel
/// and each sends exactly one finished accumulator on its own result
/// channel. Fan-in: `config.merge_groups` mergers each take a slice of the
/// result channels and fold them into one shared target.
pub(super) fn analyze(source: &LineSource, config: &AnalyzerConfig) -> Result<Statistics> {
    let (reader, lines) = Reader::spawn(source.open()?, config.channel_capacity)?;

    let mut consumers = WorkerGroup::new("fan-out");
    let mut results = Vec::with_capacity(config.workers);
    for _ in 0..config.workers {
        let (tx, rx) = bounded(1);
        let lines = lines.clone();
        consumers.spawn(move |id| consume(id, lines, tx))?;
        results.push(rx);
    }
    drop(lines);

    let merged = fan_in(results, config.merge_groups);
    let consumed = consumers.join();
    let read = reader.finish()?;
    consumed?;
    let stats = merged?;

    debug_assert_eq!(read, stats.total_lines);
    Ok(stats)
}

fn consume(id: usize, lines: Receiver<String>, out: Sender<Statistics>) {
    let mut local = Statistics::new();
    for line in lines {
        local.record(&LogEntry::parse(line));
    }
    debug!(consumer = id, lines = local.total_lines, "consumer finished");
    // Fails only if the merger for this channel panicked.
    let _ = out.send(local);
}

fn fan_in(results: Vec<Receiver<Statistics>>, groups: usize) -> Result<Statistics> {
    let target = SharedStatistics::new();
    let per_group = results.len().div_ceil(groups).max(1);

    let mut mergers = WorkerGroup::new("fan-in");
    let mut results = results.into_iter().peekable();
    while results.peek().is_some() {
        let slice: Vec<_> = results.by_ref().take(per_group).collect();
        let target = target.clone();
        mergers.spawn(move |id| {
            let mut partial = Statistics::new();
            for rx in slice {
                for shard in rx {
                    partial.merge(shard);
                }
            }
            trace!(merger = id, lines = partial.total_lines, "merging partial");
            target.merge(partial);
        })?;
    }
    mergers.join()?;

    Ok(target.take())
}
