use crossbeam::channel::Receiver;
use tracing::debug;

use super::Reader;
use crate::{
    config::AnalyzerConfig, entry::LogEntry, error::Result, source::LineSource,
    statistic::Statistics, thread_pool::WorkerGroup,
};

/// One reader feeds a bounded channel that `config.workers` threads drain,
/// each into its own accumulator. The accumulators come back through the
/// join handles and are merged on the calling thread.
pub(super) fn analyze(source: &LineSource, config: &AnalyzerConfig) -> Result<Statistics> {
    let (reader, lines) = Reader::spawn(source.open()?, config.channel_capacity)?;
    let workers = WorkerGroup::spawn_n("pool", config.workers, move |id| drain(id, &lines))?;

    let shards = workers.join();
    let read = reader.finish()?;
    let shards = shards?;

    let stats = Statistics::merged(shards);
    debug_assert_eq!(read, stats.total_lines);
    Ok(stats)
}

fn drain(id: usize, lines: &Receiver<String>) -> Statistics {
    let mut local = Statistics::new();
    for line in lines {
        local.record(&LogEntry::parse(line));
    }
    debug!(worker = id, lines = local.total_lines, "pool worker drained");
    local
}
