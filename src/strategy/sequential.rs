use crate::{entry::LogEntry, error::Result, source::LineSource, statistic::Statistics};

/// Single thread, file order. The reference result for the other strategies.
pub(super) fn analyze(source: &LineSource) -> Result<Statistics> {
    let mut stats = Statistics::new();
    for line in source.open()? {
        stats.record(&LogEntry::parse(line?));
    }
    Ok(stats)
}
